use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Positions of the activity sheet columns
pub mod fields {
    pub const TIMESTAMP: usize = 0;
    pub const NAME: usize = 1;
    pub const STATUS: usize = 2;
    pub const DEPARTMENT: usize = 3;
    pub const ACTIVITY_TYPE: usize = 4;
    pub const ACTIVITY_NAME: usize = 5;
    pub const OUTCOME: usize = 6;
    pub const DETAIL: usize = 7;
    pub const LEVEL: usize = 8;
    pub const START_DATE: usize = 9;
    pub const END_DATE: usize = 10;
    pub const FORMAT: usize = 11;
    pub const ORGANIZER: usize = 12;
    pub const LOCATION: usize = 13;
    pub const FIRST_ATTACHMENT: usize = 14;
    pub const ATTACHMENT_SLOTS: usize = 6;
    pub const TRAINING_HOURS: usize = 20;
}

/// Column captions as they appear in the sheet
pub mod labels {
    pub const TIMESTAMP: &str = "ประทับเวลา";
    pub const NAME: &str = "ชื่อ";
    pub const STATUS: &str = "สถานะ";
    pub const DEPARTMENT: &str = "สังกัด";
    pub const ACTIVITY_TYPE: &str = "ประเภทกิจกรรม";
    pub const ACTIVITY_NAME: &str = "ชื่อกิจกรรม";
    pub const OUTCOME: &str = "สิ่งที่ได้รับ";
    pub const DETAIL: &str = "รายละเอียด";
    pub const LEVEL: &str = "ระดับ";
    pub const START_DATE: &str = "ตั้งแต่วันที่";
    pub const END_DATE: &str = "ถึงวันที่";
    pub const FORMAT: &str = "รูปแบบกิจกรรม";
    pub const ORGANIZER: &str = "หน่วยงานที่จัด";
    pub const LOCATION: &str = "สถานที่";
    pub const ATTACHMENT: &str = "เอกสารแนบ";
    pub const TRAINING_HOURS: &str = "จำนวนชั่วโมงอบรม";
}

/// Rows shorter than this are malformed and never take part in a search
pub const MIN_FIELDS: usize = 15;

/// Convert one loosely typed sheet cell into text.
///
/// Falsy cells (`null`, `false`, `0`, `""`) become empty, the way the sheet front end has
/// always treated them.
pub fn normalize_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i == 0 { String::new() } else { i.to_string() }
            } else if let Some(f) = n.as_f64() {
                if f == 0.0 {
                    String::new()
                } else if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            } else {
                n.to_string()
            }
        }
        other => other.to_string(),
    }
}

/// A raw, positional row exactly as retrieved. No validation happens here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Row(pub Vec<String>);

impl Row {
    pub fn from_values(values: &[Value]) -> Self {
        Row(values.iter().map(normalize_cell).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Missing positions read as the empty string
    pub fn get(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }
}

impl From<Vec<&str>> for Row {
    fn from(cells: Vec<&str>) -> Self {
        Row(cells.into_iter().map(str::to_string).collect())
    }
}

/// One activity entry with named fields
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: String,
    pub name: String,
    pub status: String,
    pub department: String,
    pub activity_type: String,
    pub activity_name: String,
    pub outcome: String,
    pub detail: String,
    pub level: String,
    pub start_date: String,
    pub end_date: String,
    pub format: String,
    pub organizer: String,
    pub location: String,
    pub attachments: [String; fields::ATTACHMENT_SLOTS],
    pub training_hours: Option<String>,
}

impl Record {
    /// Build a record from a positional row, rejecting rows with fewer than
    /// [`MIN_FIELDS`] cells.
    pub fn from_row(row: &Row) -> Result<Self> {
        if row.len() < MIN_FIELDS {
            return Err(DashboardError::MalformedRecord {
                expected: MIN_FIELDS,
                found: row.len(),
            });
        }

        let attachments =
            std::array::from_fn(|slot| row.get(fields::FIRST_ATTACHMENT + slot).to_string());
        let training_hours = Some(row.get(fields::TRAINING_HOURS))
            .filter(|hours| !hours.is_empty())
            .map(str::to_string);

        Ok(Record {
            timestamp: row.get(fields::TIMESTAMP).to_string(),
            name: row.get(fields::NAME).to_string(),
            status: row.get(fields::STATUS).to_string(),
            department: row.get(fields::DEPARTMENT).to_string(),
            activity_type: row.get(fields::ACTIVITY_TYPE).to_string(),
            activity_name: row.get(fields::ACTIVITY_NAME).to_string(),
            outcome: row.get(fields::OUTCOME).to_string(),
            detail: row.get(fields::DETAIL).to_string(),
            level: row.get(fields::LEVEL).to_string(),
            start_date: row.get(fields::START_DATE).to_string(),
            end_date: row.get(fields::END_DATE).to_string(),
            format: row.get(fields::FORMAT).to_string(),
            organizer: row.get(fields::ORGANIZER).to_string(),
            location: row.get(fields::LOCATION).to_string(),
            attachments,
            training_hours,
        })
    }

    /// Read a field by its sheet position. Positions past the layout read as empty.
    pub fn field(&self, index: usize) -> &str {
        match index {
            fields::TIMESTAMP => &self.timestamp,
            fields::NAME => &self.name,
            fields::STATUS => &self.status,
            fields::DEPARTMENT => &self.department,
            fields::ACTIVITY_TYPE => &self.activity_type,
            fields::ACTIVITY_NAME => &self.activity_name,
            fields::OUTCOME => &self.outcome,
            fields::DETAIL => &self.detail,
            fields::LEVEL => &self.level,
            fields::START_DATE => &self.start_date,
            fields::END_DATE => &self.end_date,
            fields::FORMAT => &self.format,
            fields::ORGANIZER => &self.organizer,
            fields::LOCATION => &self.location,
            i if (fields::FIRST_ATTACHMENT..fields::TRAINING_HOURS).contains(&i) => {
                &self.attachments[i - fields::FIRST_ATTACHMENT]
            }
            fields::TRAINING_HOURS => self.training_hours.as_deref().unwrap_or(""),
            _ => "",
        }
    }

    /// Non-blank attachment URLs paired with their 1-based slot number
    pub fn present_attachments(&self) -> impl Iterator<Item = (usize, &str)> {
        self.attachments
            .iter()
            .enumerate()
            .filter(|(_, url)| !url.trim().is_empty())
            .map(|(slot, url)| (slot + 1, url.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row_with(len: usize) -> Row {
        Row((0..len).map(|i| format!("f{i}")).collect())
    }

    #[test]
    fn falsy_cells_normalize_to_empty() {
        assert_eq!(normalize_cell(&json!(null)), "");
        assert_eq!(normalize_cell(&json!(false)), "");
        assert_eq!(normalize_cell(&json!(0)), "");
        assert_eq!(normalize_cell(&json!("")), "");
        assert_eq!(normalize_cell(&json!(3)), "3");
        assert_eq!(normalize_cell(&json!(3.0)), "3");
        assert_eq!(normalize_cell(&json!(1.5)), "1.5");
        assert_eq!(normalize_cell(&json!("ครู")), "ครู");
    }

    #[test]
    fn short_rows_are_malformed() {
        let err = Record::from_row(&row_with(14)).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::MalformedRecord { expected: 15, found: 14 }
        ));
        assert!(Record::from_row(&row_with(15)).is_ok());
    }

    #[test]
    fn optional_tail_fields_default() {
        let record = Record::from_row(&row_with(15)).unwrap();
        assert_eq!(record.attachments[0], "f14");
        assert_eq!(record.attachments[5], "");
        assert_eq!(record.training_hours, None);

        let record = Record::from_row(&row_with(21)).unwrap();
        assert_eq!(record.training_hours.as_deref(), Some("f20"));
        assert_eq!(record.field(fields::TRAINING_HOURS), "f20");
        assert_eq!(record.field(fields::LEVEL), "f8");
        assert_eq!(record.field(17), "f17");
    }

    #[test]
    fn present_attachments_skip_blank_slots() {
        let mut record = Record::default();
        record.attachments[1] = "https://a".to_string();
        record.attachments[4] = "  ".to_string();
        record.attachments[5] = "https://b".to_string();
        let found: Vec<_> = record.present_attachments().collect();
        assert_eq!(found, vec![(2, "https://a"), (6, "https://b")]);
    }
}
