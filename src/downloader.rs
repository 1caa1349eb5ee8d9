use crate::error::{DashboardError, Result};
use crate::record::{Record, labels};

/// Byte-order mark so spreadsheet tools open the file as UTF-8
pub const BOM: char = '\u{FEFF}';

pub const CSV_FILENAME: &str = "ข้อมูลผลงานครูและนักเรียน.csv";

pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

/// Header row, in sheet order
pub const CSV_HEADERS: [&str; 21] = [
    labels::TIMESTAMP,
    labels::NAME,
    labels::STATUS,
    labels::DEPARTMENT,
    labels::ACTIVITY_TYPE,
    labels::ACTIVITY_NAME,
    labels::OUTCOME,
    labels::DETAIL,
    labels::LEVEL,
    labels::START_DATE,
    labels::END_DATE,
    labels::FORMAT,
    labels::ORGANIZER,
    labels::LOCATION,
    "เอกสารแนบ 1",
    "เอกสารแนบ 2",
    "เอกสารแนบ 3",
    "เอกสารแนบ 4",
    "เอกสารแนบ 5",
    "เอกสารแนบ 6",
    labels::TRAINING_HOURS,
];

/// A finished CSV download
#[derive(Clone, Debug, PartialEq)]
pub struct CsvExport {
    pub filename: &'static str,
    pub content: String,
}

impl CsvExport {
    pub fn into_bytes(self) -> Vec<u8> {
        self.content.into_bytes()
    }
}

/// Wrap a free-text field in double quotes, doubling any quote inside it
pub fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Convert filtered records to CSV
///
/// Produces one line per record under a fixed 21-column header:
/// - The output starts with a byte-order mark
/// - Free-text fields (name, status, department, activity type and name, outcome,
///   detail, level, format, organizer, location, attachments) are always quoted
/// - Timestamp, start date, end date and training hours are written as-is
///
/// # Arguments
/// * `records` - The filtered, sorted records to export
///
/// # Returns
/// * `Result<CsvExport>` - The file name and content, or `NothingToExport` when
///   `records` is empty
///
/// # Examples
/// ```
/// use activity_dashboard::downloader::to_csv;
/// use activity_dashboard::record::Record;
///
/// let record = Record { name: "ครู \"เอ\"".to_string(), ..Default::default() };
/// let csv = to_csv(&[record]).unwrap();
/// assert!(csv.content.contains("\"ครู \"\"เอ\"\"\""));
/// assert!(to_csv(&[]).is_err());
/// ```
pub fn to_csv(records: &[Record]) -> Result<CsvExport> {
    if records.is_empty() {
        return Err(DashboardError::NothingToExport);
    }

    let mut csv_content = String::new();
    csv_content.push(BOM);
    csv_content.push_str(&CSV_HEADERS.join(","));
    csv_content.push('\n');

    for record in records {
        let mut line: Vec<String> = Vec::with_capacity(CSV_HEADERS.len());
        line.push(record.timestamp.clone());
        for text in [
            &record.name,
            &record.status,
            &record.department,
            &record.activity_type,
            &record.activity_name,
            &record.outcome,
            &record.detail,
            &record.level,
        ] {
            line.push(quote_field(text));
        }
        line.push(record.start_date.clone());
        line.push(record.end_date.clone());
        for text in [&record.format, &record.organizer, &record.location] {
            line.push(quote_field(text));
        }
        line.extend(record.attachments.iter().map(|url| quote_field(url)));
        line.push(record.training_hours.clone().unwrap_or_default());

        csv_content.push_str(&line.join(","));
        csv_content.push('\n');
    }

    Ok(CsvExport {
        filename: CSV_FILENAME,
        content: csv_content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut record = Record {
            timestamp: "1/11/2024 9:00:00".to_string(),
            name: "สมชาย".to_string(),
            activity_name: "อบรม \"AI\" เบื้องต้น".to_string(),
            start_date: "2024-01-10".to_string(),
            end_date: "2024-01-12".to_string(),
            training_hours: Some("6".to_string()),
            ..Default::default()
        };
        record.attachments[0] = "https://drive.google.com/file/d/A1/view".to_string();
        record
    }

    #[test]
    fn starts_with_bom_and_header() {
        let csv = to_csv(&[sample()]).unwrap();
        assert_eq!(csv.filename, CSV_FILENAME);
        assert!(csv.content.starts_with('\u{FEFF}'));
        let header = csv.content.trim_start_matches(BOM).lines().next().unwrap();
        assert_eq!(header.split(',').count(), 21);
        assert!(header.starts_with("ประทับเวลา,ชื่อ,สถานะ"));
        assert!(header.ends_with("เอกสารแนบ 6,จำนวนชั่วโมงอบรม"));
    }

    #[test]
    fn quotes_only_free_text_fields() {
        let csv = to_csv(&[sample()]).unwrap();
        let line = csv.content.lines().nth(1).unwrap();
        assert!(line.starts_with("1/11/2024 9:00:00,\"สมชาย\","));
        assert!(line.contains(",\"อบรม \"\"AI\"\" เบื้องต้น\","));
        assert!(line.contains(",2024-01-10,2024-01-12,"));
        assert!(line.ends_with(",\"\",6"));
    }

    #[test]
    fn missing_hours_emit_empty_cell() {
        let mut record = sample();
        record.training_hours = None;
        let csv = to_csv(&[record]).unwrap();
        assert!(csv.content.lines().nth(1).unwrap().ends_with(",\"\","));
    }

    #[test]
    fn empty_result_is_nothing_to_export() {
        assert!(matches!(to_csv(&[]), Err(DashboardError::NothingToExport)));
    }
}
