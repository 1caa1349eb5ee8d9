use crate::record::{Record, fields};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

lazy_static! {
    static ref LEADING_NUMBER: Regex =
        Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap();
}

/// Chart label for records that leave a category blank
pub const UNSPECIFIED: &str = "ไม่ระบุ";

/// The categorical fields the dashboard charts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartField {
    Status,
    Department,
    ActivityType,
    Level,
    Format,
}

impl ChartField {
    pub const ALL: [ChartField; 5] = [
        ChartField::Status,
        ChartField::Department,
        ChartField::ActivityType,
        ChartField::Level,
        ChartField::Format,
    ];

    pub fn field_index(self) -> usize {
        match self {
            ChartField::Status => fields::STATUS,
            ChartField::Department => fields::DEPARTMENT,
            ChartField::ActivityType => fields::ACTIVITY_TYPE,
            ChartField::Level => fields::LEVEL,
            ChartField::Format => fields::FORMAT,
        }
    }

    pub fn title(self) -> &'static str {
        use crate::record::labels;
        match self {
            ChartField::Status => labels::STATUS,
            ChartField::Department => labels::DEPARTMENT,
            ChartField::ActivityType => labels::ACTIVITY_TYPE,
            ChartField::Level => labels::LEVEL,
            ChartField::Format => labels::FORMAT,
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "status" => Some(ChartField::Status),
            "department" => Some(ChartField::Department),
            "activityType" | "activity-type" => Some(ChartField::ActivityType),
            "level" => Some(ChartField::Level),
            "format" | "activityFormat" => Some(ChartField::Format),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Distinct value -> occurrences, kept in first-seen order
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryCounts {
    entries: Vec<CategoryCount>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CategoryCounts {
    pub fn increment(&mut self, value: &str) {
        match self.index.get(value) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(value.to_string(), self.entries.len());
                self.entries.push(CategoryCount {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    pub fn entries(&self) -> &[CategoryCount] {
        &self.entries
    }

    pub fn get(&self, value: &str) -> Option<usize> {
        self.index.get(value).map(|&i| self.entries[i].count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// Count occurrences of each value at `field_index`, blank values as [`UNSPECIFIED`]
pub fn category_counts(records: &[Record], field_index: usize) -> CategoryCounts {
    let mut counts = CategoryCounts::default();
    for record in records {
        let value = record.field(field_index);
        counts.increment(if value.is_empty() { UNSPECIFIED } else { value });
    }
    counts
}

/// Parse the leading number of a text, the way spreadsheet users type hours
/// (`"3"`, `"1.5"`, `"6 ชั่วโมง"`). Text without a leading number yields `None`.
pub fn parse_hours(raw: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(raw)
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count: usize,
    pub total_hours: f64,
}

impl Summary {
    /// Total hours rounded to a whole number for display
    pub fn display_hours(&self) -> String {
        format!("{}", self.total_hours.round() as i64)
    }
}

pub fn summarize(records: &[Record]) -> Summary {
    let total_hours = records
        .iter()
        .filter_map(|r| r.training_hours.as_deref())
        .filter_map(parse_hours)
        .sum();

    Summary {
        count: records.len(),
        total_hours,
    }
}
