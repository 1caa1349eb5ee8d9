use crate::dates::DateParser;
use crate::error::{DashboardError, Result};
use crate::record::{Record, Row};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Search form values as typed by the user. Empty strings count as "not set".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchInput {
    pub activity_type: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub level: Option<String>,
    pub activity_format: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Parsed search predicates. Text criteria are stored case-folded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterCriteria {
    pub activity_type: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub level: Option<String>,
    pub format: Option<String>,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub end_date: Option<DateTime<FixedOffset>>,
}

fn text_criterion(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn date_criterion(
    field: &'static str,
    value: &Option<String>,
    parser: &DateParser,
) -> Result<Option<DateTime<FixedOffset>>> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parser
            .parse(raw)
            .map(Some)
            .ok_or_else(|| DashboardError::InvalidCriterion {
                field,
                value: raw.to_string(),
            }),
    }
}

impl FilterCriteria {
    pub fn from_input(input: &SearchInput, parser: &DateParser) -> Result<Self> {
        Ok(FilterCriteria {
            activity_type: text_criterion(&input.activity_type),
            name: text_criterion(&input.name),
            department: text_criterion(&input.department),
            level: text_criterion(&input.level),
            format: text_criterion(&input.activity_format),
            start_date: date_criterion("startDate", &input.start_date, parser)?,
            end_date: date_criterion("endDate", &input.end_date, parser)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }

    /// True when every active predicate accepts the record
    pub fn matches(&self, record: &Record, parser: &DateParser) -> bool {
        let text_checks = [
            (&self.activity_type, &record.activity_type),
            (&self.name, &record.name),
            (&self.department, &record.department),
            (&self.level, &record.level),
            (&self.format, &record.format),
        ];
        for (criterion, field) in text_checks {
            if let Some(needle) = criterion {
                if !field.to_lowercase().contains(needle.as_str()) {
                    return false;
                }
            }
        }

        if let Some(bound) = self.start_date {
            match parser.parse(&record.start_date) {
                Some(start) if start >= bound => {}
                _ => return false,
            }
        }

        if let Some(bound) = self.end_date {
            match parser.parse(&record.end_date) {
                Some(end) if end <= bound => {}
                _ => return false,
            }
        }

        true
    }
}

/// Keep every well-formed row that satisfies all active criteria.
///
/// Rows with fewer than [`crate::record::MIN_FIELDS`] cells are skipped silently.
pub fn filter_records(rows: &[Row], criteria: &FilterCriteria, parser: &DateParser) -> Vec<Record> {
    rows.iter()
        .filter_map(|row| Record::from_row(row).ok())
        .filter(|record| criteria.matches(record, parser))
        .collect()
}

/// Order records by start date, ascending. Missing or unparsable start dates sort
/// first; ties keep their input order.
pub fn sort_by_start_date(mut records: Vec<Record>, parser: &DateParser) -> Vec<Record> {
    records.sort_by_cached_key(|record| parser.parse(&record.start_date));
    records
}

/// Filter then sort, the order every search runs in
pub fn search(rows: &[Row], criteria: &FilterCriteria, parser: &DateParser) -> Vec<Record> {
    sort_by_start_date(filter_records(rows, criteria, parser), parser)
}
