//! Date handling for sheet values and search bounds.
//!
//! Every date in the pipeline goes through [`DateParser`]. It accepts a fixed list of
//! formats and reports anything else as `None`, the single "invalid date" result:
//!
//! - RFC 3339 with `Z` or an explicit offset (`2024-01-10T17:00:00.000Z`)
//! - ISO date-time without offset, `T` or space separated (`2024-01-10 08:30:00`)
//! - `YYYY-MM-DD`, `YYYY/MM/DD` and `M/D/YYYY`
//!
//! Values without an offset are read in the parser's reference offset (UTC+07:00 unless
//! configured otherwise), so a bare date means local midnight. Comparisons always happen
//! on absolute instants.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const THAI_MONTHS: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.", "ธ.ค.",
];

const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Parses sheet dates in one explicit reference offset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateParser {
    offset: FixedOffset,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::with_offset_hours(7).unwrap_or_else(Self::utc)
    }
}

impl DateParser {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self {
            offset: FixedOffset::east_opt(0).expect("zero offset is always valid"),
        }
    }

    /// `None` when the offset is outside ±23 hours
    pub fn with_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours * 3600).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Parse a sheet value. Empty or unrecognised text yields `None`.
    pub fn parse(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt);
        }

        for format in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return self.offset.from_local_datetime(&naive).single();
            }
        }

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return self
                    .offset
                    .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
                    .single();
            }
        }

        None
    }

    /// Short Thai display form, e.g. `10 ม.ค. 2567`.
    ///
    /// Empty input shows as `-`; unparsable input is shown as given.
    pub fn format_display_date(&self, raw: &str) -> String {
        if raw.is_empty() {
            return "-".to_string();
        }

        match self.parse(raw) {
            Some(dt) => {
                let local = dt.with_timezone(&self.offset);
                format!(
                    "{} {} {}",
                    local.day(),
                    THAI_MONTHS[local.month0() as usize],
                    local.year() + BUDDHIST_ERA_OFFSET
                )
            }
            None => raw.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_documented_formats() {
        let parser = DateParser::default();
        let midnight = parser.parse("2024-01-10").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-01-10T00:00:00+07:00");

        assert_eq!(parser.parse("2024/01/10"), Some(midnight));
        assert_eq!(parser.parse("1/10/2024"), Some(midnight));
        assert_eq!(parser.parse(" 2024-01-10 "), Some(midnight));

        // Sheets serialises local midnight as the previous day in UTC
        assert_eq!(parser.parse("2024-01-09T17:00:00.000Z"), Some(midnight));

        let with_time = parser.parse("2024-01-10 08:30:00").unwrap();
        assert_eq!(with_time.to_rfc3339(), "2024-01-10T08:30:00+07:00");
        assert!(parser.parse("2024-01-10T08:30").is_some());
    }

    #[test]
    fn rejects_everything_else() {
        let parser = DateParser::default();
        assert_eq!(parser.parse(""), None);
        assert_eq!(parser.parse("   "), None);
        assert_eq!(parser.parse("เมื่อวาน"), None);
        assert_eq!(parser.parse("2024-13-40"), None);
        assert_eq!(parser.parse("10 Jan 2024"), None);
    }

    #[test]
    fn offset_shifts_day_boundary() {
        let utc = DateParser::utc();
        let bangkok = DateParser::default();
        let sheet_value = "2024-01-09T17:00:00.000Z";
        assert!(utc.parse(sheet_value) < utc.parse("2024-01-10"));
        assert!(bangkok.parse(sheet_value) >= bangkok.parse("2024-01-10"));
    }

    #[test]
    fn display_uses_thai_short_form() {
        let parser = DateParser::default();
        assert_eq!(parser.format_display_date("2024-01-10"), "10 ม.ค. 2567");
        assert_eq!(parser.format_display_date("2023-12-31T17:00:00Z"), "1 ม.ค. 2567");
        assert_eq!(parser.format_display_date(""), "-");
        assert_eq!(parser.format_display_date("ไม่ทราบ"), "ไม่ทราบ");
    }
}
