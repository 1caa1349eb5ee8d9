use crate::attachment::AttachmentRef;
use crate::dates::DateParser;
use crate::record::{Record, labels};
use serde::Serialize;

const PLACEHOLDER: &str = "-";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

/// Everything shown for one record in the detail panel, timestamp excluded
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetailView {
    pub name: String,
    pub fields: Vec<DetailField>,
    pub attachments: Vec<AttachmentRef>,
}

fn shown(value: &str) -> String {
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

impl DetailView {
    pub fn from_record(record: &Record, parser: &DateParser) -> Self {
        let fields = vec![
            (labels::NAME, shown(&record.name)),
            (labels::STATUS, shown(&record.status)),
            (labels::DEPARTMENT, shown(&record.department)),
            (labels::ACTIVITY_TYPE, shown(&record.activity_type)),
            (labels::ACTIVITY_NAME, shown(&record.activity_name)),
            (labels::OUTCOME, shown(&record.outcome)),
            (labels::DETAIL, shown(&record.detail)),
            (labels::LEVEL, shown(&record.level)),
            (labels::START_DATE, parser.format_display_date(&record.start_date)),
            (labels::END_DATE, parser.format_display_date(&record.end_date)),
            (labels::FORMAT, shown(&record.format)),
            (labels::ORGANIZER, shown(&record.organizer)),
            (labels::LOCATION, shown(&record.location)),
            (
                labels::TRAINING_HOURS,
                shown(record.training_hours.as_deref().unwrap_or("")),
            ),
        ]
        .into_iter()
        .map(|(label, value)| DetailField { label, value })
        .collect();

        let attachments = record
            .present_attachments()
            .map(|(index, url)| AttachmentRef::new(index, url))
            .collect();

        DetailView {
            name: record.name.clone(),
            fields,
            attachments,
        }
    }

    /// Attachments that have a thumbnail to wait for before rasterizing
    pub fn thumbnails(&self) -> impl Iterator<Item = &str> {
        self.attachments
            .iter()
            .filter_map(|a| a.thumbnail.as_deref())
    }
}
