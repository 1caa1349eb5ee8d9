//! User actions as commands over a [`Session`].
//!
//! The HTTP layer and the report CLI both drive the pipeline through these, so the
//! search/clear/export flow is testable without any UI wiring.

use crate::detail::DetailView;
use crate::downloader::{CsvExport, to_csv};
use crate::error::{DashboardError, Result};
use crate::filter::SearchInput;
use crate::pdf::{TableLayout, layout_table};
use crate::session::{FilteredResult, Session};
use chrono::NaiveDate;

/// Run a search with the given form input
#[derive(Clone, Debug, Default)]
pub struct SearchCommand {
    pub input: SearchInput,
}

impl SearchCommand {
    pub fn new(input: SearchInput) -> Self {
        SearchCommand { input }
    }

    pub fn execute<'a>(&self, session: &'a mut Session) -> Result<&'a FilteredResult> {
        session.search(&self.input)
    }
}

/// Reset the search form
#[derive(Clone, Copy, Debug, Default)]
pub struct ClearCommand;

impl ClearCommand {
    pub fn execute(&self, session: &mut Session) {
        session.clear_criteria();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportCommand {
    Csv,
    TablePdf { printed_on: NaiveDate },
    DetailPdf { index: usize },
}

/// What an export command hands back. The detail variant still has to be
/// rasterized, which needs the thumbnails and therefore happens asynchronously.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportArtifact {
    Csv(CsvExport),
    TablePdf(TableLayout),
    Detail(DetailView),
}

impl ExportCommand {
    pub fn execute(&self, session: &Session) -> Result<ExportArtifact> {
        let result = session.result();
        if result.is_empty() {
            return Err(DashboardError::NothingToExport);
        }

        match *self {
            ExportCommand::Csv => to_csv(&result.records).map(ExportArtifact::Csv),
            ExportCommand::TablePdf { printed_on } => {
                layout_table(&result.records, &result.summary, printed_on, session.parser())
                    .map(ExportArtifact::TablePdf)
            }
            ExportCommand::DetailPdf { index } => {
                let record = session.record(index)?;
                Ok(ExportArtifact::Detail(DetailView::from_record(
                    record,
                    session.parser(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::record::Row;

    fn loaded_session() -> Session {
        let mut cells = vec![String::new(); 21];
        cells[1] = "สมชาย".to_string();
        cells[9] = "2024-01-10".to_string();
        let mut session = Session::default();
        session.load(Dataset::from_rows(vec![Row(cells)]));
        session
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn exports_require_a_result() {
        let session = loaded_session();
        for command in [
            ExportCommand::Csv,
            ExportCommand::TablePdf { printed_on: today() },
            ExportCommand::DetailPdf { index: 0 },
        ] {
            assert!(matches!(
                command.execute(&session),
                Err(DashboardError::NothingToExport)
            ));
        }
    }

    #[test]
    fn search_then_export() {
        let mut session = loaded_session();
        SearchCommand::default().execute(&mut session).unwrap();

        let ExportArtifact::Csv(csv) = ExportCommand::Csv.execute(&session).unwrap() else {
            panic!("expected csv");
        };
        assert_eq!(csv.content.lines().count(), 2);

        let ExportArtifact::TablePdf(layout) = ExportCommand::TablePdf { printed_on: today() }
            .execute(&session)
            .unwrap()
        else {
            panic!("expected table layout");
        };
        assert_eq!(layout.row_count(), 1);

        let ExportArtifact::Detail(view) =
            ExportCommand::DetailPdf { index: 0 }.execute(&session).unwrap()
        else {
            panic!("expected detail view");
        };
        assert_eq!(view.name, "สมชาย");

        assert!(matches!(
            ExportCommand::DetailPdf { index: 5 }.execute(&session),
            Err(DashboardError::RecordNotFound(5))
        ));
    }

    #[test]
    fn clear_resets_criteria() {
        let mut session = loaded_session();
        SearchCommand::new(SearchInput {
            name: Some("สม".to_string()),
            ..Default::default()
        })
        .execute(&mut session)
        .unwrap();
        assert!(!session.criteria().is_empty());
        ClearCommand.execute(&mut session);
        assert!(session.criteria().is_empty());
    }
}
