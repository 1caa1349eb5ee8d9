use activity_dashboard::aggregate::{ChartField, UNSPECIFIED};
use activity_dashboard::attachment::resolve_file_id;
use activity_dashboard::commands::{ExportArtifact, ExportCommand, SearchCommand};
use activity_dashboard::dataset::Dataset;
use activity_dashboard::dates::DateParser;
use activity_dashboard::error::DashboardError;
use activity_dashboard::filter::{FilterCriteria, SearchInput, filter_records, sort_by_start_date};
use activity_dashboard::session::Session;
use chrono::NaiveDate;
use serde_json::{Value, json};

fn row(name: &str, start: &str, len: usize) -> Vec<Value> {
    let mut cells = vec![json!(""); len];
    cells[1] = json!(name);
    if len > 9 {
        cells[9] = json!(start);
    }
    cells
}

/// header, rowA (2024-01-10), rowB (2023-05-01), rowC (5 fields)
fn scenario() -> Dataset {
    Dataset::load(vec![
        vec![json!("ประทับเวลา"), json!("ชื่อ")],
        row("rowA", "2024-01-10", 21),
        row("rowB", "2023-05-01", 15),
        row("rowC", "", 5),
    ])
}

fn names(records: &[activity_dashboard::record::Record]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn malformed_rows_drop_out_and_sort_orders_by_start() {
    let parser = DateParser::default();
    let dataset = scenario();
    assert_eq!(dataset.len(), 3);

    let filtered = filter_records(dataset.rows(), &FilterCriteria::default(), &parser);
    assert_eq!(names(&filtered), vec!["rowA", "rowB"]);

    let sorted = sort_by_start_date(filtered, &parser);
    assert_eq!(names(&sorted), vec!["rowB", "rowA"]);
}

#[test]
fn start_bound_excludes_earlier_rows() {
    let mut session = Session::default();
    session.load(scenario());
    let result = SearchCommand::new(SearchInput {
        start_date: Some("2024-01-01".to_string()),
        ..Default::default()
    })
    .execute(&mut session)
    .unwrap();
    assert_eq!(names(&result.records), vec!["rowA"]);
    assert_eq!(result.summary.count, 1);
}

#[test]
fn summary_and_charts_over_scenario() {
    let mut session = Session::default();
    session.load(scenario());
    let result = SearchCommand::default().execute(&mut session).unwrap();
    assert_eq!(result.summary.count, 2);
    assert_eq!(result.summary.total_hours, 0.0);
    let status = result.counts(ChartField::Status);
    assert_eq!(status.get(UNSPECIFIED), Some(2));
    assert_eq!(status.total(), 2);
}

#[test]
fn empty_result_has_nothing_to_export() {
    let mut session = Session::default();
    session.load(scenario());
    let result = SearchCommand::new(SearchInput {
        name: Some("nobody".to_string()),
        ..Default::default()
    })
    .execute(&mut session)
    .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.summary.count, 0);
    assert_eq!(result.summary.display_hours(), "0");

    let printed_on = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    for command in [
        ExportCommand::Csv,
        ExportCommand::TablePdf { printed_on },
        ExportCommand::DetailPdf { index: 0 },
    ] {
        let err = command.execute(&session).unwrap_err();
        assert!(matches!(err, DashboardError::NothingToExport));
        assert_eq!(err.to_string(), "ไม่พบข้อมูลที่จะดาวน์โหลด");
    }
}

#[test]
fn header_only_sheet_is_empty_not_an_error() {
    let dataset = Dataset::load(vec![vec![json!("header")]]);
    assert!(dataset.is_empty());
    let dataset = Dataset::load(Vec::new());
    assert!(dataset.is_empty());
}

#[test]
fn detail_export_of_sorted_record() {
    let mut session = Session::default();
    session.load(scenario());
    SearchCommand::default().execute(&mut session).unwrap();
    let ExportArtifact::Detail(view) = ExportCommand::DetailPdf { index: 1 }
        .execute(&session)
        .unwrap()
    else {
        panic!("expected detail view");
    };
    assert_eq!(view.name, "rowA");
    assert!(view.attachments.is_empty());
}

#[test]
fn drive_link_resolves_and_unknown_link_does_not() {
    assert_eq!(
        resolve_file_id("https://drive.example.com/file/d/ABC123/view"),
        Some("ABC123")
    );
    assert_eq!(resolve_file_id("https://example.com/report.pdf"), None);
}
