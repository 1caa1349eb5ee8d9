use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::aggregate::{ChartField, Summary};
use crate::commands::{ClearCommand, ExportArtifact, ExportCommand, SearchCommand};
use crate::config::DashboardConfig;
use crate::detail::DetailView;
use crate::downloader::CSV_CONTENT_TYPE;
use crate::error::{DashboardError, Result};
use crate::filter::SearchInput;
use crate::graph::{ChartData, GraphOptions, render_pie_chart};
use crate::loader::{build_client, fetch_dataset};
use crate::raster::export_detail_pdf;
use crate::record::Record;
use crate::session::{FilteredResult, Session};

/// Shown when a search matches nothing
pub const NO_MATCH_MESSAGE: &str = "ไม่พบข้อมูลที่ตรงกับเงื่อนไขการค้นหา";

pub struct AppState {
    session: Mutex<Session>,
    client: Client,
    config: DashboardConfig,
    exports: ExportGuards,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let session = Session::new(config.date_parser());
        Self::with_session(config, session)
    }

    /// State around an already populated session
    pub fn with_session(config: DashboardConfig, session: Session) -> Result<Self> {
        Ok(AppState {
            session: Mutex::new(session),
            client: build_client(config.fetch_timeout())?,
            config,
            exports: ExportGuards::default(),
        })
    }
}

/// One flag per export kind; a second trigger while the first runs is refused
#[derive(Default)]
struct ExportGuards {
    csv: AtomicBool,
    table: AtomicBool,
    detail: AtomicBool,
}

/// Clears its flag when the export finishes, however it finishes
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(DashboardError::ExportInProgress);
        }
        Ok(InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Serialize)]
struct Notice {
    status: String,
    message: Option<String>,
}

impl Notice {
    fn ok(message: Option<String>) -> Json<Notice> {
        Json(Notice {
            status: "ok".to_string(),
            message,
        })
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            DashboardError::InvalidCriterion { .. } => StatusCode::BAD_REQUEST,
            DashboardError::NothingToExport | DashboardError::RecordNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            DashboardError::ExportInProgress => StatusCode::CONFLICT,
            DashboardError::MalformedRecord { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DashboardError::Retrieval(_) | DashboardError::Http(_) => StatusCode::BAD_GATEWAY,
            DashboardError::Render(_) | DashboardError::Json(_) | DashboardError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }

        let body = Notice {
            status: "error".to_string(),
            message: Some(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryView {
    count: usize,
    total_hours: f64,
    display_hours: String,
}

impl From<&Summary> for SummaryView {
    fn from(summary: &Summary) -> Self {
        SummaryView {
            count: summary.count,
            total_hours: summary.total_hours,
            display_hours: summary.display_hours(),
        }
    }
}

#[derive(Serialize)]
struct ResultsResponse {
    status: String,
    message: Option<String>,
    summary: SummaryView,
    records: Vec<Record>,
    charts: Vec<ChartData>,
}

impl ResultsResponse {
    fn from_result(result: &FilteredResult) -> Self {
        let message = result.is_empty().then(|| NO_MATCH_MESSAGE.to_string());
        ResultsResponse {
            status: "ok".to_string(),
            message,
            summary: SummaryView::from(&result.summary),
            records: result.records.clone(),
            charts: ChartField::ALL
                .iter()
                .map(|&field| ChartData::from_counts(field, &result.counts(field)))
                .collect(),
        }
    }
}

/// Build the dashboard router over shared state
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/refresh", post(refresh))
        .route("/api/search", post(search))
        .route("/api/clear", post(clear))
        .route("/api/results", get(results))
        .route("/api/records/:index", get(record_detail))
        .route("/api/charts/:field", get(chart))
        .route("/api/export/csv", get(export_csv))
        .route("/api/export/table-pdf", get(export_table_pdf))
        .route("/api/export/detail-pdf/:index", get(export_detail))
        .nest_service("/static", static_dir)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: DashboardConfig) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let bind = config.bind.clone();
    let state = Arc::new(AppState::new(config)?);

    // Initial load; an unreachable endpoint leaves the dashboard empty
    let dataset = fetch_dataset(&state.client, &state.config.endpoint).await;
    state.session.lock().await.load(dataset);

    let app = router(state);

    let listener = TcpListener::bind(&bind).await?;
    log::info!("Listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rows = state.session.lock().await.dataset().len();
    Notice::ok(Some(format!("{rows} rows loaded")))
}

async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let dataset = fetch_dataset(&state.client, &state.config.endpoint).await;
    let rows = dataset.len();
    state.session.lock().await.load(dataset);
    Notice::ok(Some(format!("{rows} rows loaded")))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(input): Json<SearchInput>,
) -> Result<Json<ResultsResponse>> {
    let mut session = state.session.lock().await;
    if session.dataset().is_empty() {
        let dataset = fetch_dataset(&state.client, &state.config.endpoint).await;
        session.load(dataset);
    }

    let result = SearchCommand::new(input).execute(&mut session)?;
    Ok(Json(ResultsResponse::from_result(result)))
}

async fn clear(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ClearCommand.execute(&mut *state.session.lock().await);
    Notice::ok(None)
}

async fn results(State(state): State<Arc<AppState>>) -> Json<ResultsResponse> {
    let session = state.session.lock().await;
    Json(ResultsResponse::from_result(session.result()))
}

async fn record_detail(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<DetailView>> {
    let session = state.session.lock().await;
    let record = session.record(index)?;
    Ok(Json(DetailView::from_record(record, session.parser())))
}

async fn chart(State(state): State<Arc<AppState>>, Path(field): Path<String>) -> Response {
    let Some(field) = ChartField::from_slug(&field) else {
        let body = Notice {
            status: "error".to_string(),
            message: Some(format!("unknown chart field {field:?}")),
        };
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    };

    let data = {
        let session = state.session.lock().await;
        ChartData::from_counts(field, &session.result().counts(field))
    };
    match render_pie_chart(&data, &GraphOptions::default()) {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => e.into_response(),
    }
}

fn attachment_disposition(filename: &str) -> String {
    format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

async fn export_csv(State(state): State<Arc<AppState>>) -> Result<Response> {
    let _guard = InFlight::acquire(&state.exports.csv)?;
    let artifact = ExportCommand::Csv.execute(&*state.session.lock().await)?;
    let ExportArtifact::Csv(csv) = artifact else {
        return Err(DashboardError::Render("unexpected export artifact".to_string()));
    };

    let headers = [
        (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
        (header::CONTENT_DISPOSITION, attachment_disposition(csv.filename)),
    ];
    Ok((headers, csv.into_bytes()).into_response())
}

async fn export_table_pdf(State(state): State<Arc<AppState>>) -> Result<Response> {
    let _guard = InFlight::acquire(&state.exports.table)?;
    let session = state.session.lock().await;
    let printed_on = Utc::now()
        .with_timezone(&session.parser().offset())
        .date_naive();
    let command = ExportCommand::TablePdf { printed_on };
    let ExportArtifact::TablePdf(layout) = command.execute(&session)? else {
        return Err(DashboardError::Render("unexpected export artifact".to_string()));
    };
    Ok(Json(layout).into_response())
}

async fn export_detail(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Response> {
    let _guard = InFlight::acquire(&state.exports.detail)?;
    // Thumbnail waits can take seconds; do not hold the session meanwhile
    let view = {
        let session = state.session.lock().await;
        let command = ExportCommand::DetailPdf { index };
        match command.execute(&session)? {
            ExportArtifact::Detail(view) => view,
            _ => return Err(DashboardError::Render("unexpected export artifact".to_string())),
        }
    };

    let pdf = export_detail_pdf(&state.client, &view, state.config.image_timeout()).await?;
    Ok(Json(pdf).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::record::Row;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn row(name: &str, status: &str, start: &str, hours: &str) -> Row {
        let mut cells = vec![String::new(); 21];
        cells[1] = name.to_string();
        cells[2] = status.to_string();
        cells[9] = start.to_string();
        cells[20] = hours.to_string();
        Row(cells)
    }

    fn app() -> Router {
        let mut session = Session::default();
        session.load(Dataset::from_rows(vec![
            row("สมชาย", "ครู", "2024-03-01", "6"),
            row("สมหญิง", "นักเรียน", "2024-01-10", "2.5"),
        ]));
        let state = AppState::with_session(DashboardConfig::default(), session).unwrap();
        router(Arc::new(state))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn json(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn search_returns_sorted_records_and_summary() {
        let app = app();
        let (status, body) = send(&app, "POST", "/api/search", "{}").await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["records"][0]["name"], "สมหญิง");
        assert_eq!(body["summary"]["count"], 2);
        assert_eq!(body["summary"]["displayHours"], "9");
        assert_eq!(body["charts"].as_array().unwrap().len(), 5);
        assert!(body["message"].is_null());
    }

    #[tokio::test]
    async fn no_match_carries_message() {
        let app = app();
        let (status, body) = send(&app, "POST", "/api/search", r#"{"name":"zzz"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["message"], NO_MATCH_MESSAGE);
    }

    #[tokio::test]
    async fn bad_date_is_bad_request() {
        let app = app();
        let (status, body) =
            send(&app, "POST", "/api/search", r#"{"startDate":"not a date"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["status"], "error");
    }

    #[tokio::test]
    async fn exports_need_a_result() {
        let app = app();
        let (status, body) = send(&app, "GET", "/api/export/csv", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["message"], "ไม่พบข้อมูลที่จะดาวน์โหลด");
    }

    #[tokio::test]
    async fn csv_export_after_search() {
        let app = app();
        send(&app, "POST", "/api/search", r#"{"name":"สมชาย"}"#).await;
        let (status, body) = send(&app, "GET", "/api/export/csv", "").await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with('\u{FEFF}'));
        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test]
    async fn table_layout_after_search() {
        let app = app();
        send(&app, "POST", "/api/search", "{}").await;
        let (status, body) = send(&app, "GET", "/api/export/table-pdf", "").await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["pages"][0]["rows"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn record_detail_is_bounded() {
        let app = app();
        send(&app, "POST", "/api/search", "{}").await;
        let (status, body) = send(&app, "GET", "/api/records/1", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["name"], "สมชาย");
        let (status, _) = send(&app, "GET", "/api/records/7", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_chart_field_is_not_found() {
        let (status, _) = send(&app(), "GET", "/api/charts/colour", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn chart_route_serves_png() {
        let app = app();
        send(&app, "POST", "/api/search", "{}").await;
        let request = Request::builder()
            .uri("/api/charts/status")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn detail_pdf_route_returns_layout_and_raster() {
        use base64::Engine as _;

        let app = app();
        send(&app, "POST", "/api/search", "{}").await;
        let (status, body) = send(&app, "GET", "/api/export/detail-pdf/0", "").await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["filename"], "รายละเอียด-สมหญิง.pdf");
        let png = base64::engine::general_purpose::STANDARD
            .decode(body["pngBase64"].as_str().unwrap())
            .unwrap();
        assert!(png.starts_with(b"\x89PNG"));
        assert_eq!(body["layout"]["image"]["y"], 25.4);
    }

    #[tokio::test]
    async fn clear_keeps_results() {
        let app = app();
        send(&app, "POST", "/api/search", r#"{"name":"สม"}"#).await;
        let (status, _) = send(&app, "POST", "/api/clear", "").await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, "GET", "/api/results", "").await;
        assert_eq!(json(&body)["summary"]["count"], 2);
    }

    #[test]
    fn overlapping_export_is_refused() {
        let flag = AtomicBool::new(false);
        let first = InFlight::acquire(&flag).unwrap();
        assert!(matches!(
            InFlight::acquire(&flag),
            Err(DashboardError::ExportInProgress)
        ));
        drop(first);
        assert!(InFlight::acquire(&flag).is_ok());
    }
}
