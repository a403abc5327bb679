use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use utoipa::{OpenApi, ToSchema};

use crate::fetch_error::FetchError;
use crate::pipeline::{HeaderDialect, Measure, ObservationRecord, PipelineError, RecordKind};
use crate::services::{SeriesService, ServiceError};
use crate::snapshot::{
    ChartKind, ChartPanel, ChartPoint, ChartTrace, LatestConditions, MetricReading,
    WeatherSnapshot,
};

#[derive(Clone)]
pub struct AppState {
    pub series_service: SeriesService,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// `fetch`, `parse`, `schema`, `no_data` or `internal`
    pub kind: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ObservationsResponse {
    pub source: String,
    pub dialect: HeaderDialect,
    pub computed_at: DateTime<Utc>,
    pub total_rows: usize,
    pub dropped_rows: usize,
    pub gap_marker_count: usize,
    pub labels: Vec<String>,
    pub records: Vec<ObservationRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct PanelSummary {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
}

#[derive(Serialize, ToSchema)]
pub struct MeasurementsResponse {
    pub dialect: HeaderDialect,
    pub measures: Vec<Measure>,
    pub panels: Vec<PanelSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct ChartsResponse {
    pub computed_at: DateTime<Utc>,
    pub panels: Vec<ChartPanel>,
}

/// Error rendered as a status code plus a JSON body naming the failed precondition.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, kind: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                kind: kind.to_string(),
                message: message.into(),
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Fetch(FetchError::Io(_)) => {
                error!("Failed to read weather export: {}", message);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
            }
            ServiceError::Fetch(_) => {
                error!("Failed to fetch weather export: {}", message);
                ApiError::new(StatusCode::BAD_GATEWAY, "fetch", message)
            }
            ServiceError::Pipeline(PipelineError::Parse(_)) => {
                error!("Weather export is not valid CSV: {}", message);
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "parse", message)
            }
            ServiceError::Pipeline(PipelineError::Schema { .. }) => {
                error!("Weather export has unusable schema: {}", message);
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "schema", message)
            }
            ServiceError::Pipeline(PipelineError::EmptyResult { .. }) => {
                warn!("No data available: {}", message);
                ApiError::new(StatusCode::NOT_FOUND, "no_data", "No data available")
            }
            ServiceError::Task(_) => {
                error!("Pipeline task failed: {}", message);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        get_observations,
        get_chart_observations,
        get_latest,
        get_measurements,
        get_charts
    ),
    components(schemas(
        HealthResponse,
        ErrorResponse,
        ObservationsResponse,
        MeasurementsResponse,
        PanelSummary,
        ChartsResponse,
        ObservationRecord,
        RecordKind,
        HeaderDialect,
        Measure,
        LatestConditions,
        MetricReading,
        ChartPanel,
        ChartTrace,
        ChartPoint,
        ChartKind
    )),
    tags((name = "weather", description = "Normalized weather observation series"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/observations", get(get_observations))
        .route("/observations/chart", get(get_chart_observations))
        .route("/observations/latest", get(get_latest))
        .route("/measurements", get(get_measurements))
        .route("/charts", get(get_charts))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

fn observations_response(snapshot: &WeatherSnapshot, chart: bool) -> ObservationsResponse {
    let series = if chart {
        snapshot.chart()
    } else {
        snapshot.table()
    };

    ObservationsResponse {
        source: snapshot.source().to_string(),
        dialect: snapshot.dialect(),
        computed_at: snapshot.computed_at(),
        total_rows: snapshot.total_rows(),
        dropped_rows: snapshot.dropped_rows(),
        gap_marker_count: series.gap_marker_count(),
        labels: series.labels().to_vec(),
        records: series.records().to_vec(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "weather",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/observations",
    tag = "weather",
    responses(
        (status = 200, description = "Ordered observations without gap markers", body = ObservationsResponse),
        (status = 404, description = "No data available", body = ErrorResponse),
        (status = 422, description = "Export is malformed or lacks Date/Time", body = ErrorResponse),
        (status = 502, description = "Export could not be fetched", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_observations(
    State(state): State<AppState>,
) -> Result<Json<ObservationsResponse>, ApiError> {
    debug!("Fetching observation table");
    let snapshot = state.series_service.get_snapshot().await?;
    let response = observations_response(&snapshot, false);

    info!("Returning {} observations", response.records.len());
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/observations/chart",
    tag = "weather",
    responses(
        (status = 200, description = "Observations with gap markers for line charts", body = ObservationsResponse),
        (status = 404, description = "No data available", body = ErrorResponse),
        (status = 422, description = "Export is malformed or lacks Date/Time", body = ErrorResponse),
        (status = 502, description = "Export could not be fetched", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_chart_observations(
    State(state): State<AppState>,
) -> Result<Json<ObservationsResponse>, ApiError> {
    debug!("Fetching chart series");
    let snapshot = state.series_service.get_snapshot().await?;
    let response = observations_response(&snapshot, true);

    info!(
        "Returning {} chart records ({} gap markers)",
        response.records.len(),
        response.gap_marker_count
    );
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/observations/latest",
    tag = "weather",
    responses(
        (status = 200, description = "Latest complete conditions", body = LatestConditions),
        (status = 404, description = "No recent valid data", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_latest(State(state): State<AppState>) -> Result<Json<LatestConditions>, ApiError> {
    debug!("Fetching latest conditions");
    let snapshot = state.series_service.get_snapshot().await?;

    let latest = snapshot.latest_conditions().ok_or_else(|| {
        warn!("No recent valid data to display metrics");
        ApiError::new(
            StatusCode::NOT_FOUND,
            "no_data",
            "No recent valid data to display metrics",
        )
    })?;

    info!("Retrieved latest conditions from {}", latest.timestamp);
    Ok(Json(latest))
}

#[utoipa::path(
    get,
    path = "/api/v1/measurements",
    tag = "weather",
    responses(
        (status = 200, description = "Dialect, recognized measures and renderable panels", body = MeasurementsResponse),
        (status = 404, description = "No data available", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_measurements(
    State(state): State<AppState>,
) -> Result<Json<MeasurementsResponse>, ApiError> {
    let snapshot = state.series_service.get_snapshot().await?;

    let panels = snapshot
        .chart_panels()
        .into_iter()
        .map(|panel| PanelSummary {
            id: panel.id,
            title: panel.title,
            kind: panel.kind,
        })
        .collect();

    Ok(Json(MeasurementsResponse {
        dialect: snapshot.dialect(),
        measures: snapshot.present_measures(),
        panels,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/charts",
    tag = "weather",
    responses(
        (status = 200, description = "Chart panels with gap-aware data", body = ChartsResponse),
        (status = 404, description = "No data available", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_charts(State(state): State<AppState>) -> Result<Json<ChartsResponse>, ApiError> {
    let snapshot = state.series_service.get_snapshot().await?;
    let panels = snapshot.chart_panels();

    info!("Returning {} chart panels", panels.len());
    Ok(Json(ChartsResponse {
        computed_at: snapshot.computed_at(),
        panels,
    }))
}
