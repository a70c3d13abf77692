use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::calculator::{CalculatorForm, CalculatorRecord, Parameter};
use crate::config::Config;
use crate::editor::{self, EditorMode};
use crate::error::{EditorError, FormulaError, StoreError, ValidationError};
use crate::evaluator::{Evaluation, ParamValues, evaluate_formula};
use crate::listing::{CalculatorSummary, ListFilter, ListView};
use crate::preview::{Previews, render_previews};
use crate::store::{CalculatorStore, fetch_record};
use crate::transform::{MATH_COMPONENTS, OPERATORS, PaletteItem};
use crate::units::{ConversionTable, search_unit_options};

pub struct AppState {
    pub store: Arc<dyn CalculatorStore>,
    pub conversions: ConversionTable,
}

impl AppState {
    pub fn new(store: Arc<dyn CalculatorStore>) -> Self {
        AppState {
            store,
            conversions: ConversionTable::standard(),
        }
    }
}

#[derive(Deserialize)]
struct ListQuery {
    search: Option<String>,
    filter: Option<String>,
}

#[derive(Deserialize)]
struct UnitQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateRequest {
    formula: String,
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    values: ParamValues,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviewRequest {
    #[serde(default)]
    calculator_name: String,
    #[serde(default)]
    parameters: Vec<Parameter>,
    formula: String,
}

#[derive(Serialize)]
struct SaveResponse {
    status: String,
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaletteResponse {
    math_components: &'static [PaletteItem],
    operators: &'static [PaletteItem],
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

/// Failure of a single request. Store failures carry only the generic,
/// user-facing message; the detail has already been logged.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Formula(FormulaError),
    NotFound(String),
    BadRequest(String),
    Store(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Formula(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("No such calculator found: {}", id),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Store(message) => (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()),
        };

        (
            status,
            Json(ErrorResponse {
                status: "error".to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<EditorError> for ApiError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::Validation(e) => ApiError::Validation(e),
            EditorError::Store(_) => ApiError::Store("Failed to save calculator. Please try again."),
        }
    }
}

/// Build the router over `state`, serving `static_dir` under `/static`.
pub fn router(state: Arc<AppState>, static_dir: &FsPath) -> Router {
    Router::new()
        .route(
            "/api/calculators",
            get(list_calculators).post(create_calculator),
        )
        .route(
            "/api/calculators/:id",
            get(get_calculator)
                .put(update_calculator)
                .delete(delete_calculator),
        )
        .route("/api/formula/evaluate", post(evaluate))
        .route("/api/formula/preview", post(preview))
        .route("/api/formula/palette", get(palette))
        .route("/api/units", get(units))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = config.open_store()?;
    let app_state = Arc::new(AppState::new(store));
    let app = router(app_state, &config.static_dir);

    let listener = TcpListener::bind(config.bind_addr).await?;
    log::info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn list_calculators(
    Query(params): Query<ListQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CalculatorSummary>>, ApiError> {
    let filter = params
        .filter
        .as_deref()
        .unwrap_or("all")
        .parse::<ListFilter>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let view = ListView::load(state.store.as_ref())
        .await
        .map_err(|_| ApiError::Store("Failed to load calculators"))?;

    Ok(Json(view.visible(params.search.as_deref().unwrap_or(""), filter)))
}

async fn create_calculator(
    State(state): State<Arc<AppState>>,
    Json(form): Json<CalculatorForm>,
) -> Result<impl IntoResponse, ApiError> {
    let id = editor::submit(state.store.as_ref(), &EditorMode::Create, &form).await?;
    Ok((
        StatusCode::CREATED,
        Json(SaveResponse {
            status: "ok".to_string(),
            id,
        }),
    ))
}

async fn get_calculator(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CalculatorRecord>, ApiError> {
    match fetch_record(state.store.as_ref(), &id).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(ApiError::NotFound(id)),
        Err(e) => {
            log::error!("Error fetching calculator details: {}", e);
            Err(ApiError::Store("Failed to load calculator"))
        }
    }
}

async fn update_calculator(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(form): Json<CalculatorForm>,
) -> Result<Json<SaveResponse>, ApiError> {
    let mode = EditorMode::from_route(Some(&id));
    let id = editor::submit(state.store.as_ref(), &mode, &form).await?;
    Ok(Json(SaveResponse {
        status: "ok".to_string(),
        id,
    }))
}

async fn delete_calculator(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&id).await.map_err(|e: StoreError| {
        log::error!("Error deleting calculator: {}", e);
        ApiError::Store("Failed to delete calculator. Please try again.")
    })?;
    log::info!("Deleted calculator {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<Evaluation>, ApiError> {
    evaluate_formula(
        &request.formula,
        &request.parameters,
        &request.values,
        &state.conversions,
    )
    .map(Json)
    .map_err(ApiError::Formula)
}

async fn preview(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PreviewRequest>,
) -> Json<Previews> {
    Json(render_previews(
        &request.calculator_name,
        &request.parameters,
        &request.formula,
        &state.conversions,
    ))
}

async fn palette() -> Json<PaletteResponse> {
    Json(PaletteResponse {
        math_components: MATH_COMPONENTS,
        operators: OPERATORS,
    })
}

async fn units(Query(params): Query<UnitQuery>) -> Json<Vec<&'static str>> {
    Json(search_unit_options(params.q.as_deref().unwrap_or("")))
}
