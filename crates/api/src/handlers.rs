use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{HeaderMap, header};
use axum::Json;
use eval::{ConsistencyFlag, EvaluationRecord, ScoreRun};
use ingest::{Document, ExtractionFailure};
use scoring::{PitchText, ScoreSet};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics::{MetricsSnapshot, Operation, TimedOperation};
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    llm: String,
    database: String,
}

#[derive(Deserialize)]
pub struct ScoreTextRequest {
    text: Option<String>,
    answers_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub scores: ScoreSet,
    pub total_score: Option<f64>,
    pub preview_text: String,
    pub preview_text_full: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extraction_failures: Vec<ExtractionFailure>,
}

#[derive(Deserialize)]
pub struct ReportRequest {
    scores: Option<Value>,
    project_text: Option<String>,
}

#[derive(Deserialize)]
pub struct MacroRiskRequest {
    #[serde(default)]
    startup_text: String,
}

#[derive(Serialize)]
pub struct MacroRiskResponse {
    analysis: String,
}

#[derive(Deserialize)]
pub struct SubjectivityRequest {
    records: Vec<EvaluationRecord>,
}

#[derive(Serialize)]
pub struct SubjectivityResponse {
    category_std_dev: eval::CategoryTable,
    mean_abs_deviation: BTreeMap<String, f64>,
    rubric_drift: eval::CategoryTable,
    mean_abs_drift: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
pub struct ConsistencyRequest {
    #[serde(default)]
    score_runs: Vec<ScoreRun>,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello, this is the root!" }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database) = match state.risk.check_store().await {
        None => ("ok", "not configured".to_string()),
        Some(Ok(())) => ("ok", "ok".to_string()),
        Some(Err(e)) => ("degraded", format!("error: {}", e)),
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        llm: state.llm_model.clone(),
        database,
    })
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Accepts either a multipart upload of one or more documents or a JSON
/// body carrying `text` / `answers_text`.
pub async fn score(State(state): State<AppState>, request: Request) -> Result<Json<ScoreResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("score", %request_id);

    let timer = TimedOperation::start();
    let result = score_request(&state, request).instrument(span).await;
    state.metrics.record_operation(Operation::Score, timer.elapsed(), result.is_ok());

    result.map(Json)
}

async fn score_request(state: &AppState, request: Request) -> Result<ScoreResponse, ApiError> {
    let (pitch, extraction_failures) = if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, state).await?;
        read_uploads(state, multipart).await?
    } else {
        let Json(body) = Json::<ScoreTextRequest>::from_request(request, state).await?;
        let text = [body.text, body.answers_text]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty())
            .unwrap_or_default();
        (PitchText::from_direct(text)?, Vec::new())
    };

    let scores = state.scorer.score(&pitch).await?;
    state.metrics.record_factors(scores.len());

    Ok(ScoreResponse {
        total_score: scores.average_score(),
        scores,
        preview_text: pitch.preview(),
        preview_text_full: pitch.into_inner(),
        extraction_failures,
    })
}

async fn read_uploads(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(PitchText, Vec<ExtractionFailure>), ApiError> {
    let mut documents = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await?;
        documents.push(Document::new(file_name, bytes.to_vec()));
    }

    if documents.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".to_string()));
    }

    let batch = state.extractor.extract_all(&documents).await;
    state.metrics.record_documents(batch.extracted);

    tracing::info!(
        documents = documents.len(),
        extracted = batch.extracted,
        failed = batch.failures.len(),
        chars = batch.text.len(),
        "Extracted uploads"
    );

    Ok((PitchText::from_documents(batch.text)?, batch.failures))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

pub async fn generate_analysis_report(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;

    let (Some(scores), Some(project_text)) = (body.scores, body.project_text) else {
        return Err(ApiError::BadRequest("Both scores and project_text are required".to_string()));
    };

    let timer = TimedOperation::start();
    let result = state.reports.expand(&scores, &project_text).await;
    state.metrics.record_operation(Operation::Report, timer.elapsed(), result.is_ok());

    Ok(Json(result?))
}

pub async fn macro_risk_analysis(
    State(state): State<AppState>,
    payload: Result<Json<MacroRiskRequest>, JsonRejection>,
) -> Result<Json<MacroRiskResponse>, ApiError> {
    let Json(body) = payload?;

    let timer = TimedOperation::start();
    let result = state.risk.analyze_latest(&body.startup_text).await;
    state.metrics.record_operation(Operation::MacroRisk, timer.elapsed(), result.is_ok());

    Ok(Json(MacroRiskResponse { analysis: result? }))
}

pub async fn subjectivity(
    State(state): State<AppState>,
    payload: Result<Json<SubjectivityRequest>, JsonRejection>,
) -> Result<Json<SubjectivityResponse>, ApiError> {
    let Json(body) = payload?;

    let timer = TimedOperation::start();
    let report = eval::subjectivity(&body.records);
    let drift = eval::rubric_drift(&body.records);
    state.metrics.record_operation(Operation::Subjectivity, timer.elapsed(), true);

    Ok(Json(SubjectivityResponse {
        category_std_dev: report.category_std_dev,
        mean_abs_deviation: report.mean_abs_deviation,
        rubric_drift: drift.drift,
        mean_abs_drift: drift.mean_abs_drift,
    }))
}

pub async fn consistency(
    State(state): State<AppState>,
    payload: Result<Json<ConsistencyRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    state.metrics.record_request(true);

    let response = match eval::consistency_flag(&body.score_runs) {
        Some(flag) => flag_json(&flag)?,
        None => json!({ "flag": null }),
    };
    Ok(Json(response))
}

fn flag_json(flag: &ConsistencyFlag) -> Result<Value, ApiError> {
    serde_json::to_value(flag).map_err(|e| ApiError::Internal(e.to_string()))
}
