// Report submission, listing and spreadsheet transfer

use crate::api::auth::{Landing, MessageResponse};
use crate::api::routes::AppState;
use crate::auth::Principal;
use crate::authz::View;
use crate::domain::form::text_values;
use crate::domain::{ActivityFields, ActivityReport};
use crate::errors::{AppError, Result};
use crate::observability::MetricsRecorder;
use crate::reporting::{export_all, import_rows, parse_sheet, RejectedRow, SheetFormat};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub report: ActivityReport,
    pub message: String,
    pub landing: Landing,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: SheetFormat,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
    pub message: String,
}

/// POST /v1/reports
///
/// Store one shift report for the caller, then end the session
pub async fn submit(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<serde_json::Map<String, serde_json::Value>>,
) -> Result<(StatusCode, Json<SubmitResponse>)> {
    let fields = ActivityFields::from_form(&text_values(&payload))?;

    let report = state
        .ledger
        .submit(fields, &principal.account_id, &principal.display_name)
        .await?;

    MetricsRecorder::record_report_submitted();

    state.auth.logout(Some(&principal)).await;

    let done = MessageResponse::new(
        "Atividade registrada com sucesso! Redirecionando para o login...",
        View::Login,
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            report,
            message: done.message,
            landing: done.landing,
        }),
    ))
}

/// GET /v1/admin/reports
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ActivityReport>>> {
    Ok(Json(state.ledger.list_all().await?))
}

/// GET /v1/admin/reports/export?format=xlsx|csv
///
/// Workbook by default
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse> {
    let reports = state.ledger.list_all().await?;
    let body = export_all(&reports, query.format)?;

    Ok((
        [
            (header::CONTENT_TYPE, query.format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", query.format.file_name()),
            ),
        ],
        body,
    ))
}

/// POST /v1/admin/reports/import
///
/// Accepts a workbook (first sheet) or CSV. Appends every valid row; invalid
/// rows are listed back with their errors
pub async fn import(State(state): State<AppState>, body: Bytes) -> Result<Json<ImportResponse>> {
    if body.is_empty() {
        return Err(AppError::Import("arquivo vazio".to_string()));
    }

    let rows = parse_sheet(&body)?;
    let outcome = import_rows(&rows, Utc::now());
    let rejected = outcome.rejected;

    let imported = state.ledger.bulk_append(outcome.records).await?;

    MetricsRecorder::record_import(imported, rejected.len());

    Ok(Json(ImportResponse {
        imported,
        message: format!("{} registros importados com sucesso!", imported),
        rejected,
    }))
}
