// Administrator dashboard

use crate::api::routes::AppState;
use crate::errors::Result;
use crate::reporting::{dashboard_summary, DashboardSummary};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

const DEFAULT_RECENT_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub recent: Option<usize>,
}

/// GET /v1/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardSummary>> {
    let reports = state.ledger.list_all().await?;
    let limit = query.recent.unwrap_or(DEFAULT_RECENT_LIMIT);

    Ok(Json(dashboard_summary(&reports, limit)))
}
