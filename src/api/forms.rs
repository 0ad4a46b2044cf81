// Form descriptions for the rendering layer

use crate::api::routes::AppState;
use crate::domain::report::report_field_specs;
use crate::domain::{FieldSpec, Rank, Unit};
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ReportForm {
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountForm {
    pub ranks: Vec<&'static str>,
    pub units: Vec<&'static str>,
    pub password_min_length: usize,
}

/// GET /v1/forms/report
pub async fn report_form() -> Json<ReportForm> {
    Json(ReportForm {
        fields: report_field_specs(),
    })
}

/// GET /v1/forms/account
pub async fn account_form(State(state): State<AppState>) -> Json<AccountForm> {
    Json(AccountForm {
        ranks: Rank::ALL.iter().map(Rank::label).collect(),
        units: Unit::ALL.iter().map(Unit::label).collect(),
        password_min_length: state.auth.password_min_length(),
    })
}
