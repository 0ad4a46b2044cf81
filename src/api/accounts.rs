// Account management for the administrator

use crate::api::auth::NewAccountRequest;
use crate::api::routes::AppState;
use crate::auth::password::validate_new_password;
use crate::db::DeletionSummary;
use crate::domain::{Account, FieldError, Rank, Unit};
use crate::errors::{AppError, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

/// Partial update; blank or missing values are left unchanged
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub rank: Option<String>,
    #[serde(alias = "platoon")]
    pub unit: Option<String>,
    pub password: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl UpdateAccountRequest {
    fn parse(&self) -> Result<(Option<Rank>, Option<Unit>)> {
        let mut errors = Vec::new();

        let rank = present(&self.rank).map(|label| {
            Rank::from_label(label).ok_or_else(|| FieldError::new("rank", "Opção inválida."))
        });
        let unit = present(&self.unit).map(|label| {
            Unit::from_label(label).ok_or_else(|| FieldError::new("unit", "Opção inválida."))
        });

        let rank = rank.transpose().unwrap_or_else(|e| {
            errors.push(e);
            None
        });
        let unit = unit.transpose().unwrap_or_else(|e| {
            errors.push(e);
            None
        });

        if errors.is_empty() {
            Ok((rank, unit))
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

/// GET /v1/admin/accounts
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Account>>> {
    Ok(Json(state.directory.list_accounts().await?))
}

/// POST /v1/admin/accounts
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<NewAccountRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    let (rank, unit) = req.parse()?;

    let account = state
        .auth
        .register(&req.display_name, &req.password, rank, unit)
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// PATCH /v1/admin/accounts/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<Json<Account>> {
    let (rank, unit) = req.parse()?;
    let password = req.password.as_deref().filter(|p| !p.is_empty());

    if let Some(password) = password {
        validate_new_password(password, password, state.auth.password_min_length())?;
    }

    let account = state.directory.update_account(&id, rank, unit).await?;

    if let Some(password) = password {
        state.auth.reset_password(&id, password).await?;
    }

    Ok(Json(account))
}

/// DELETE /v1/admin/accounts/:id
///
/// Removes the account with its credential, sessions and reports
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletionSummary>> {
    Ok(Json(state.directory.delete_account(&id).await?))
}
