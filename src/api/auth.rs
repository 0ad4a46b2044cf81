// Authentication endpoints

use crate::api::routes::AppState;
use crate::auth::{LoginOutcome, Principal};
use crate::authz::{route, View};
use crate::domain::{Account, FieldError, Rank, Unit};
use crate::errors::{AppError, Result};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(alias = "displayName")]
    pub username: String,
    pub password: String,
}

/// Where the client should navigate next
#[derive(Debug, Serialize)]
pub struct Landing {
    pub view: View,
    pub path: &'static str,
}

impl From<View> for Landing {
    fn from(view: View) -> Self {
        Self {
            view,
            path: view.path(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub principal: Principal,
    pub landing: Landing,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        // Asking for the login view once signed in lands on the role's home
        let home = route(Some(outcome.principal.role), View::Login).view();
        Self {
            access_token: outcome.token,
            token_type: "Bearer".to_string(),
            expires_in: outcome.expires_in,
            principal: outcome.principal,
            landing: home.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub landing: Landing,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>, landing: View) -> Self {
        Self {
            message: message.into(),
            landing: landing.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub principal: Option<Principal>,
    pub landing: Landing,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
}

/// Profile and secret for a new account; labels as shown on the form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccountRequest {
    #[serde(default, alias = "username")]
    pub display_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default, alias = "platoon")]
    pub unit: String,
}

impl NewAccountRequest {
    /// Every field is required; rank and unit must be known labels
    pub fn parse(&self) -> Result<(Rank, Unit)> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("displayName", &self.display_name),
            ("password", &self.password),
            ("rank", &self.rank),
            ("unit", &self.unit),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, "Todos os campos são obrigatórios."));
            }
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let rank = Rank::from_label(&self.rank);
        let unit = Unit::from_label(&self.unit);
        if rank.is_none() {
            errors.push(FieldError::new("rank", "Opção inválida."));
        }
        if unit.is_none() {
            errors.push(FieldError::new("unit", "Opção inválida."));
        }

        match (rank, unit) {
            (Some(rank), Some(unit)) => Ok((rank, unit)),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub account: Account,
    pub message: String,
    pub landing: Landing,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/auth/login
///
/// Authenticate with display name and password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }

    let outcome = state.auth.login(&req.username, &req.password).await?;

    Ok(Json(outcome.into()))
}

/// POST /v1/auth/logout
///
/// Always succeeds, with or without a live session
pub async fn logout(
    State(state): State<AppState>,
    principal: Option<Principal>,
) -> Json<MessageResponse> {
    state.auth.logout(principal.as_ref()).await;

    Json(MessageResponse::new("Sessão encerrada.", View::Login))
}

/// GET /v1/auth/session
pub async fn session(principal: Option<Principal>) -> Json<SessionResponse> {
    let landing = route(principal.as_ref().map(|p| p.role), View::Login).view();

    Json(SessionResponse {
        authenticated: principal.is_some(),
        principal,
        landing: landing.into(),
    })
}

/// POST /v1/auth/password
///
/// Replace the caller's password; every session of the account ends
pub async fn change_password(
    State(state): State<AppState>,
    principal: Option<Principal>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .auth
        .change_password(principal.as_ref(), &req.new_password, &req.confirm_password)
        .await?;

    Ok(Json(MessageResponse::new(
        "Senha alterada com sucesso! Faça login novamente.",
        View::Login,
    )))
}

/// POST /v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<NewAccountRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>)> {
    let (rank, unit) = req.parse()?;

    let account = state
        .auth
        .register(&req.display_name, &req.password, rank, unit)
        .await?;

    tracing::info!(account_id = %account.id, "Self-service registration");

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            account,
            message: "Cadastro realizado com sucesso! Você será redirecionado para o login."
                .to_string(),
            landing: View::Login.into(),
        }),
    ))
}
