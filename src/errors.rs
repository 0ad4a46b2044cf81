use crate::domain::form::FieldError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    DatabaseMigration(#[from] sqlx::migrate::MigrateError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Token generation failed: {0}")]
    TokenGeneration(String),
    #[error("Token validation failed: {0}")]
    TokenValidation(String),
    #[error("Token has expired")]
    TokenExpired,

    // Authorization errors
    #[error("Forbidden")]
    Forbidden,

    // Account errors
    #[error("Display name already in use")]
    DuplicateName,
    #[error("Account not found")]
    NotFound,

    // Password errors
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    // Validation errors
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("Import error: {0}")]
    Import(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Cryptographic errors
    #[error("Cryptographic error: {0}")]
    Cryptographic(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            ErrorKind::InvalidToken => AppError::TokenValidation("Invalid token".to_string()),
            _ => AppError::TokenValidation(err.to_string()),
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Import(err.to_string())
    }
}

impl From<calamine::Error> for AppError {
    fn from(err: calamine::Error) -> Self {
        AppError::Import(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Internal(format!("Failed to write workbook: {}", err))
    }
}

const GENERIC_FAILURE: &str = "Falha ao processar a solicitação. Tente novamente.";

impl AppError {
    /// Stable machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_)
            | AppError::DatabaseMigration(_)
            | AppError::Serialization(_)
            | AppError::TokenGeneration(_)
            | AppError::Configuration(_)
            | AppError::Cryptographic(_)
            | AppError::Internal(_) => "internal_error",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::NotAuthenticated
            | AppError::TokenValidation(_)
            | AppError::TokenExpired => "not_authenticated",
            AppError::Forbidden => "forbidden",
            AppError::DuplicateName => "duplicate_name",
            AppError::NotFound => "not_found",
            AppError::PasswordMismatch => "password_mismatch",
            AppError::PasswordTooShort { .. } => "password_too_short",
            AppError::Validation(_) => "validation_failed",
            AppError::Import(_) => "import_failed",
        }
    }

    /// Message shown inline to the user
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidCredentials => "Nome de usuário ou senha inválidos.".to_string(),
            AppError::NotAuthenticated
            | AppError::TokenValidation(_)
            | AppError::TokenExpired => {
                "Sessão inválida ou expirada. Por favor, faça login novamente.".to_string()
            }
            AppError::Forbidden => "Acesso não permitido para este perfil.".to_string(),
            AppError::DuplicateName => "Este nome de guerra já está em uso.".to_string(),
            AppError::NotFound => "Usuário não encontrado.".to_string(),
            AppError::PasswordMismatch => "As senhas não coincidem.".to_string(),
            AppError::PasswordTooShort { min } => {
                format!("A senha deve ter pelo menos {} caracteres.", min)
            }
            AppError::Validation(_) => "Verifique os campos destacados.".to_string(),
            AppError::Import(detail) => format!("Não foi possível ler a planilha: {}", detail),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::NotAuthenticated
            | AppError::TokenValidation(_)
            | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DuplicateName => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::PasswordMismatch
            | AppError::PasswordTooShort { .. }
            | AppError::Validation(_)
            | AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_)
            | AppError::DatabaseMigration(_)
            | AppError::Serialization(_)
            | AppError::TokenGeneration(_)
            | AppError::Configuration(_)
            | AppError::Cryptographic(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Implement IntoResponse for Axum
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }

        let mut body = json!({
            "error": self.code(),
            "message": self.user_message(),
            "status": status.as_u16(),
        });

        if let AppError::Validation(fields) = &self {
            body["fields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::DuplicateName.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::PasswordTooShort { min: 4 }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AppError::Internal("connection refused on 10.0.0.3".to_string());
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_password_too_short_message_names_minimum() {
        let err = AppError::PasswordTooShort { min: 6 };
        assert!(err.user_message().contains('6'));
    }
}
