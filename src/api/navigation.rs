// Navigation decision endpoint

use crate::auth::Principal;
use crate::authz::{route, View};
use crate::domain::FieldError;
use crate::errors::{AppError, Result};
use crate::observability::MetricsRecorder;
use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    pub view: Option<String>,
    pub path: Option<String>,
}

impl NavigationQuery {
    fn requested_view(&self) -> Result<View> {
        let resolved = match (&self.view, &self.path) {
            (Some(name), _) => View::from_name(name.trim()).ok_or("view"),
            (None, Some(path)) => View::from_path(path.trim()).ok_or("path"),
            (None, None) => Err("view"),
        };

        resolved.map_err(|field| {
            AppError::Validation(vec![FieldError::new(field, "Página desconhecida.")])
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub requested: View,
    /// `render` or `redirect`
    pub decision: &'static str,
    pub view: View,
    pub path: &'static str,
    pub authenticated: bool,
}

/// GET /v1/navigation?view=…|path=…
pub async fn navigate(
    principal: Option<Principal>,
    Query(query): Query<NavigationQuery>,
) -> Result<Json<NavigationResponse>> {
    let requested = query.requested_view()?;
    let decision = route(principal.as_ref().map(|p| p.role), requested);

    MetricsRecorder::record_navigation(requested.as_str(), decision.as_str());

    Ok(Json(NavigationResponse {
        requested,
        decision: decision.as_str(),
        view: decision.view(),
        path: decision.view().path(),
        authenticated: principal.is_some(),
    }))
}
