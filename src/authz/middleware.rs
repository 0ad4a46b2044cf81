use crate::{
    api::routes::AppState,
    auth::Principal,
    authz::router::{route, RouteDecision, View},
    errors::{AppError, Result},
    observability::MetricsRecorder,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Bearer token from the `Authorization` header, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the session token into a `Principal` extension.
///
/// Missing or invalid tokens leave the request anonymous; the gates decide
/// what an anonymous caller may reach.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match state.auth.restore(token).await {
            Ok(principal) => {
                tracing::debug!(
                    account_id = %principal.account_id,
                    role = principal.role.as_str(),
                    "Request authenticated"
                );
                request.extensions_mut().insert(principal);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable session token");
            }
        }
    }

    next.run(request).await
}

/// Let the request through only when the navigation decision renders `view`.
///
/// A redirect is 401 for an anonymous caller and 403 for a signed-in one.
pub async fn require_view(view: View, request: Request, next: Next) -> Result<Response> {
    let principal = request.extensions().get::<Principal>();
    let decision = route(principal.map(|p| p.role), view);

    match decision {
        RouteDecision::Render(_) => Ok(next.run(request).await),
        RouteDecision::Redirect(target) => {
            tracing::info!(
                requested = view.as_str(),
                redirect_to = target.as_str(),
                path = %request.uri().path(),
                "Access denied by navigation gate"
            );
            match principal {
                None => Err(AppError::NotAuthenticated),
                Some(_) => Err(AppError::Forbidden),
            }
        }
    }
}

/// Count and time every request by matched route
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<axum::extract::MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    MetricsRecorder::record_http_request(&method, &path, response.status().as_u16());
    MetricsRecorder::record_http_duration(&method, &path, start.elapsed().as_secs_f64());

    response
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AppError::NotAuthenticated)
    }
}
