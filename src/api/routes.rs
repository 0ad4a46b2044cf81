use crate::{
    api::{accounts, admin, auth, forms, health, navigation, reports},
    auth::AuthService,
    authz::{authenticate, require_view, track_metrics, View},
    config::{Config, SecurityConfig},
    db::{create_store, AccountDirectory, CredentialStore, DocumentStore, ReportLedger, SessionStore},
    errors::Result,
    observability::HealthChecker,
};
use axum::{
    extract::{FromRef, Request},
    http::HeaderValue,
    middleware::{self, Next},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: AccountDirectory,
    pub ledger: ReportLedger,
    pub auth: AuthService,
    pub health_checker: Arc<HealthChecker>,
}

impl AppState {
    /// Wire every service over one store
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let credentials = CredentialStore::new(store.clone());
        let sessions = SessionStore::new(store.clone());
        let ledger = ReportLedger::new(store.clone());
        let directory = AccountDirectory::new(
            store.clone(),
            credentials.clone(),
            ledger.clone(),
            sessions.clone(),
            &config.admin.username,
        );
        let auth = AuthService::new(&config, directory.clone(), credentials, sessions)?;
        let health_checker = Arc::new(HealthChecker::new(store, config.storage.backend));

        Ok(Self {
            config: Arc::new(config),
            directory,
            ledger,
            auth,
            health_checker,
        })
    }

    /// Connect the configured backend and seed the administrator credential
    pub async fn from_config(config: Config) -> Result<Self> {
        let store = create_store(&config.storage).await?;
        let state = Self::new(config, store)?;
        state.auth.ensure_admin_credential().await?;
        Ok(state)
    }
}

impl FromRef<AppState> for Arc<HealthChecker> {
    fn from_ref(state: &AppState) -> Self {
        state.health_checker.clone()
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Health endpoints
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/metrics", get(health::metrics))
        // API v1 routes
        .nest("/v1", v1_routes(state.clone()))
        .route_layer(middleware::from_fn(track_metrics))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Add state
        .with_state(state)
}

fn v1_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        .route("/auth/password", post(auth::change_password))
        .route("/navigation", get(navigation::navigate))
        .route("/forms/report", get(forms::report_form))
        .route("/forms/account", get(forms::account_form));

    let sign_up = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            require_view(View::SignUp, request, next)
        }));

    let officer = Router::new()
        .route("/reports", post(reports::submit))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            require_view(View::Submission, request, next)
        }));

    let admin = Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/reports", get(reports::list))
        .route("/admin/reports/export", get(reports::export))
        .route("/admin/reports/import", post(reports::import))
        .route("/admin/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/admin/accounts/:id",
            patch(accounts::update).delete(accounts::delete),
        )
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            require_view(View::AdminDashboard, request, next)
        }));

    public
        .merge(sign_up)
        .merge(officer)
        .merge(admin)
        .layer(middleware::from_fn_with_state(state, authenticate))
}

fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    let origins = &config.cors_allowed_origins;

    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
