use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use siopamb::api::{create_router, AppState};
use siopamb::config::Config;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let state = AppState::from_config(Config::default())
        .await
        .expect("Failed to create app state");
    create_router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn signup(app: &Router, name: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/v1/auth/signup",
        None,
        Some(json!({
            "displayName": name,
            "password": password,
            "rank": "Soldado PM",
            "unit": "1º pelotão",
        })),
    )
    .await
}

async fn login(app: &Router, name: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/auth/login",
        None,
        Some(json!({ "username": name, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

fn sample_report() -> Value {
    json!({
        "equipesIntegradas": "1º pel.",
        "numeroRso": "004512",
        "tipoEscala": "DEJEM",
        "tempoTrabalho": "8.5",
        "pelotao": "1º",
        "encarregadoEquipe": "Souza",
        "tva": 2,
        "boPamb": "1",
        "multaArbitrada": "350.75",
        "pessoasAbordadas": 4,
    })
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = spawn_app().await;

    let (status, body) = send(&app, Method::GET, "/health/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["storage"]["backend"], "memory");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_signup_login_and_navigation() {
    let app = spawn_app().await;

    let (status, body) = signup(&app, "joao", "1234").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["displayName"], "Joao");
    assert_eq!(body["account"]["rank"], "Soldado PM");
    assert_eq!(body["account"]["unit"], "1º pelotão");

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/auth/login",
        None,
        Some(json!({ "username": "Joao", "password": "1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["principal"]["role"], "regular");
    assert_eq!(body["landing"]["path"], "/dashboard");
    let token = body["access_token"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::GET,
        "/v1/navigation?view=submission",
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decision"], "render");
    assert_eq!(body["view"], "submission");

    let (_, body) = send(&app, Method::GET, "/v1/navigation?path=/admin", Some(token), None).await;
    assert_eq!(body["decision"], "redirect");
    assert_eq!(body["path"], "/dashboard");

    let (_, body) = send(&app, Method::GET, "/v1/navigation?path=/dashboard", None, None).await;
    assert_eq!(body["decision"], "redirect");
    assert_eq!(body["path"], "/");

    let (status, _) = send(&app, Method::GET, "/v1/navigation?path=/nowhere", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_and_reserved_names() {
    let app = spawn_app().await;

    let (status, _) = signup(&app, "joao", "1234").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = signup(&app, "JOAO", "5678").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_name");
    assert_eq!(body["message"], "Este nome de guerra já está em uso.");

    let (status, _) = signup(&app, "Adm", "5678").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = signup(&app, "maria", "12").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "password_too_short");
}

#[tokio::test]
async fn test_gates_reject_by_role() {
    let app = spawn_app().await;
    signup(&app, "joao", "1234").await;
    let officer = login(&app, "joao", "1234").await;
    let admin = login(&app, "adm", "adm").await;

    let (status, _) = send(&app, Method::POST, "/v1/reports", None, Some(sample_report())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/v1/admin/accounts", Some(&officer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::POST, "/v1/reports", Some(&admin), Some(sample_report())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/v1/admin/accounts", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let accounts = body.as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["displayName"], "Joao");

    // Signed-in callers do not sign up again
    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/auth/signup",
        Some(&officer),
        Some(json!({"displayName": "maria", "password": "1234", "rank": "Cabo PM", "unit": "2ª Cia"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_submit_report_ends_session() {
    let app = spawn_app().await;
    let (_, created) = signup(&app, "joao", "1234").await;
    let token = login(&app, "joao", "1234").await;

    let (status, body) = send(&app, Method::POST, "/v1/reports", Some(&token), Some(sample_report())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["report"]["userId"], created["account"]["id"]);
    assert_eq!(body["report"]["submittedBy"], "Joao");
    assert_eq!(body["report"]["tva"], 2);
    assert_eq!(body["landing"]["path"], "/");

    let (_, session) = send(&app, Method::GET, "/v1/auth/session", Some(&token), None).await;
    assert_eq!(session["authenticated"], false);

    let (status, _) = send(&app, Method::POST, "/v1/reports", Some(&token), Some(sample_report())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let admin = login(&app, "adm", "adm").await;
    let (_, reports) = send(&app, Method::GET, "/v1/admin/reports", Some(&admin), None).await;
    assert_eq!(reports.as_array().unwrap().len(), 1);

    let (_, dashboard) = send(&app, Method::GET, "/v1/admin/dashboard", Some(&admin), None).await;
    assert_eq!(dashboard["totalReports"], 1);
    assert_eq!(dashboard["byUnit"][0], json!({"name": "1º pel.", "value": 1}));
    assert_eq!(dashboard["byScaleType"][1], json!({"name": "DEJEM", "value": 1}));
    assert_eq!(dashboard["recent"][0]["numeroRso"], "004512");
}

#[tokio::test]
async fn test_invalid_report_lists_fields() {
    let app = spawn_app().await;
    signup(&app, "joao", "1234").await;
    let token = login(&app, "joao", "1234").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/reports",
        Some(&token),
        Some(json!({"tva": 11, "numeroRso": "12a", "encarregadoEquipe": "Souza 2"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_failed");
    let fields: Vec<_> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap().to_string())
        .collect();
    assert!(fields.contains(&"tva".to_string()));
    assert!(fields.contains(&"numeroRso".to_string()));
    assert!(fields.contains(&"encarregadoEquipe".to_string()));

    // A rejected submission keeps the session
    let (_, session) = send(&app, Method::GET, "/v1/auth/session", Some(&token), None).await;
    assert_eq!(session["authenticated"], true);
}

#[tokio::test]
async fn test_logout_returns_to_anonymous() {
    let app = spawn_app().await;
    signup(&app, "joao", "1234").await;
    let token = login(&app, "joao", "1234").await;

    let (status, _) = send(&app, Method::POST, "/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, session) = send(&app, Method::GET, "/v1/auth/session", Some(&token), None).await;
    assert_eq!(session["authenticated"], false);
    assert_eq!(session["landing"]["path"], "/");

    let (_, body) = send(&app, Method::GET, "/v1/navigation?view=submission", Some(&token), None).await;
    assert_eq!(body["decision"], "redirect");
    assert_eq!(body["view"], "login");

    // Idempotent, with or without a token
    let (status, _) = send(&app, Method::POST, "/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::POST, "/v1/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_change_password() {
    let app = spawn_app().await;
    signup(&app, "joao", "1234").await;
    let token = login(&app, "joao", "1234").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/auth/password",
        Some(&token),
        Some(json!({"newPassword": "abcd", "confirmPassword": "abce"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "password_mismatch");

    let (_, body) = send(
        &app,
        Method::POST,
        "/v1/auth/password",
        Some(&token),
        Some(json!({"newPassword": "abc", "confirmPassword": "abc"})),
    )
    .await;
    assert_eq!(body["error"], "password_too_short");

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/auth/password",
        None,
        Some(json!({"newPassword": "abcd", "confirmPassword": "abcd"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/auth/password",
        Some(&token),
        Some(json!({"newPassword": "nova", "confirmPassword": "nova"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, session) = send(&app, Method::GET, "/v1/auth/session", Some(&token), None).await;
    assert_eq!(session["authenticated"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/auth/login",
        None,
        Some(json!({"username": "joao", "password": "1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");

    login(&app, "joao", "nova").await;
}

#[tokio::test]
async fn test_admin_account_lifecycle() {
    let app = spawn_app().await;
    let admin = login(&app, "adm", "adm").await;

    let (status, account) = send(
        &app,
        Method::POST,
        "/v1/admin/accounts",
        Some(&admin),
        Some(json!({"displayName": "joao", "password": "1234", "rank": "Soldado PM", "unit": "1º pelotão"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = account["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/v1/admin/accounts/{}", id),
        Some(&admin),
        Some(json!({"rank": "Cabo PM", "password": "5678"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["rank"], "Cabo PM");
    assert_eq!(updated["unit"], "1º pelotão");
    assert_eq!(updated["displayName"], "Joao");

    let officer = login(&app, "joao", "5678").await;
    let (status, _) = send(&app, Method::POST, "/v1/reports", Some(&officer), Some(sample_report())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, summary) = send(
        &app,
        Method::DELETE,
        &format!("/v1/admin/accounts/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["reports_removed"], 1);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/auth/login",
        None,
        Some(json!({"username": "joao", "password": "5678"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");

    let (_, reports) = send(&app, Method::GET, "/v1/admin/reports", Some(&admin), None).await;
    assert!(reports.as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/v1/admin/accounts/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn export_then_import(uri: &str, content_type: &str, file_name: &str) {
    let app = spawn_app().await;
    signup(&app, "joao", "1234").await;
    let officer = login(&app, "joao", "1234").await;
    send(&app, Method::POST, "/v1/reports", Some(&officer), Some(sample_report())).await;

    let admin = login(&app, "adm", "adm").await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", admin))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with(content_type));
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains(file_name));
    let sheet = response.into_body().collect().await.unwrap().to_bytes();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/v1/admin/reports/import")
                .header(header::AUTHORIZATION, format!("Bearer {}", admin))
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(sheet))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let summary: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(summary["imported"], 1);
    assert!(summary["rejected"].as_array().unwrap().is_empty());

    let (_, reports) = send(&app, Method::GET, "/v1/admin/reports", Some(&admin), None).await;
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_ne!(reports[0]["id"], reports[1]["id"]);

    let strip_id = |report: &Value| {
        let mut report = report.clone();
        report.as_object_mut().unwrap().remove("id");
        report
    };
    assert_eq!(strip_id(&reports[0]), strip_id(&reports[1]));
}

#[tokio::test]
async fn test_workbook_export_import_round_trip() {
    export_then_import(
        "/v1/admin/reports/export",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "relatorio_atividades.xlsx",
    )
    .await;
}

#[tokio::test]
async fn test_csv_export_import_round_trip() {
    export_then_import(
        "/v1/admin/reports/export?format=csv",
        "text/csv",
        "relatorio_atividades.csv",
    )
    .await;
}

#[tokio::test]
async fn test_import_reports_rejected_rows() {
    let app = spawn_app().await;
    let admin = login(&app, "adm", "adm").await;

    let csv = "accountId,submittedBy,tva,tipoEscala\nu1,Joao,3,DEJEM\nu2,Maria,30,Extra\n";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/v1/admin/reports/import")
                .header(header::AUTHORIZATION, format!("Bearer {}", admin))
                .body(Body::from(csv))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let summary: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(summary["imported"], 1);
    assert_eq!(summary["rejected"][0]["line"], 3);
    assert_eq!(summary["rejected"][0]["errors"].as_array().unwrap().len(), 2);

    let (_, reports) = send(&app, Method::GET, "/v1/admin/reports", Some(&admin), None).await;
    assert_eq!(reports[0]["userId"], "u1");
    assert_eq!(reports[0]["tva"], 3);
}

#[tokio::test]
async fn test_forms_describe_fields() {
    let app = spawn_app().await;

    let (status, body) = send(&app, Method::GET, "/v1/forms/report", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let fields = body["fields"].as_array().unwrap();
    assert_eq!(fields[0]["name"], "equipesIntegradas");
    assert_eq!(fields.last().unwrap()["name"], "horasPoliciamentoNautico");

    let (_, body) = send(&app, Method::GET, "/v1/forms/account", None, None).await;
    assert_eq!(body["ranks"].as_array().unwrap().len(), 8);
    assert_eq!(body["units"][3], "2ª Cia");
    assert_eq!(body["passwordMinLength"], 4);
}
