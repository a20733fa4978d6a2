//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod auth;
mod department;
mod employee;
mod leave;
mod payslip;

use crate::auth::require_auth;
use crate::config::CorsConfig;
use crate::error::AppError;
use crate::state::SharedState;
use axum::{
    extract::FromRequest,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;
use uuid::Uuid;

/// JSON body extractor whose rejections use the API error shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, cors: &CorsConfig) -> Router {
    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware_stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(cors))
        .propagate_x_request_id();

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    // Everything below requires a verified bearer token
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/verify", get(auth::verify))
        // Employee self-service
        .route("/employee", get(employee::list_employees))
        .route("/employee/{id}", put(employee::assign))
        .route(
            "/employee/profile",
            get(employee::get_profile).put(employee::update_profile),
        )
        .route("/employee/attendance", get(employee::attendance_history))
        .route("/employee/attendance/today", get(employee::attendance_today))
        .route("/employee/attendance/mark", post(employee::mark_attendance))
        .route("/employee/leaves", get(leave::list_own).post(leave::apply))
        .route("/employee/payslips", get(payslip::list_own))
        // Departments
        .route("/department", get(department::list).post(department::create))
        .route(
            "/department/{id}",
            get(department::get)
                .put(department::update)
                .delete(department::delete),
        )
        // Admin review
        .route("/leaves/{id}/status", put(leave::review))
        .route("/payslips", post(payslip::create))
        .route("/payslips/{id}/paid", put(payslip::mark_paid))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", public.merge(protected))
        .fallback(route_not_found)
        .layer(middleware_stack)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("x-auth-token"),
        ])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn route_not_found() -> impl IntoResponse {
    AppError::NotFound("Route not found".to_string())
}

/// Parse a path id, reporting malformed ids as validation errors
fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid {} ID format", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::config::AuthConfig;
    use crate::db::MemoryStore;
    use crate::state::AppState;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::{Duration as ChronoDuration, Utc};
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        state: SharedState,
    }

    impl TestApp {
        fn new() -> Self {
            let state = Arc::new(AppState::new(
                Arc::new(MemoryStore::new()),
                &AuthConfig::default(),
                std::time::Duration::from_secs(5),
            ));
            Self {
                router: create_router(state.clone(), &CorsConfig::default()),
                state,
            }
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header("authorization", format!("Bearer {}", token));
            }
            let request = match body {
                Some(body) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, value)
        }

        async fn register(&self, email: &str, password: &str) -> Value {
            let (status, body) = self
                .send(
                    "POST",
                    "/api/auth/register",
                    None,
                    Some(json!({
                        "email": email,
                        "password": password,
                        "firstName": "Test",
                        "lastName": "User"
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
            body
        }

        /// Register an employee and return their token
        async fn employee_token(&self, email: &str) -> String {
            let body = self.register(email, "secret123").await;
            body["token"].as_str().unwrap().to_string()
        }

        /// Seed an admin directly and return a token for it
        async fn admin_token(&self) -> String {
            let seed = crate::config::SeedAdmin {
                email: "admin@ems.com".to_string(),
                password: "admin123".to_string(),
            };
            crate::accounts::seed_admin(&self.state, &seed).await.unwrap();
            let (status, body) = self
                .send(
                    "POST",
                    "/api/auth/login",
                    None,
                    Some(json!({"email": "admin@ems.com", "password": "admin123"})),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            body["token"].as_str().unwrap().to_string()
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = TestApp::new();
        let (status, body) = app.send("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_register_login_me_then_expired() {
        let app = TestApp::new();

        let registered = app.register("a@x.com", "secret123").await;
        assert_eq!(registered["account"]["email"], "a@x.com");
        assert_eq!(registered["account"]["role"], "employee");
        assert!(registered["account"].get("passwordHash").is_none());

        let (status, login) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": "a@x.com", "password": "secret123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = login["token"].as_str().unwrap();

        let (status, me) = app.send("GET", "/api/auth/me", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["account"]["email"], "a@x.com");
        assert_eq!(me["account"]["id"], registered["account"]["id"]);

        // Same account, token minted long enough ago to be past its TTL
        let account_id = registered["account"]["id"].as_str().unwrap().parse().unwrap();
        let expired = app
            .state
            .tokens
            .issue_at(account_id, Role::Employee, Utc::now() - ChronoDuration::days(2))
            .unwrap();

        let (status, body) = app.send("GET", "/api/auth/me", Some(&expired.token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_verify_echoes_identity() {
        let app = TestApp::new();
        let registered = app.register("v@x.com", "secret123").await;
        let token = registered["token"].as_str().unwrap();

        let (status, body) = app.send("GET", "/api/auth/verify", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["identity"]["accountId"], registered["account"]["id"]);
        assert_eq!(body["identity"]["role"], "employee");
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let app = TestApp::new();
        app.register("dup@x.com", "secret123").await;

        let (status, body) = app
            .send(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "DUP@x.com",
                    "password": "another123",
                    "firstName": "Second",
                    "lastName": "User"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "DUPLICATE");

        let accounts = app.state.accounts.list_accounts().await.unwrap();
        assert_eq!(accounts.len(), 1);
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let app = TestApp::new();
        let (status, body) = app
            .send(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({"email": "a@x.com", "password": "secret123"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let app = TestApp::new();
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from("{\"email\": "))
            .unwrap();

        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_failures_share_status_and_message() {
        let app = TestApp::new();
        app.register("a@x.com", "secret123").await;

        let (wrong_status, wrong) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": "a@x.com", "password": "wrong-pass"})),
            )
            .await;
        let (unknown_status, unknown) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": "ghost@x.com", "password": "secret123"})),
            )
            .await;

        assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
        assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
        assert_eq!(wrong, unknown);
    }

    #[tokio::test]
    async fn test_missing_and_malformed_tokens() {
        let app = TestApp::new();
        let token = app.employee_token("t@x.com").await;

        let (status, body) = app.send("GET", "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");

        let truncated = &token[..token.len() - 10];
        let (status, body) = app.send("GET", "/api/auth/me", Some(truncated), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN");

        let (status, _) = app.send("GET", "/api/auth/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_employee_on_admin_route_is_forbidden() {
        let app = TestApp::new();
        let token = app.employee_token("e@x.com").await;

        let (status, body) = app.send("GET", "/api/employee", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");

        let (status, _) = app
            .send("POST", "/api/department", Some(&token), Some(json!({"name": "IT"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_self_registration_cannot_claim_admin() {
        let app = TestApp::new();
        let body = json!({
            "email": "sneaky@x.com",
            "password": "secret123",
            "firstName": "Sneaky",
            "lastName": "User",
            "role": "admin"
        });

        let (status, _) = app.send("POST", "/api/auth/register", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let employee = app.employee_token("e@x.com").await;
        let (status, _) = app
            .send("POST", "/api/auth/register", Some(&employee), Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = app.admin_token().await;
        let (status, created) = app
            .send("POST", "/api/auth/register", Some(&admin), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["account"]["role"], "admin");
    }

    #[tokio::test]
    async fn test_admin_lists_employees() {
        let app = TestApp::new();
        app.employee_token("one@x.com").await;
        app.employee_token("two@x.com").await;
        let admin = app.admin_token().await;

        let (status, body) = app.send("GET", "/api/employee", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["employees"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_profile_update() {
        let app = TestApp::new();
        let token = app.employee_token("p@x.com").await;

        let (status, body) = app
            .send(
                "PUT",
                "/api/employee/profile",
                Some(&token),
                Some(json!({"firstName": "Grace", "phone": "+1 555 0100"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["account"]["firstName"], "Grace");
        assert_eq!(body["account"]["lastName"], "User");
        assert_eq!(body["account"]["displayName"], "Grace User");

        let (status, _) = app
            .send(
                "PUT",
                "/api/employee/profile",
                Some(&token),
                Some(json!({"phone": "not a phone"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_attendance_flow() {
        let app = TestApp::new();
        let token = app.employee_token("att@x.com").await;

        let (status, body) = app
            .send("GET", "/api/employee/attendance/today", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], Value::Null);

        let (status, _) = app
            .send("POST", "/api/employee/attendance/mark", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .send("POST", "/api/employee/attendance/mark", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Attendance already marked for today");

        let (_, body) = app
            .send("GET", "/api/employee/attendance/today", Some(&token), None)
            .await;
        assert_eq!(body["status"], "present");

        let (_, body) = app
            .send("GET", "/api/employee/attendance", Some(&token), None)
            .await;
        assert_eq!(body["attendance"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_leave_flow() {
        let app = TestApp::new();
        let token = app.employee_token("leave@x.com").await;
        let admin = app.admin_token().await;
        let start = Utc::now().date_naive() + ChronoDuration::days(3);
        let end = start + ChronoDuration::days(2);

        let (status, created) = app
            .send(
                "POST",
                "/api/employee/leaves",
                Some(&token),
                Some(json!({"startDate": start, "endDate": end, "type": "annual", "reason": "Trip"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["leave"]["status"], "pending");

        let (status, body) = app
            .send(
                "POST",
                "/api/employee/leaves",
                Some(&token),
                Some(json!({"startDate": end, "endDate": end, "type": "sick"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "You have an overlapping leave request");

        let past = Utc::now().date_naive() - ChronoDuration::days(1);
        let (status, _) = app
            .send(
                "POST",
                "/api/employee/leaves",
                Some(&token),
                Some(json!({"startDate": past, "endDate": start, "type": "casual"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let leave_id = created["leave"]["id"].as_str().unwrap();
        let uri = format!("/api/leaves/{}/status", leave_id);

        let (status, _) = app
            .send("PUT", &uri, Some(&token), Some(json!({"status": "approved"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .send("PUT", &uri, Some(&admin), Some(json!({"status": "approved"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["leave"]["status"], "approved");

        let (_, body) = app.send("GET", "/api/employee/leaves", Some(&token), None).await;
        assert_eq!(body["leaves"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_department_crud() {
        let app = TestApp::new();
        let admin = app.admin_token().await;
        let employee = app.employee_token("d@x.com").await;

        let (status, created) = app
            .send(
                "POST",
                "/api/department",
                Some(&admin),
                Some(json!({"name": "IT", "description": "Information Technology"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["department"]["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .send("POST", "/api/department", Some(&admin), Some(json!({"name": "IT"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send("POST", "/api/department", Some(&admin), Some(json!({"description": "x"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, list) = app.send("GET", "/api/department", Some(&employee), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["departments"].as_array().unwrap().len(), 1);

        let uri = format!("/api/department/{}", id);
        let (status, updated) = app
            .send("PUT", &uri, Some(&admin), Some(json!({"name": "Engineering"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["department"]["name"], "Engineering");

        let (status, _) = app.send("DELETE", &uri, Some(&employee), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.send("DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.send("GET", &uri, Some(&employee), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_payslip_flow() {
        let app = TestApp::new();
        let admin = app.admin_token().await;
        let registered = app.register("pay@x.com", "secret123").await;
        let token = registered["token"].as_str().unwrap();
        let employee_id = registered["account"]["id"].clone();

        let payslip = json!({
            "employeeId": employee_id,
            "date": "2026-01-31",
            "basicSalary": 3000.0,
            "allowances": 250.0,
            "deductions": {"tax": 400.0, "insurance": 50.0}
        });

        let (status, _) = app
            .send("POST", "/api/payslips", Some(token), Some(payslip.clone()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, created) = app
            .send("POST", "/api/payslips", Some(&admin), Some(payslip.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["payslip"]["netSalary"], 2800.0);

        let (status, _) = app
            .send("POST", "/api/payslips", Some(&admin), Some(payslip))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/api/payslips/{}/paid", created["payslip"]["id"].as_str().unwrap());
        let (status, paid) = app.send("PUT", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["payslip"]["status"], "paid");

        let (_, own) = app.send("GET", "/api/employee/payslips", Some(token), None).await;
        assert_eq!(own["payslips"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payslip_for_unknown_employee() {
        let app = TestApp::new();
        let admin = app.admin_token().await;

        let (status, _) = app
            .send(
                "POST",
                "/api/payslips",
                Some(&admin),
                Some(json!({
                    "employeeId": uuid::Uuid::new_v4(),
                    "date": "2026-01-31",
                    "basicSalary": 1000.0
                })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_path_id() {
        let app = TestApp::new();
        let token = app.employee_token("id@x.com").await;

        let (status, body) = app
            .send("GET", "/api/department/not-a-uuid", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid department ID format");
    }

    #[tokio::test]
    async fn test_oversized_email_is_rejected() {
        let app = TestApp::new();
        let email = format!(
            "{}@{}.{}.{}.{}.com",
            "a".repeat(64),
            "b".repeat(63),
            "c".repeat(63),
            "d".repeat(63),
            "e".repeat(46)
        );

        let (status, body) = app
            .send(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "secret123",
                    "firstName": "Long",
                    "lastName": "Email"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(app.state.accounts.list_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_and_login_accept_padded_email() {
        let app = TestApp::new();
        let registered = app.register("  Padded@X.com ", "secret123").await;
        assert_eq!(registered["account"]["email"], "padded@x.com");

        let (status, _) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": " padded@x.com", "password": "secret123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_assigns_department_and_position() {
        let app = TestApp::new();
        let admin = app.admin_token().await;
        let registered = app.register("placed@x.com", "secret123").await;
        let token = registered["token"].as_str().unwrap();
        let uri = format!("/api/employee/{}", registered["account"]["id"].as_str().unwrap());

        let (_, created) = app
            .send("POST", "/api/department", Some(&admin), Some(json!({"name": "IT"})))
            .await;
        let department_id = created["department"]["id"].clone();

        let (status, _) = app
            .send("PUT", &uri, Some(token), Some(json!({"departmentId": department_id})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .send(
                "PUT",
                &uri,
                Some(&admin),
                Some(json!({"departmentId": uuid::Uuid::new_v4()})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app
            .send(
                "PUT",
                &uri,
                Some(&admin),
                Some(json!({"departmentId": department_id, "position": "Engineer"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["account"]["departmentName"], "IT");
        assert_eq!(body["account"]["position"], "Engineer");

        let (_, profile) = app.send("GET", "/api/employee/profile", Some(token), None).await;
        assert_eq!(profile["account"]["departmentId"], department_id);
        assert_eq!(profile["account"]["departmentName"], "IT");

        let (_, list) = app.send("GET", "/api/employee", Some(&admin), None).await;
        let placed = list["employees"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["email"] == "placed@x.com")
            .unwrap();
        assert_eq!(placed["departmentName"], "IT");

        // Deleting the department detaches the employee
        let (status, _) = app
            .send(
                "DELETE",
                &format!("/api/department/{}", department_id.as_str().unwrap()),
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, profile) = app.send("GET", "/api/employee/profile", Some(token), None).await;
        assert_eq!(profile["account"]["departmentId"], Value::Null);
        assert_eq!(profile["account"]["departmentName"], Value::Null);
        assert_eq!(profile["account"]["position"], "Engineer");
    }

    #[tokio::test]
    async fn test_assign_unknown_employee() {
        let app = TestApp::new();
        let admin = app.admin_token().await;
        let uri = format!("/api/employee/{}", uuid::Uuid::new_v4());

        let (status, body) = app
            .send("PUT", &uri, Some(&admin), Some(json!({"position": "Engineer"})))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Employee not found");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = TestApp::new();
        let (status, body) = app.send("GET", "/api/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found");
    }
}
