#![allow(dead_code)]

use std::sync::Arc;

use athenaeum::router::init_router;
use athenaeum::state::{AppConfig, AppState, Collaborators};
use athenaeum::utils::email::{MailInbox, MailKind, Mailer, RecordingMailer};
use athenaeum_config::jwt::DEFAULT_SESSION_EXPIRY_SECS;
use athenaeum_config::{AuthConfig, CorsConfig, JwtConfig, RateLimitConfig};
use athenaeum_core::ManualClock;
use athenaeum_db::{MemoryStore, UserStore};
use athenaeum_models::{AuthResponse, RegisterRequest, Role};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret-for-integration-tests";
pub const PASSWORD: &str = "secret123";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub store: MemoryStore,
    pub clock: Arc<ManualClock>,
}

pub fn test_config(auth: AuthConfig) -> AppConfig {
    AppConfig {
        jwt: JwtConfig::new(JWT_SECRET.to_string(), DEFAULT_SESSION_EXPIRY_SECS).unwrap(),
        auth,
        cors: CorsConfig::parse("http://localhost:5173"),
        rate_limit: RateLimitConfig::disabled(),
    }
}

/// Cheap hashing, default TTLs.
pub fn fast_auth_config() -> AuthConfig {
    AuthConfig {
        bcrypt_cost: 4,
        ..AuthConfig::default()
    }
}

pub fn setup_test_app() -> (TestApp, MailInbox) {
    let (mailer, inbox) = RecordingMailer::channel();
    (setup_test_app_with(Arc::new(mailer), fast_auth_config()), inbox)
}

pub fn setup_test_app_with(mailer: Arc<dyn Mailer>, auth: AuthConfig) -> TestApp {
    build_app(mailer, test_config(auth))
}

pub fn setup_test_app_with_rate_limit(rate_limit: RateLimitConfig) -> TestApp {
    let (mailer, _inbox) = RecordingMailer::channel();
    build_app(
        Arc::new(mailer),
        AppConfig {
            rate_limit,
            ..test_config(fast_auth_config())
        },
    )
}

pub fn build_app(mailer: Arc<dyn Mailer>, config: AppConfig) -> TestApp {
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let state = AppState::new(
        config,
        Collaborators {
            users: Arc::new(store.clone()),
            resets: Arc::new(store.clone()),
            mailer,
            clock: clock.clone(),
        },
    )
    .unwrap();

    TestApp {
        router: init_router(state.clone()),
        state,
        store,
        clock,
    }
}

/// A valid registration with fake names and a unique email and student id.
pub fn registration() -> RegisterRequest {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    let id = Uuid::new_v4();

    RegisterRequest {
        student_id: format!("{:010}", id.as_u128() % 10_000_000_000),
        email: format!("student.{}@st.uew.edu.gh", id.simple()),
        password: PASSWORD.to_string(),
        first_name,
        last_name,
        level: "L200".to_string(),
        program: "BSc Computer Science".to_string(),
    }
}

pub fn registration_json(dto: &RegisterRequest) -> Value {
    json!({
        "studentId": dto.student_id,
        "email": dto.email,
        "password": dto.password,
        "firstName": dto.first_name,
        "lastName": dto.last_name,
        "level": dto.level,
        "program": dto.program,
    })
}

/// Registers through the service and returns the session plus the emailed
/// verification token.
pub async fn register_user(
    app: &TestApp,
    inbox: &mut MailInbox,
    dto: RegisterRequest,
) -> (AuthResponse, String) {
    let response = app.state.auth.register(dto).await.unwrap();
    let mail = inbox.next_of(MailKind::Verification).await.unwrap();
    (response, mail.token.unwrap())
}

pub async fn register_with_level(
    app: &TestApp,
    inbox: &mut MailInbox,
    level: &str,
) -> AuthResponse {
    let mut dto = registration();
    dto.level = level.to_string();
    register_user(app, inbox, dto).await.0
}

pub async fn promote_to_admin(app: &TestApp, user_id: Uuid) {
    let store: &dyn UserStore = &app.store;
    store
        .set_role(user_id, Role::Admin, Utc::now())
        .await
        .unwrap()
        .unwrap();
}

/// Sends a request through the router and decodes the JSON body.
pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
