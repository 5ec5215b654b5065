mod common;

use athenaeum::utils::email::MailKind;
use axum::http::{Method, StatusCode};
use common::{PASSWORD, registration, registration_json, send, setup_test_app};
use serde_json::json;

#[tokio::test]
async fn test_register_success() {
    let (app, mut inbox) = setup_test_app();
    let dto = registration();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(registration_json(&dto)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], dto.email);
    assert_eq!(body["user"]["studentId"], dto.student_id);
    assert_eq!(body["user"]["level"], "L200");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["isActive"], true);
    assert_eq!(body["user"]["isEmailVerified"], false);
    assert_eq!(body["user"]["preferences"]["emailNotifications"], true);
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["message"].as_str().unwrap().contains("verify"));

    let mail = inbox.next_of(MailKind::Verification).await.unwrap();
    assert_eq!(mail.to, dto.email);
}

#[tokio::test]
async fn test_register_normalizes_email() {
    let (app, _inbox) = setup_test_app();
    let mut dto = registration();
    let expected = dto.email.clone();
    dto.email = format!("  {}  ", dto.email.to_uppercase());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(registration_json(&dto)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], expected);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": format!(" {} ", expected), "password": dto.password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], expected);
}

#[tokio::test]
async fn test_register_duplicate_email_or_student_id() {
    let (app, _inbox) = setup_test_app();
    let first = registration();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(registration_json(&first)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut same_email = registration();
    same_email.email = first.email.clone();
    let mut same_student_id = registration();
    same_student_id.student_id = first.student_id.clone();

    for dto in [same_email, same_student_id] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(registration_json(&dto)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "duplicate_identity");
    }
    assert_eq!(app.store.user_count().await, 1);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let (app, _inbox) = setup_test_app();
    let mut body = registration_json(&registration());
    body["password"] = json!("short");
    body["level"] = json!("L500");

    let (status, response) =
        send(&app, Method::POST, "/api/auth/register", None, Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["error"], "validation_failed");
    let message = response["message"].as_str().unwrap();
    assert!(message.contains("Level must be one of"));
    assert!(message.contains("Password must be at least 6 characters"));
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_register_missing_field() {
    let (app, _inbox) = setup_test_app();
    let mut body = registration_json(&registration());
    body.as_object_mut().unwrap().remove("program");

    let (status, response) =
        send(&app, Method::POST, "/api/auth/register", None, Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "program is required");
}

#[tokio::test]
async fn test_login_success() {
    let (app, _inbox) = setup_test_app();
    let dto = registration();
    app.state.auth.register(dto.clone()).await.unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": dto.email.to_uppercase(), "password": PASSWORD})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], dto.email);
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _inbox) = setup_test_app();
    let active = registration();
    app.state.auth.register(active.clone()).await.unwrap();

    let inactive = registration();
    let response = app.state.auth.register(inactive.clone()).await.unwrap();
    let admin = app.state.auth.register(registration()).await.unwrap();
    common::promote_to_admin(&app, admin.user.id).await;
    let admin_user = app.state.auth.authenticate(&admin.token).await.unwrap();
    app.state
        .users
        .set_active(&admin_user, response.user.id, false)
        .await
        .unwrap();

    let attempts = [
        json!({"email": active.email, "password": "wrong123"}),
        json!({"email": "nobody@st.uew.edu.gh", "password": PASSWORD}),
        json!({"email": inactive.email, "password": PASSWORD}),
    ];

    let mut bodies = Vec::new();
    for attempt in attempts {
        let (status, body) =
            send(&app, Method::POST, "/api/auth/login", None, Some(attempt)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        bodies.push(body);
    }

    assert_eq!(bodies[0]["error"], "invalid_credentials");
    assert_eq!(bodies[0]["message"], "Invalid email or password");
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[1], bodies[2]);
}

#[tokio::test]
async fn test_verify_email_flow() {
    let (app, mut inbox) = setup_test_app();
    let (response, token) = common::register_user(&app, &mut inbox, registration()).await;

    let uri = format!("/api/auth/verify-email/{}", token);
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email verified successfully");
    assert_eq!(body["user"]["id"], response.user.id.to_string());
    assert_eq!(body["user"]["isEmailVerified"], true);

    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_or_expired_token");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/resend-verification",
        Some(&response.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "already_verified");
}

#[tokio::test]
async fn test_resend_verification_replaces_token() {
    let (app, mut inbox) = setup_test_app();
    let (response, first_token) = common::register_user(&app, &mut inbox, registration()).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/resend-verification",
        Some(&response.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Verification email sent");

    let second_token = inbox
        .next_of(MailKind::Verification)
        .await
        .unwrap()
        .token
        .unwrap();
    assert_ne!(first_token, second_token);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/auth/verify-email/{}", first_token),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/auth/verify-email/{}", second_token),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_same_response_for_unknown_email() {
    let (app, mut inbox) = setup_test_app();
    let dto = registration();
    common::register_user(&app, &mut inbox, dto.clone()).await;

    let (known_status, known) = send(
        &app,
        Method::POST,
        "/api/auth/forgot-password",
        None,
        Some(json!({"email": dto.email})),
    )
    .await;
    let (unknown_status, unknown) = send(
        &app,
        Method::POST,
        "/api/auth/forgot-password",
        None,
        Some(json!({"email": "ghost@st.uew.edu.gh"})),
    )
    .await;

    assert_eq!(known_status, StatusCode::OK);
    assert_eq!(unknown_status, StatusCode::OK);
    assert_eq!(known, unknown);
    assert_eq!(
        known["message"],
        "If that email exists, a password reset link has been sent"
    );

    let mail = inbox.next_of(MailKind::PasswordReset).await.unwrap();
    assert_eq!(mail.to, dto.email);
    assert!(inbox.try_next().is_none());
}

#[tokio::test]
async fn test_reset_password_flow() {
    let (app, mut inbox) = setup_test_app();
    let dto = registration();
    let (response, _) = common::register_user(&app, &mut inbox, dto.clone()).await;

    send(
        &app,
        Method::POST,
        "/api/auth/forgot-password",
        None,
        Some(json!({"email": dto.email})),
    )
    .await;
    let token = inbox
        .next_of(MailKind::PasswordReset)
        .await
        .unwrap()
        .token
        .unwrap();

    let uri = format!("/api/auth/reset-password/{}", token);
    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        None,
        Some(json!({"password": "brandnew42"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Password reset successfully. You can now login with your new password."
    );

    let confirmation = inbox
        .next_of(MailKind::PasswordResetConfirmation)
        .await
        .unwrap();
    assert_eq!(confirmation.to, dto.email);
    assert!(confirmation.token.is_none());

    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        None,
        Some(json!({"password": "another42"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": dto.email, "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": dto.email, "password": "brandnew42"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], response.user.id.to_string());

    let resets = app.store.resets_for(response.user.id).await;
    assert_eq!(resets.len(), 1);
    assert!(resets[0].used);
}

#[tokio::test]
async fn test_reset_password_rejects_weak_password() {
    let (app, _inbox) = setup_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/reset-password/whatever",
        None,
        Some(json!({"password": "nodigits"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");
}

#[tokio::test]
async fn test_reset_password_unknown_token() {
    let (app, _inbox) = setup_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/reset-password/not-a-real-token",
        None,
        Some(json!({"password": "brandnew42"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_or_expired_token");
}

#[tokio::test]
async fn test_get_me() {
    let (app, mut inbox) = setup_test_app();
    let (response, _) = common::register_user(&app, &mut inbox, registration()).await;

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&response.token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], response.user.id.to_string());
    assert_eq!(body["firstName"], response.user.first_name);
}

#[tokio::test]
async fn test_missing_and_invalid_tokens() {
    let (app, _inbox) = setup_test_app();

    let (status, body) = send(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "no_token");

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let (app, mut inbox) = setup_test_app();
    let (response, _) = common::register_user(&app, &mut inbox, registration()).await;

    app.clock.advance(chrono::Duration::days(31));

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&response.token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_update_profile_rotates_token() {
    let (app, mut inbox) = setup_test_app();
    let (response, _) = common::register_user(&app, &mut inbox, registration()).await;
    let new_email = format!("renamed.{}@st.uew.edu.gh", uuid::Uuid::new_v4().simple());

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/auth/profile",
        Some(&response.token),
        Some(json!({"firstName": "Kwame", "lastName": "", "email": new_email})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["firstName"], "Kwame");
    assert_eq!(body["user"]["lastName"], response.user.last_name);
    assert_eq!(body["user"]["email"], new_email);
    assert_eq!(body["user"]["isEmailVerified"], false);

    let token = body["token"].as_str().unwrap();
    assert_ne!(token, response.token);
    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], new_email);
}

#[tokio::test]
async fn test_update_profile_email_taken() {
    let (app, mut inbox) = setup_test_app();
    let other = registration();
    common::register_user(&app, &mut inbox, other.clone()).await;
    let (response, _) = common::register_user(&app, &mut inbox, registration()).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/auth/profile",
        Some(&response.token),
        Some(json!({"email": other.email})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "duplicate_identity");
}

#[tokio::test]
async fn test_update_profile_password() {
    let (app, mut inbox) = setup_test_app();
    let dto = registration();
    let (response, _) = common::register_user(&app, &mut inbox, dto.clone()).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/auth/profile",
        Some(&response.token),
        Some(json!({"password": "changed99"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": dto.email, "password": "changed99"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_preferences_partial() {
    let (app, mut inbox) = setup_test_app();
    let (response, _) = common::register_user(&app, &mut inbox, registration()).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/auth/preferences",
        Some(&response.token),
        Some(json!({"newResourceAlerts": false})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Preferences updated successfully");
    assert_eq!(
        body["preferences"],
        json!({"emailNotifications": true, "newResourceAlerts": false})
    );

    let (_, me) = send(&app, Method::GET, "/api/auth/me", Some(&response.token), None).await;
    assert_eq!(me["preferences"]["newResourceAlerts"], false);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _inbox) = setup_test_app();

    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Athenaeum API");
    assert!(body["paths"].get("/api/auth/register").is_some());
}
