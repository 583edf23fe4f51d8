mod common;

use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use common::{StubRepository, test_state, user};
use course_portal::{
    AppState,
    auth::{AuthUser, Claims, MaybeAuthUser, SESSION_AUDIENCE, UserMetadata},
    config::Env,
    email::MockEmailService,
    models::Role,
    storage::MockStorageService,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn claims(user_id: Uuid, role: Option<&str>) -> Claims {
    let now = now();
    Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + 3600) as usize,
        aud: SESSION_AUDIENCE.to_string(),
        email: Some("session@example.com".to_string()),
        user_metadata: UserMetadata {
            role: role.map(str::to_string),
        },
    }
}

fn sign(claims: &Claims, secret: &str) -> String {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &key).unwrap()
}

fn create_app_state(env: Env, repo: StubRepository) -> AppState {
    let mut state = test_state(
        Arc::new(repo),
        MockStorageService::new(),
        Arc::new(MockEmailService::new()),
    );
    state.config.env = env;
    state.config.jwt_secret = TEST_JWT_SECRET.to_string();
    state
}

fn repo_with(role: Option<&str>) -> StubRepository {
    StubRepository {
        users: vec![user(TEST_USER_ID, "db@example.com", role)],
        ..Default::default()
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn bearer_parts(token: &str) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    parts
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let token = sign(&claims(TEST_USER_ID, Some("learner")), TEST_JWT_SECRET);
    let app_state = create_app_state(Env::Production, repo_with(None));

    let mut parts = bearer_parts(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let user = auth_user.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.email, "session@example.com");
    assert_eq!(user.role, Some(Role::Learner));
}

#[tokio::test]
async fn test_metadata_role_wins_over_users_table() {
    let token = sign(&claims(TEST_USER_ID, Some("super_admin")), TEST_JWT_SECRET);
    let app_state = create_app_state(Env::Production, repo_with(Some("learner")));

    let mut parts = bearer_parts(&token);
    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(user.role, Some(Role::SuperAdmin));
}

#[tokio::test]
async fn test_role_falls_back_to_users_table() {
    let token = sign(&claims(TEST_USER_ID, None), TEST_JWT_SECRET);
    let app_state = create_app_state(Env::Production, repo_with(Some("instructor")));

    let mut parts = bearer_parts(&token);
    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(user.role, Some(Role::Instructor));
}

#[tokio::test]
async fn test_unknown_role_resolves_to_none() {
    let token = sign(&claims(TEST_USER_ID, Some("janitor")), TEST_JWT_SECRET);
    let app_state = create_app_state(Env::Production, repo_with(None));

    let mut parts = bearer_parts(&token);
    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(user.role, None);
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(Env::Production, repo_with(Some("learner")));

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_wrong_secret() {
    let token = sign(&claims(TEST_USER_ID, Some("learner")), "some-other-secret");
    let app_state = create_app_state(Env::Production, repo_with(Some("learner")));

    let mut parts = bearer_parts(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_wrong_audience() {
    let mut foreign = claims(TEST_USER_ID, Some("learner"));
    foreign.aud = "anon".to_string();
    let token = sign(&foreign, TEST_JWT_SECRET);
    let app_state = create_app_state(Env::Production, repo_with(Some("learner")));

    let mut parts = bearer_parts(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let mut expired = claims(TEST_USER_ID, Some("learner"));
    // Well past the validator's default leeway.
    expired.iat = (now() - 7200) as usize;
    expired.exp = (now() - 3600) as usize;
    let token = sign(&expired, TEST_JWT_SECRET);
    let app_state = create_app_state(Env::Production, repo_with(Some("learner")));

    let mut parts = bearer_parts(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_when_user_row_is_gone() {
    let token = sign(&claims(TEST_USER_ID, Some("learner")), TEST_JWT_SECRET);
    let app_state = create_app_state(Env::Production, StubRepository::default());

    let mut parts = bearer_parts(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_bypass_success() {
    let app_state = create_app_state(Env::Local, repo_with(Some("super_admin")));

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&TEST_USER_ID.to_string()).unwrap(),
    );

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.email, "db@example.com");
    assert_eq!(user.role, Some(Role::SuperAdmin));
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let app_state = create_app_state(Env::Production, repo_with(Some("super_admin")));

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Provide ONLY the local bypass header
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&TEST_USER_ID.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_maybe_auth_user_never_rejects() {
    let app_state = create_app_state(Env::Production, repo_with(Some("learner")));

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    let MaybeAuthUser(anonymous) = MaybeAuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert!(anonymous.is_none());

    let token = sign(&claims(TEST_USER_ID, Some("learner")), TEST_JWT_SECRET);
    let mut parts = bearer_parts(&token);
    let MaybeAuthUser(identity) = MaybeAuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(identity.map(|u| u.id), Some(TEST_USER_ID));
}
