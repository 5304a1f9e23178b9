//! End-to-end session flows against a mock library server.

use std::sync::Arc;
use std::time::Duration;

use libdesk_client::{CredentialStore, MemoryCredentialStore, SessionClient};
use libdesk_core::{RegisterRequest, Role, StoredCredentials};
use libdesk_session::{GuardDecision, LOGIN_PATH, Navigator, SessionContext, UNAUTHORIZED_PATH};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(username: &str, role: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "username": username,
        "email": format!("{username}@library.com"),
        "firstName": "Test",
        "lastName": "User",
        "role": role,
        "enabled": true
    })
}

fn tokens(access: &str, refresh: &str, username: &str, role: &str) -> serde_json::Value {
    json!({
        "accessToken": access,
        "refreshToken": refresh,
        "tokenType": "Bearer",
        "username": username,
        "role": role
    })
}

fn stored(access: &str, refresh: &str) -> StoredCredentials {
    StoredCredentials {
        access_token: access.into(),
        refresh_token: refresh.into(),
        role: "USER".into(),
        username: "reader".into(),
    }
}

fn context(server: &MockServer, store: Arc<MemoryCredentialStore>) -> Arc<SessionContext> {
    let client = SessionClient::with_base_url(&format!("{}/api", server.uri()), store).unwrap();
    Arc::new(SessionContext::new(Arc::new(client)))
}

async fn mount_login(server: &MockServer, username: &str, password: &str, role: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"usernameOrEmail": username, "password": password})))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens("a1", "r1", username, role)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(username, role)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_admin_login_unlocks_staff_pages() {
    let server = MockServer::start().await;
    mount_login(&server, "admin", "admin123", "ADMIN").await;

    let store = Arc::new(MemoryCredentialStore::new());
    let ctx = context(&server, store.clone());
    ctx.bootstrap().await;
    let mut nav = Navigator::new(ctx.clone());

    assert_eq!(
        nav.navigate("/members"),
        GuardDecision::RedirectLogin {
            from: "/members".into()
        }
    );

    let profile = ctx.login("admin", "admin123").await.unwrap();
    assert_eq!(profile.role, Role::Admin);

    let saved = store.read().unwrap();
    assert_eq!(saved.access_token, "a1");
    assert_eq!(saved.refresh_token, "r1");
    assert_eq!(saved.role, "ADMIN");
    assert_eq!(saved.username, "admin");

    let auth = ctx.authorization();
    assert!(auth.has_role(Role::Admin));
    assert!(auth.has_any_role(&[Role::Librarian, Role::Admin]));

    // Back to where the user was headed before logging in.
    assert_eq!(nav.after_login(), GuardDecision::Allowed);
    assert_eq!(nav.location(), "/members");
}

#[tokio::test]
async fn test_user_cannot_open_members() {
    let server = MockServer::start().await;
    mount_login(&server, "reader", "secret", "USER").await;

    let ctx = context(&server, Arc::new(MemoryCredentialStore::new()));
    ctx.bootstrap().await;
    ctx.login("reader", "secret").await.unwrap();

    let mut nav = Navigator::new(ctx.clone());
    assert_eq!(nav.navigate("/members"), GuardDecision::RedirectUnauthorized);
    assert_eq!(nav.location(), UNAUTHORIZED_PATH);
    assert_eq!(nav.navigate("/loans/my-loans"), GuardDecision::Allowed);
    assert_eq!(nav.navigate("/login"), GuardDecision::RedirectHome);
    assert_eq!(nav.location(), "/dashboard");
}

#[tokio::test]
async fn test_failed_login_reports_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid username or password"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let ctx = context(&server, store.clone());
    ctx.bootstrap().await;

    let err = ctx.login("admin", "nope").await.unwrap_err();
    assert!(err.to_string().contains("Invalid username or password"));
    assert!(store.read().is_none());
    assert!(!ctx.state().is_authenticated());
}

#[tokio::test]
async fn test_register_forces_user_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_partial_json(json!({"username": "newbie", "role": "USER"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens("a1", "r1", "newbie", "USER")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("newbie", "USER")))
        .mount(&server)
        .await;

    let ctx = context(&server, Arc::new(MemoryCredentialStore::new()));
    let request = RegisterRequest {
        username: "newbie".into(),
        email: "newbie@library.com".into(),
        password: "password1".into(),
        first_name: "New".into(),
        last_name: "Reader".into(),
        role: Some(Role::Admin),
    };
    let profile = ctx.register(request).await.unwrap();
    assert_eq!(profile.role, Role::User);
    assert!(ctx.state().resolved);
}

#[tokio::test]
async fn test_bootstrap_restores_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer stored"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("reader", "USER")))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_credentials(stored("stored", "r1")));
    let ctx = context(&server, store);
    let state = ctx.bootstrap().await;
    assert!(state.resolved);
    assert_eq!(state.role(), Some(Role::User));
}

#[tokio::test]
async fn test_expired_access_token_is_transparent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("reader", "USER")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refreshToken": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens("fresh", "r2", "reader", "USER")))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_credentials(stored("expired", "r1")));
    let ctx = context(&server, store.clone());
    let state = ctx.bootstrap().await;

    assert!(state.is_authenticated());
    assert_eq!(store.access_token().as_deref(), Some("fresh"));

    let mut nav = Navigator::new(ctx);
    assert_eq!(nav.navigate("/books"), GuardDecision::Allowed);
}

#[tokio::test]
async fn test_invalid_tokens_send_user_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("reader", "USER")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid refresh token"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_credentials(stored("expired", "revoked")));
    let ctx = context(&server, store.clone());
    let watcher = ctx.watch_expiry();
    ctx.bootstrap().await;

    let mut nav = Navigator::new(ctx.clone());
    assert_eq!(nav.navigate("/books"), GuardDecision::Allowed);

    let err = ctx.client().books().list().await.unwrap_err();
    assert!(err.is_session_expired());
    assert!(store.read().is_none());

    let decision = nav.handle_error(&err);
    assert_eq!(
        decision,
        Some(GuardDecision::RedirectLogin {
            from: "/books".into()
        })
    );
    assert_eq!(nav.location(), LOGIN_PATH);

    // The expiry watcher drops the profile as well.
    let mut state_rx = ctx.subscribe();
    tokio::time::timeout(
        Duration::from_secs(2),
        state_rx.wait_for(|state| state.profile.is_none()),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(!ctx.authorization().is_authenticated());
    watcher.abort();
}

#[tokio::test]
async fn test_bootstrap_fails_closed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_credentials(stored("a", "r")));
    let ctx = context(&server, store.clone());
    let state = ctx.bootstrap().await;
    assert!(state.resolved);
    assert!(!state.is_authenticated());
    assert!(store.read().is_none());
}

#[tokio::test]
async fn test_refresh_user_failure_logs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("reader", "USER")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_credentials(stored("a", "r")));
    let ctx = context(&server, store.clone());
    assert!(ctx.bootstrap().await.is_authenticated());

    assert!(ctx.refresh_user().await.is_err());
    assert!(!ctx.state().is_authenticated());
    assert!(store.read().is_none());
}
