//! Session lifecycle integration tests: obtain, proactive refresh,
//! revocation, silent bootstrap, and concurrent refresh behavior.

mod common;

use std::time::Duration;

use serde_json::json;
use watchb_client::{ApiClient, CredentialStore, Credentials, SessionManager};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{fake_access_token, slow_refresh_config, test_config};

const OBTAIN_PATH: &str = "/api/auth/token-pair/obtain/";
const REFRESH_PATH: &str = "/api/auth/token-pair/refresh/";
const EXPIRE_PATH: &str = "/api/auth/refresh-token/expire/";

fn session_against(config: &watchb_client::Config) -> (SessionManager, CredentialStore) {
    let store = CredentialStore::new();
    let api = ApiClient::new(config).expect("build client");
    (SessionManager::new(api, store.clone(), config), store)
}

async fn refresh_hits(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == REFRESH_PATH)
        .count()
}

#[tokio::test]
async fn obtain_commits_token_and_schedules_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(OBTAIN_PATH))
        .and(body_json(json!({
            "email": "user@example.com",
            "password": "secret123!",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "token-one"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "token-two"})))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let (session, store) = session_against(&config);

    session
        .obtain("user@example.com", "secret123!")
        .await
        .expect("obtain");

    assert_eq!(store.access_token().as_deref(), Some("token-one"));
    assert!(!store.is_authenticated()); // obtain alone does not log in
    assert_eq!(refresh_hits(&server).await, 0); // timer has not fired yet

    // The timer fires at lifetime - margin (250ms here) and commits the
    // refreshed token.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(refresh_hits(&server).await >= 1);
    assert_eq!(store.access_token().as_deref(), Some("token-two"));
}

#[tokio::test]
async fn obtain_failure_commits_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(OBTAIN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let (session, store) = session_against(&config);

    session
        .obtain("user@example.com", "wrong")
        .await
        .expect_err("bad credentials");

    assert_eq!(store.snapshot(), Credentials::default());
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(refresh_hits(&server).await, 0); // no timer was armed
}

#[tokio::test]
async fn login_hydrates_user_from_token_subject() {
    let server = MockServer::start().await;
    let access = fake_access_token(7);

    Mock::given(method("POST"))
        .and(path(OBTAIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": access})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/7/"))
        .and(header("Authorization", format!("Bearer {access}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "username": "mina",
            "email": "mina@example.com",
            "profile": "movie person",
            "visibility": "public",
            "avatar": null,
            "background": null,
            "is_active": true,
            "date_joined": "2024-02-01T09:00:00Z",
            "last_login": null
        })))
        .mount(&server)
        .await;

    let config = slow_refresh_config(&server.uri());
    let (session, store) = session_against(&config);

    session
        .login("mina@example.com", "secret123!")
        .await
        .expect("login");

    let state = store.snapshot();
    assert!(state.is_authenticated);
    assert_eq!(state.user.id, Some(7));
    assert_eq!(state.user.username.as_deref(), Some("mina"));
    assert_eq!(state.user.email.as_deref(), Some("mina@example.com"));
}

#[tokio::test]
async fn expire_resets_all_session_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(OBTAIN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": fake_access_token(3)}))
                .insert_header("set-cookie", "csrftoken=csrf-abc; Path=/"),
        )
        .mount(&server)
        .await;
    // Revocation is a state-changing request: the CSRF cookie issued at
    // obtain time must come back as a header.
    Mock::given(method("POST"))
        .and(path(EXPIRE_PATH))
        .and(header("X-CSRFToken", "csrf-abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = slow_refresh_config(&server.uri());
    let (session, store) = session_against(&config);

    session.obtain("a@b.com", "secret123!").await.expect("obtain");
    store.mark_logged_in();

    session.expire().await.expect("expire");

    // Behaves as if never authenticated.
    assert_eq!(store.snapshot(), Credentials::default());
}

#[tokio::test]
async fn refresh_sends_cookie_not_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(OBTAIN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "first"}))
                .insert_header(
                    "set-cookie",
                    "watchb_refresh=opaque-refresh; HttpOnly; Path=/",
                ),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(header("cookie", "watchb_refresh=opaque-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "second"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = slow_refresh_config(&server.uri());
    let (session, store) = session_against(&config);

    session.obtain("a@b.com", "secret123!").await.expect("obtain");
    session.refresh().await.expect("refresh");

    assert_eq!(store.access_token().as_deref(), Some("second"));
}

#[tokio::test]
async fn bootstrap_without_refresh_cookie_stays_logged_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token is invalid or expired",
            "code": "token_not_valid"
        })))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let (session, store) = session_against(&config);

    // Single silent attempt; failure is expected on a first visit and is
    // swallowed rather than surfaced.
    assert!(!session.bootstrap().await);
    assert!(!store.is_authenticated());
    assert_eq!(store.snapshot(), Credentials::default());
}

#[tokio::test]
async fn bootstrap_with_valid_cookie_restores_session() {
    let server = MockServer::start().await;
    let access = fake_access_token(11);

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": access})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/11/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 11,
            "username": "returning",
            "email": "back@example.com",
            "avatar": null,
            "background": null,
            "date_joined": null,
            "last_login": null
        })))
        .mount(&server)
        .await;

    let config = slow_refresh_config(&server.uri());
    let (session, store) = session_against(&config);

    assert!(session.bootstrap().await);
    let state = store.snapshot();
    assert!(state.is_authenticated);
    assert_eq!(state.user.username.as_deref(), Some("returning"));
}

#[tokio::test]
async fn concurrent_refreshes_serialize_last_commit_wins() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "refresh-a"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "refresh-b"})))
        .mount(&server)
        .await;

    let config = slow_refresh_config(&server.uri());
    let (session, store) = session_against(&config);

    // The gate serializes the two calls; the second to commit wins.
    let (first, second) = tokio::join!(session.refresh(), session.refresh());
    first.expect("first refresh");
    second.expect("second refresh");

    assert_eq!(refresh_hits(&server).await, 2);
    assert_eq!(store.access_token().as_deref(), Some("refresh-b"));
}

#[tokio::test]
async fn failed_scheduled_refresh_logs_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(OBTAIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "short-lived"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token is invalid or expired"
        })))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let (session, store) = session_against(&config);

    session.obtain("a@b.com", "secret123!").await.expect("obtain");
    store.mark_logged_in();

    // The timer-fired refresh fails; no retry, the session degrades to
    // logged out.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(!store.is_authenticated());
    assert_eq!(store.access_token(), None);
}
