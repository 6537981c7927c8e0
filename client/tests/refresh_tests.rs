//! Token refresh protocol tests against an in-process stub server.
//!
//! The stub tracks how many refresh calls it receives, so the tests can
//! assert the single-flight invariant directly.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use supply_chain_client::{ApiClient, ClientError, StoredTokens, TokenStore};

#[derive(Default)]
struct StubState {
    valid_access: Mutex<String>,
    refresh_calls: AtomicUsize,
    fail_refresh: AtomicBool,
}

async fn protected(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let expected = format!("Bearer {}", state.valid_access.lock().unwrap());
    let presented = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    if presented == expected {
        (StatusCode::OK, Json(json!({ "data": { "ok": true } })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "code": "UNAUTHORIZED", "message": "Token expired" } })),
        )
    }
}

async fn always_unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "code": "UNAUTHORIZED", "message": "No" } })),
    )
}

async fn refresh(State(state): State<Arc<StubState>>) -> (StatusCode, Json<Value>) {
    let n = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;

    // Hold the refresh open long enough for concurrent 401s to queue
    tokio::time::sleep(Duration::from_millis(100)).await;

    if state.fail_refresh.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "code": "INVALID_TOKEN", "message": "Refresh rejected" } })),
        );
    }

    let access = format!("access-{}", n);
    *state.valid_access.lock().unwrap() = access.clone();
    (
        StatusCode::OK,
        Json(json!({
            "accessToken": access,
            "refreshToken": format!("refresh-{}", n),
            "tokenType": "Bearer",
            "expiresIn": 3600,
        })),
    )
}

async fn spawn_stub(state: Arc<StubState>) -> String {
    let app = Router::new()
        .route("/api/protected", get(protected))
        .route("/api/always-401", get(always_unauthorized))
        .route("/api/auth/refresh-token", post(refresh))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn stale_client(base_url: &str) -> ApiClient {
    let client = ApiClient::new(base_url);
    client.token_store().set(
        StoredTokens {
            access_token: "stale".to_string(),
            refresh_token: "refresh-0".to_string(),
        },
        false,
    );
    client
}

#[tokio::test]
async fn valid_token_passes_through_without_refresh() {
    let state = Arc::new(StubState::default());
    *state.valid_access.lock().unwrap() = "good".to_string();
    let base = spawn_stub(state.clone()).await;

    let client = ApiClient::new(&base);
    client.token_store().set(
        StoredTokens {
            access_token: "good".to_string(),
            refresh_token: "refresh-0".to_string(),
        },
        false,
    );

    let body: Value = client.get("/api/protected").await.unwrap();
    assert_eq!(body, json!({ "ok": true }));
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stale_token_is_refreshed_once_and_request_retried() {
    let state = Arc::new(StubState::default());
    *state.valid_access.lock().unwrap() = "current".to_string();
    let base = spawn_stub(state.clone()).await;

    let client = stale_client(&base);
    let body: Value = client.get("/api/protected").await.unwrap();

    assert_eq!(body, json!({ "ok": true }));
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        client.token_store().access_token().as_deref(),
        Some("access-1")
    );
}

#[tokio::test]
async fn concurrent_401s_share_a_single_refresh() {
    let state = Arc::new(StubState::default());
    *state.valid_access.lock().unwrap() = "current".to_string();
    let base = spawn_stub(state.clone()).await;

    let client = stale_client(&base);

    let a = client.clone();
    let b = client.clone();
    let (ra, rb) = tokio::join!(
        async move { a.get::<Value>("/api/protected").await },
        async move { b.get::<Value>("/api/protected").await },
    );

    assert_eq!(ra.unwrap(), json!({ "ok": true }));
    assert_eq!(rb.unwrap(), json!({ "ok": true }));
    assert_eq!(
        state.refresh_calls.load(Ordering::SeqCst),
        1,
        "exactly one refresh call must be made"
    );
}

#[tokio::test]
async fn refresh_failure_rejects_all_callers_and_wipes_credentials() {
    let state = Arc::new(StubState::default());
    *state.valid_access.lock().unwrap() = "current".to_string();
    state.fail_refresh.store(true, Ordering::SeqCst);
    let base = spawn_stub(state.clone()).await;

    let client = stale_client(&base);

    let a = client.clone();
    let b = client.clone();
    let (ra, rb) = tokio::join!(
        async move { a.get::<Value>("/api/protected").await },
        async move { b.get::<Value>("/api/protected").await },
    );

    assert!(matches!(ra, Err(ClientError::Unauthorized)));
    assert!(matches!(rb, Err(ClientError::Unauthorized)));
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(client.token_store().is_empty(), "credentials must be wiped");
}

#[tokio::test]
async fn missing_refresh_token_rejects_without_calling_refresh_endpoint() {
    let state = Arc::new(StubState::default());
    *state.valid_access.lock().unwrap() = "current".to_string();
    let base = spawn_stub(state.clone()).await;

    // Empty store; no refresh token at all
    let client = ApiClient::new(&base);
    client.token_store().clear();

    let result = client.get::<Value>("/api/protected").await;
    assert!(matches!(result, Err(ClientError::MissingRefreshToken)));
    assert_eq!(
        state.refresh_calls.load(Ordering::SeqCst),
        0,
        "refresh endpoint must not be called"
    );
}

#[tokio::test]
async fn retried_request_never_starts_a_second_refresh() {
    let state = Arc::new(StubState::default());
    let base = spawn_stub(state.clone()).await;

    let client = stale_client(&base);

    // The endpoint 401s even after a successful refresh; the client must
    // give up rather than loop.
    let result = client.get::<Value>("/api/always-401").await;

    assert!(matches!(result, Err(ClientError::Unauthorized)));
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_rotates_the_stored_refresh_token() {
    let state = Arc::new(StubState::default());
    *state.valid_access.lock().unwrap() = "current".to_string();
    let base = spawn_stub(state.clone()).await;

    let client = stale_client(&base);
    let _: Value = client.get("/api/protected").await.unwrap();

    assert_eq!(
        client.token_store().refresh_token().as_deref(),
        Some("refresh-1")
    );
}

#[tokio::test]
async fn refresh_rewrites_a_remembered_token_file() {
    let state = Arc::new(StubState::default());
    *state.valid_access.lock().unwrap() = "current".to_string();
    let base = spawn_stub(state.clone()).await;

    let dir = std::env::temp_dir().join(format!("scm-refresh-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("tokens.json");

    // A previous remembered session left a now-stale pair on disk
    {
        let store = TokenStore::with_persistence(&path);
        store.set(
            StoredTokens {
                access_token: "stale".to_string(),
                refresh_token: "refresh-0".to_string(),
            },
            true,
        );
    }

    // A new client picks the pair up from disk; the 401-triggered refresh
    // must rotate the pair on disk too, or the file keeps a token the
    // server has already revoked
    let client = ApiClient::with_token_store(&base, Arc::new(TokenStore::with_persistence(&path)));
    let body: Value = client.get("/api/protected").await.unwrap();
    assert_eq!(body, json!({ "ok": true }));

    let on_disk: StoredTokens =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.refresh_token, "refresh-1");
    assert_eq!(on_disk.access_token, "access-1");

    let _ = std::fs::remove_dir_all(&dir);
}
