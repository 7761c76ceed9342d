//! End-to-end resolver tests against a real HTTP claims endpoint.
//!
//! A stub backend serves scripted `/api/auth/me` responses on an ephemeral
//! port; the resolver talks to it through the production `ClaimsClient`.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
};
use serde_json::{Value, json};
use tokio::sync::watch;

use localserv::auth::backend::ClaimsClient;
use localserv::auth::provider::{IdentityProvider, Session, StaticIdentityProvider};
use localserv::auth::resolver::{Resolver, ResolverState, RoutingDecision};

/// Scripted stub for the backend claims endpoint.
#[derive(Clone, Default)]
struct StubBackend {
    /// Queue of (status, body) responses; the last one repeats.
    responses: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    /// Authorization headers seen, in order.
    seen_auth: Arc<Mutex<Vec<String>>>,
}

impl StubBackend {
    fn push(&self, status: StatusCode, body: Value) {
        self.responses.lock().unwrap().push_back((status, body));
    }

    async fn spawn(&self) -> SocketAddr {
        let app = Router::new()
            .route("/api/auth/me", get(me_handler))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }
}

async fn me_handler(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if let Some(auth) = headers.get("authorization") {
        stub.seen_auth
            .lock()
            .unwrap()
            .push(auth.to_str().unwrap_or_default().to_string());
    }

    let mut responses = stub.responses.lock().unwrap();
    let (status, body) = match responses.len() {
        0 => (StatusCode::OK, json!({})),
        1 => responses.front().cloned().unwrap(),
        _ => responses.pop_front().unwrap(),
    };
    (status, Json(body))
}

async fn wait_for(
    rx: &mut watch::Receiver<ResolverState>,
    pred: impl Fn(&ResolverState) -> bool,
) -> ResolverState {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = rx.borrow().clone();
            if pred(&snapshot) {
                return snapshot;
            }
            rx.changed().await.expect("resolver gone");
        }
    })
    .await
    .expect("timed out waiting for resolver state")
}

fn setup(stub_addr: SocketAddr, token: Option<&str>) -> (Arc<StaticIdentityProvider>, Resolver) {
    let provider = Arc::new(StaticIdentityProvider::new(token.map(str::to_string)));
    let provider_dyn: Arc<dyn IdentityProvider> = provider.clone();
    let claims = Arc::new(ClaimsClient::new(format!("http://{stub_addr}")).unwrap());
    let resolver = Resolver::spawn(provider_dyn, claims);
    (provider, resolver)
}

#[tokio::test]
async fn test_admin_flow_over_http() {
    let stub = StubBackend::default();
    stub.push(StatusCode::OK, json!({"claims": {"admin": true, "provider": true}}));
    let addr = stub.spawn().await;

    let (provider, resolver) = setup(addr, Some("session-token"));
    let mut rx = resolver.watch();
    let mut decisions = resolver.decisions();

    provider.push_session(Some(Session::new("admin-user")));

    let state = wait_for(&mut rx, ResolverState::is_authenticated).await;
    assert!(state.claims.unwrap().admin);

    // The login decision from the initial signed-out notification may or
    // may not precede the admin decision depending on timing; the admin
    // decision must arrive.
    let mut saw_admin = false;
    for _ in 0..2 {
        match decisions.recv().await.unwrap() {
            RoutingDecision::AdminPanel => {
                saw_admin = true;
                break;
            }
            RoutingDecision::Login => {}
            other => panic!("unexpected decision: {other:?}"),
        }
    }
    assert!(saw_admin);

    // The token was presented as a bearer credential.
    let seen = stub.seen_auth.lock().unwrap().clone();
    assert!(seen.iter().any(|h| h == "Bearer session-token"));
}

#[tokio::test]
async fn test_provider_flow_over_http() {
    let stub = StubBackend::default();
    stub.push(StatusCode::OK, json!({"claims": {"provider": true}}));
    let addr = stub.spawn().await;

    let (provider, resolver) = setup(addr, Some("tok"));
    let mut rx = resolver.watch();

    provider.push_session(Some(Session::new("prov-user")));

    let state = wait_for(&mut rx, ResolverState::is_authenticated).await;
    let claims = state.claims.unwrap();
    assert!(claims.provider);
    assert!(!claims.admin);
}

#[tokio::test]
async fn test_absent_claims_field_means_empty_set() {
    let stub = StubBackend::default();
    stub.push(StatusCode::OK, json!({"user_id": "u1"}));
    let addr = stub.spawn().await;

    let (provider, resolver) = setup(addr, Some("tok"));
    let mut rx = resolver.watch();

    provider.push_session(Some(Session::new("u1")));

    let state = wait_for(&mut rx, ResolverState::is_authenticated).await;
    let claims = state.claims.unwrap();
    assert!(!claims.admin);
    assert!(!claims.provider);
}

#[tokio::test]
async fn test_backend_error_leaves_claims_unknown() {
    let stub = StubBackend::default();
    stub.push(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "boom"}),
    );
    let addr = stub.spawn().await;

    let (provider, resolver) = setup(addr, Some("tok"));
    let mut rx = resolver.watch();

    provider.push_session(Some(Session::new("u1")));

    let state = wait_for(&mut rx, |s| s.ready && s.claims_error.is_some()).await;
    assert!(!state.is_authenticated());
    assert!(state.claims_error.unwrap().contains("500"));
}

#[tokio::test]
async fn test_sign_out_after_claims_routes_to_login() {
    let stub = StubBackend::default();
    stub.push(StatusCode::OK, json!({"claims": {"admin": true}}));
    let addr = stub.spawn().await;

    let (provider, resolver) = setup(addr, Some("tok"));
    let mut rx = resolver.watch();

    provider.push_session(Some(Session::new("u1")));
    wait_for(&mut rx, ResolverState::is_authenticated).await;

    resolver.sign_out().await.unwrap();
    let state = wait_for(&mut rx, |s| s.ready && !s.is_authenticated()).await;
    assert!(state.claims.is_none());
}
