//! HTTP server assembly: router, middleware and startup.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Extension, Json, Router,
    extract::{Path, Request, State},
    http::StatusCode,
    response::{
        Html, IntoResponse, Redirect, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use tokio_stream::{StreamExt, wrappers::BroadcastStream};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::auth::backend::{ClaimsClient, ClaimsSource};
use crate::auth::claims::{Role, RoleClaims};
use crate::auth::provider::{IdentityProvider, StaticIdentityProvider};
use crate::auth::registry::ResolverRegistry;
use crate::auth::resolver::RoutingDecision;
use crate::catalog::{Booking, BookingStore, CatalogError, CatalogStore, ServiceListing};
use crate::config::AppConfig;
use crate::i18n::Messages;
use crate::security;
use crate::security::middleware::UserContext;
use crate::security::rate_limit::SimpleRateLimiter;
use crate::ui::pages;

/// Name of the browser-session cookie keying resolver instances.
const SESSION_COOKIE: &str = "localserv_session";

/// Start the server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let provider: Arc<dyn IdentityProvider> = Arc::new(StaticIdentityProvider::new(
        config.backend.identity_token.clone(),
    ));
    let claims: Arc<dyn ClaimsSource> = Arc::new(ClaimsClient::new(&config.backend.base_url)?);

    info!(
        name: "backend.configured",
        base_url = %config.backend.base_url,
        "claims endpoint configured"
    );

    let state = build_state(Arc::clone(&config), provider, claims)?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Assemble the application state.
///
/// The identity provider and claims source are injected so tests can
/// substitute doubles.
pub fn build_state(
    config: Arc<AppConfig>,
    provider: Arc<dyn IdentityProvider>,
    claims: Arc<dyn ClaimsSource>,
) -> anyhow::Result<AppState> {
    let catalog = match &config.catalog.seed_file {
        Some(path) => CatalogStore::from_yaml_file(path)?,
        None => CatalogStore::with_demo_listings(),
    };

    let rate_limiter = Arc::new(SimpleRateLimiter::new(
        config.resilience.requests_per_second,
        config.resilience.burst_size,
    ));

    Ok(AppState {
        resolvers: ResolverRegistry::new(provider, claims),
        catalog,
        bookings: BookingStore::new(),
        messages: Arc::new(Messages::builtin()),
        rate_limiter,
        config,
    })
}

/// Build the full router with middleware applied.
pub fn build_router(state: AppState) -> Router {
    // Booking routes require a verified bearer identity (unless disabled).
    let bookings_api = Router::new()
        .route("/bookings", post(api_create_booking).get(api_list_bookings))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            security::middleware::auth_middleware,
        ));

    let api = Router::new()
        .route("/auth/state", get(api_auth_state))
        .route("/auth/sign-in", post(api_sign_in))
        .route("/auth/sign-out", post(api_sign_out))
        .route("/auth/events", get(api_auth_events))
        .route("/services", get(api_list_services))
        .route("/services/{id}", get(api_get_service))
        .merge(bookings_api);

    // "Timeout disabled" keeps the layer but stretches the duration, so the
    // router type stays the same either way.
    let timeout_duration = if state.config.resilience.timeout_disabled {
        Duration::from_secs(365 * 24 * 60 * 60)
    } else {
        Duration::from_secs(30)
    };

    Router::new()
        // HTML pages
        .route("/", get(landing_handler))
        .route("/login", get(login_handler))
        .route("/pending-approval", get(pending_approval_handler))
        .route("/apply", get(apply_handler))
        .route("/admin-panel", get(admin_panel_handler))
        .route("/provider-dashboard", get(provider_dashboard_handler))
        .route("/contact", get(contact_handler))
        // JSON API
        .nest("/api", api)
        // Static assets
        .nest_service("/static", ServeDir::new("static"))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: axum::middleware::Next| {
                let duration = timeout_duration;
                async move {
                    match tokio::time::timeout(duration, next.run(req)).await {
                        Ok(res) => res,
                        Err(_) => {
                            (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
                        }
                    }
                }
            },
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            security::rate_limit::rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Read the browser-session key, minting a cookie on first contact.
fn ensure_session_cookie(jar: CookieJar) -> (String, CookieJar) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return (cookie.value().to_string(), jar);
    }
    let key = Uuid::new_v4().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, key.clone()))
        .path("/")
        .http_only(true)
        .build();
    (key, jar.add(cookie))
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn landing_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::landing(&state.catalog.list(), &state.messages))
}

async fn login_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::login(&state.messages))
}

/// Pending-approval page.
///
/// Applies the resolver's settled snapshot: unauthenticated visitors go to
/// login, approved providers go to their dashboard, everyone else sees the
/// pending panel.
async fn pending_approval_handler(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (key, jar) = ensure_session_cookie(jar);
    let resolver = state.resolvers.get_or_spawn(&key);
    let snapshot = resolver.state();

    if snapshot.ready {
        if !snapshot.is_authenticated() && snapshot.claims_error.is_none() {
            return (jar, Redirect::to("/login")).into_response();
        }
        if snapshot.claims.is_some_and(|c| c.role() == Role::Provider) {
            return (jar, Redirect::to("/provider-dashboard")).into_response();
        }
    }

    (jar, Html(pages::pending_approval(&state.messages))).into_response()
}

async fn apply_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::apply(&state.messages))
}

async fn admin_panel_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::admin_panel(&state.messages))
}

async fn provider_dashboard_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::provider_dashboard(&state.messages))
}

async fn contact_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::contact(&state.messages))
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Resolver snapshot for the current browser session.
#[derive(Debug, Serialize)]
struct AuthStateResponse {
    is_loading: bool,
    is_authenticated: bool,
    claims: Option<RoleClaims>,
    claims_error: Option<String>,
    /// Navigation target implied by the snapshot, if settled.
    route: Option<&'static str>,
}

/// GET /api/auth/state - Resolver snapshot for this visitor.
async fn api_auth_state(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<AuthStateResponse>) {
    let (key, jar) = ensure_session_cookie(jar);
    let resolver = state.resolvers.get_or_spawn(&key);
    let snapshot = resolver.state();
    let route = RoutingDecision::for_state(&snapshot).map(RoutingDecision::path);

    (
        jar,
        Json(AuthStateResponse {
            is_loading: snapshot.is_loading(),
            is_authenticated: snapshot.is_authenticated(),
            claims: snapshot.claims,
            claims_error: snapshot.claims_error,
            route,
        }),
    )
}

/// POST /api/auth/sign-in - Interactive sign-in.
///
/// A dismissed or failed provider flow is surfaced to the caller.
async fn api_sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), (StatusCode, String)> {
    let (key, jar) = ensure_session_cookie(jar);
    let resolver = state.resolvers.get_or_spawn(&key);

    match resolver.sign_in().await {
        Ok(()) => Ok((jar, StatusCode::NO_CONTENT)),
        Err(e) => {
            tracing::error!(error = %e, "interactive sign-in failed");
            Err((StatusCode::BAD_GATEWAY, format!("Sign-in failed: {e}")))
        }
    }
}

/// POST /api/auth/sign-out - Terminate the session. Idempotent.
async fn api_sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), (StatusCode, String)> {
    let (key, jar) = ensure_session_cookie(jar);
    let resolver = state.resolvers.get_or_spawn(&key);

    match resolver.sign_out().await {
        Ok(()) => Ok((jar, StatusCode::NO_CONTENT)),
        Err(e) => {
            tracing::error!(error = %e, "sign-out failed");
            Err((StatusCode::BAD_GATEWAY, format!("Sign-out failed: {e}")))
        }
    }
}

/// GET /api/auth/events - SSE stream of routing decisions.
async fn api_auth_events(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (key, jar) = ensure_session_cookie(jar);
    let resolver = state.resolvers.get_or_spawn(&key);

    let stream = BroadcastStream::new(resolver.decisions())
        .filter_map(|decision| decision.ok())
        .map(|decision| {
            Ok::<Event, Infallible>(Event::default().event("navigate").data(decision.path()))
        });

    let sse =
        Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)));
    (jar, sse)
}

/// GET /api/services - List all listings.
async fn api_list_services(State(state): State<AppState>) -> Json<Vec<ServiceListing>> {
    Json(state.catalog.list())
}

/// GET /api/services/:id - Get one listing.
async fn api_get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServiceListing>, StatusCode> {
    match state.catalog.get(&id) {
        Some(listing) => Ok(Json(listing)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Request body for the booking API.
#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    listing_id: String,
    /// Requested time slot, free-form.
    #[serde(default)]
    slot: String,
}

/// POST /api/bookings - Book a listing.
async fn api_create_booking(
    State(state): State<AppState>,
    user: Option<Extension<UserContext>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), (StatusCode, String)> {
    let client_id = user.map_or_else(|| "anonymous".to_string(), |Extension(ctx)| ctx.user_id);

    match state
        .bookings
        .create(&state.catalog, &req.listing_id, &client_id, &req.slot)
    {
        Ok(booking) => {
            info!(
                name: "booking.created",
                booking_id = %booking.id,
                listing_id = %booking.listing_id,
                client_id = %booking.client_id,
                "booking created"
            );
            Ok((StatusCode::CREATED, Json(booking)))
        }
        Err(e @ CatalogError::UnknownListing(_)) => Err((StatusCode::NOT_FOUND, e.to_string())),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// GET /api/bookings - List all bookings.
async fn api_list_bookings(State(state): State<AppState>) -> Json<Vec<Booking>> {
    Json(state.bookings.list())
}
