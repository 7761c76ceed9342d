//! Localserv
//!
//! A local-services marketplace web application: browse service listings,
//! book providers, and move through an authentication/approval flow with
//! role-based routing to admin, provider and client views.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP server with HTML-first pages (HTMX + Alpine)
//! - **Session/Role Resolver**: an actor bridging identity-provider session
//!   notifications to routing decisions
//! - **Catalog**: in-memory listing and booking stores
//! - **Security**: bearer-token middleware and rate limiting on the API
//!
//! # Modules
//!
//! - [`auth`]: session/role resolution and routing
//! - [`catalog`]: service listings and bookings
//! - [`config`]: layered application configuration
//! - [`i18n`]: localized message bundles
//! - [`security`]: API protection middleware
//! - [`server`]: router assembly and startup
//! - [`ui`]: server-rendered pages and components

#![allow(clippy::unused_async)]

pub mod auth;
pub mod catalog;
pub mod config;
pub mod i18n;
pub mod security;
pub mod server;
pub mod ui;

use std::sync::Arc;

use crate::auth::registry::ResolverRegistry;
use crate::catalog::{BookingStore, CatalogStore};
use crate::config::AppConfig;
use crate::i18n::Messages;
use crate::security::rate_limit::SimpleRateLimiter;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Per-visitor session/role resolvers.
    pub resolvers: ResolverRegistry,
    /// Service listings.
    pub catalog: CatalogStore,
    /// Client bookings.
    pub bookings: BookingStore,
    /// Localized message bundle.
    pub messages: Arc<Messages>,
    /// Global rate limiter.
    pub rate_limiter: Arc<SimpleRateLimiter>,
    /// Global configuration.
    pub config: Arc<AppConfig>,
}
