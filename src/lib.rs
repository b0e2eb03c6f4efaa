//! Pizza House storefront
//!
//! Catalog browsing, a session-bound cart, checkout into orders and the
//! hand-off to an external payment provider, served as HTML by axum.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod forms;
pub mod handlers;
pub mod middleware_helpers;
pub mod models;
pub mod seed;
pub mod services;
pub mod tracing;
pub mod views;

use std::sync::Arc;

use axum::{http::HeaderValue, middleware, Router};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tower_sessions::{
    cookie::{time::Duration, SameSite},
    Expiry, MemoryStore, SessionManagerLayer,
};

use crate::{
    config::AppConfig,
    models::StateRegistry,
    services::{AccountService, CartService, CatalogService, OrderService},
};

pub const SESSION_COOKIE_NAME: &str = "sessionid";
const SESSION_IDLE_WEEKS: i64 = 2;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub states: Arc<StateRegistry>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig, states: StateRegistry) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            states: Arc::new(states),
        }
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.db.clone(), self.config.catalog_page_size)
    }

    pub fn cart_service(&self) -> CartService {
        CartService::new(self.db.clone(), self.states.clone())
    }

    pub fn order_service(&self) -> OrderService {
        OrderService::new(self.db.clone(), self.states.clone())
    }

    pub fn account_service(&self) -> AccountService {
        AccountService::new(self.db.clone())
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

fn session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(config.session_secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::weeks(SESSION_IDLE_WEEKS)))
}

/// The full application: storefront routes, static files and middleware
pub fn app_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .merge(handlers::routes())
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .nest_service("/media", ServeDir::new(&config.media_dir))
        .fallback(handlers::not_found)
        .layer(session_layer(&config))
        .layer(middleware::from_fn(
            middleware_helpers::security_headers_middleware,
        ))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http().make_span_with(crate::tracing::RequestSpanMaker))
        .layer(middleware::from_fn(middleware_helpers::request_id_middleware))
        .with_state(state)
}
