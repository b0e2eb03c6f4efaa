//! HTTP handlers and the storefront route table.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod health;
pub mod payments;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    auth::Visitor,
    entities::cart as cart_entity,
    errors::{ServiceError, ServiceResult},
    views::PageContext,
    AppState,
};

/// Resolves the visitor's cart (storing its token in the session) and
/// gathers the chrome every page shows.
pub async fn page_context(
    state: &AppState,
    visitor: &Visitor,
) -> ServiceResult<(PageContext, cart_entity::Model)> {
    let cart = resolve_cart(state, visitor).await?;
    let cart_lines = state.cart_service().lines(cart.id).await?;
    let sections = state.catalog_service().sections().await?;

    let ctx = PageContext {
        username: visitor.user.as_ref().map(|u| u.username.clone()),
        cart: crate::services::cart::CartSummary::of(&cart_lines),
        cart_lines,
        sections,
    };
    Ok((ctx, cart))
}

/// The one open cart for this visitor; its token is written back to the session
pub async fn resolve_cart(
    state: &AppState,
    visitor: &Visitor,
) -> ServiceResult<cart_entity::Model> {
    let token = visitor.cart_token().await?;
    let cart = state
        .cart_service()
        .resolve(token.as_deref(), visitor.user_id())
        .await?;
    if token.as_deref() != Some(cart.token.as_str()) {
        visitor.set_cart_token(&cart.token).await?;
    }
    Ok(cart)
}

/// Fallback for unrouted paths
pub async fn not_found() -> ServiceError {
    ServiceError::not_found("page")
}

/// URL slugs are limited to `[0-9a-zA-Z_-]`
pub fn check_slug(slug: &str) -> Result<(), ServiceError> {
    if slug
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        Ok(())
    } else {
        Err(ServiceError::not_found(format!("slug '{}'", slug)))
    }
}

/// Storefront routes. Fixed paths win over the catalog's slug routes, so
/// `about`, `accounts`, `handler`, `payment` and `static` cannot be used as
/// section slugs.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/about/", get(catalog::about))
        .route("/handler/", post(cart::ajax_handler))
        .route("/accounts/", get(accounts::profile))
        .route("/accounts/profile/", get(accounts::profile))
        .route(
            "/accounts/login/",
            get(accounts::login_form).post(accounts::login),
        )
        .route("/accounts/logout/", get(accounts::logout))
        .route(
            "/accounts/register/",
            get(accounts::register_form).post(accounts::register),
        )
        .route("/accounts/order/", get(accounts::checkout))
        .route("/payment/cart/:cart_id/", get(payments::payment_page))
        .route("/payment/success/:cart_id/", post(payments::payment_callback))
        .route("/health", get(health::health))
        .route("/:section/", get(catalog::section))
        .route("/:section/:sub_section/", get(catalog::sub_section))
        .route("/:section/:sub_section/:meal/", get(catalog::meal))
}
