use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::page_context;
use crate::{
    auth::{safe_next, CurrentUser, Visitor},
    errors::{ServiceError, ServiceResult},
    forms::{FormErrors, LoginForm, RegistrationForm, BAD_CREDENTIALS},
    views, AppState,
};

pub const PROFILE_PATH: &str = "/accounts/profile/";
pub const ORDERS_PATH: &str = "/accounts/";
pub const REGISTER_PATH: &str = "/accounts/register/";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn request_host(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::HOST).and_then(|v| v.to_str().ok())
}

pub async fn login_form(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    visitor: Visitor,
) -> ServiceResult<Html<String>> {
    let (ctx, _) = page_context(&state, &visitor).await?;
    let form = LoginForm {
        next: query.next,
        ..Default::default()
    };
    Ok(Html(views::accounts::login_page(
        &ctx,
        &form,
        &FormErrors::default(),
    )))
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut visitor: Visitor,
    Form(form): Form<LoginForm>,
) -> ServiceResult<Response> {
    let errors = match form.check() {
        Err(errors) => errors,
        Ok(()) => {
            let accounts = state.account_service();
            match accounts.authenticate(&form.username, &form.password).await? {
                Some(user) => {
                    let token = visitor.cart_token().await?;
                    let user_id = user.id;
                    visitor.login(user).await?;
                    accounts.claim_cart(token.as_deref(), user_id).await?;
                    info!(user_id, "User logged in");

                    let target = safe_next(
                        form.next.as_deref(),
                        request_host(&headers),
                        &state.config.login_redirect_url,
                    );
                    return Ok(Redirect::to(target).into_response());
                }
                None => FormErrors::non_field(BAD_CREDENTIALS),
            }
        }
    };

    let (ctx, _) = page_context(&state, &visitor).await?;
    Ok(Html(views::accounts::login_page(&ctx, &form, &errors)).into_response())
}

/// Drops the visitor's open cart, then the whole session
pub async fn logout(State(state): State<AppState>, mut visitor: Visitor) -> ServiceResult<Redirect> {
    match visitor.cart_token().await {
        Ok(token) => {
            if let Err(e) = state
                .account_service()
                .discard_open_cart(token.as_deref(), visitor.user_id())
                .await
            {
                warn!(error = %e, "Failed to discard cart on logout");
            }
        }
        Err(e) => warn!(error = %e, "Failed to read cart token on logout"),
    }

    visitor.logout().await?;
    Ok(Redirect::to("/"))
}

pub async fn register_form(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    visitor: Visitor,
) -> ServiceResult<Response> {
    if visitor.user.is_some() {
        return Ok(Redirect::to(PROFILE_PATH).into_response());
    }
    let (ctx, _) = page_context(&state, &visitor).await?;
    let form = RegistrationForm {
        next: query.next,
        ..Default::default()
    };
    Ok(Html(views::accounts::register_page(
        &ctx,
        &form,
        &FormErrors::default(),
    ))
    .into_response())
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut visitor: Visitor,
    Form(form): Form<RegistrationForm>,
) -> ServiceResult<Response> {
    if visitor.user.is_some() {
        return Ok(Redirect::to(PROFILE_PATH).into_response());
    }

    let errors = match form.check() {
        Err(errors) => errors,
        Ok(()) => {
            let accounts = state.account_service();
            match accounts.register(&form).await {
                Ok(user) => {
                    let token = visitor.cart_token().await?;
                    let user_id = user.id;
                    visitor.login(user).await?;
                    accounts.claim_cart(token.as_deref(), user_id).await?;

                    let target =
                        safe_next(form.next.as_deref(), request_host(&headers), PROFILE_PATH);
                    return Ok(Redirect::to(target).into_response());
                }
                Err(ServiceError::ValidationError(message)) => {
                    let mut errors = FormErrors::default();
                    errors.add("username", message);
                    errors
                }
                Err(e) => return Err(e),
            }
        }
    };

    let (ctx, _) = page_context(&state, &visitor).await?;
    Ok(Html(views::accounts::register_page(&ctx, &form, &errors)).into_response())
}

/// Order history, newest first
pub async fn profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ServiceResult<Html<String>> {
    let (ctx, _) = page_context(&state, &current.visitor).await?;
    let orders = state.order_service().history(current.user.id).await?;
    Ok(Html(views::accounts::profile_page(&ctx, &orders)))
}

/// Checkout: archives the open cart as an unpaid order
pub async fn checkout(State(state): State<AppState>, visitor: Visitor) -> ServiceResult<Redirect> {
    let Some(user_id) = visitor.user_id() else {
        return Ok(Redirect::to(REGISTER_PATH));
    };

    let token = visitor.cart_token().await?;
    if let Some(order) = state
        .order_service()
        .checkout(token.as_deref(), user_id)
        .await?
    {
        info!(user_id, cart_id = order.id, "Order placed");
    }
    visitor.clear_cart_token().await?;
    Ok(Redirect::to(ORDERS_PATH))
}
