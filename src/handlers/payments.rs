use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::{info, warn};

use super::{accounts::ORDERS_PATH, page_context};
use crate::{
    auth::CurrentUser,
    errors::{ServiceError, ServiceResult},
    services::payments::{verify_signature, PaymentForm, PaymentNotice},
    views, AppState,
};

/// Hand-off page for one of the caller's unpaid orders
pub async fn payment_page(
    State(state): State<AppState>,
    Path(cart_id): Path<i32>,
    current: CurrentUser,
) -> ServiceResult<Response> {
    let order = state
        .order_service()
        .order_for(cart_id, current.user.id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("order {}", cart_id)))?;

    if !order.is_payable() {
        return Ok(Redirect::to(ORDERS_PATH).into_response());
    }

    let (ctx, _) = page_context(&state, &current.visitor).await?;
    let form = PaymentForm::for_order(&order, &state.config, &current.user.username);
    Ok(Html(views::payment::payment_page(&ctx, &order, &form)).into_response())
}

/// Provider confirmation. Refused unless signed with the webhook secret and
/// naming this order as its invoice.
pub async fn payment_callback(
    State(state): State<AppState>,
    Path(cart_id): Path<i32>,
    headers: HeaderMap,
    body: Bytes,
) -> ServiceResult<impl IntoResponse> {
    let Some(secret) = state.config.webhook_secret() else {
        warn!(cart_id, "Payment callback refused: no webhook secret configured");
        return Err(ServiceError::Unauthorized("payment callbacks are disabled".into()));
    };

    if let Err(reason) = verify_signature(
        &headers,
        &body,
        secret,
        state.config.payment_webhook_tolerance_secs,
        Utc::now().timestamp(),
    ) {
        warn!(cart_id, ?reason, "Payment callback signature verification failed");
        return Err(ServiceError::Unauthorized("invalid webhook signature".into()));
    }

    let paid_amount = PaymentNotice::parse(&body).verify(cart_id).map_err(|reason| {
        warn!(cart_id, ?reason, "Signed payment notice does not match the order");
        ServiceError::BadRequest(format!("payment notice does not apply to order {}", cart_id))
    })?;

    let order = state
        .order_service()
        .mark_paid(cart_id, paid_amount)
        .await?;
    info!(cart_id = order.id, "Payment confirmed");
    Ok((StatusCode::OK, "OK"))
}
