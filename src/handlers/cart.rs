//! Ajax endpoint behind the cart widgets and the search box.
//!
//! Answers are HTML fragments or the literal `OK`/`ERROR`; the page
//! scripts never see a structured error.

use axum::{
    extract::{rejection::FormRejection, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::debug;

use super::resolve_cart;
use crate::{auth::Visitor, errors::ServiceResult, views, AppState};

pub const OK: &str = "OK";
pub const ERROR: &str = "ERROR";

#[derive(Debug, Default, Deserialize)]
pub struct CartRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Meal slug, or the query text for `search`
    pub meal: Option<String>,
    pub amount: Option<String>,
}

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

pub async fn ajax_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    visitor: Visitor,
    form: Result<Form<CartRequest>, FormRejection>,
) -> ServiceResult<Response> {
    if !is_ajax(&headers) {
        debug!("cart handler called without XMLHttpRequest");
        return Ok(ERROR.into_response());
    }
    let Ok(Form(request)) = form else {
        return Ok(ERROR.into_response());
    };

    let meal = request.meal.as_deref().unwrap_or_default();
    match request.kind.as_deref() {
        Some("add") => {
            let cart = resolve_cart(&state, &visitor).await?;
            Ok(match state.cart_service().add_meal(cart.id, meal).await? {
                Some(update) => Html(views::cart::line_fragment(&update)).into_response(),
                None => ERROR.into_response(),
            })
        }
        Some("set") => {
            let cart = resolve_cart(&state, &visitor).await?;
            let update = state
                .cart_service()
                .set_amount(cart.id, meal, request.amount.as_deref())
                .await?;
            Ok(match update {
                Some(update) => Html(views::cart::line_fragment(&update)).into_response(),
                None => ERROR.into_response(),
            })
        }
        Some("del") => {
            let cart = resolve_cart(&state, &visitor).await?;
            state.cart_service().remove_meal(cart.id, meal).await?;
            Ok(OK.into_response())
        }
        Some("search") => {
            let meals = state.catalog_service().search(meal).await?;
            Ok(Html(views::cart::search_results(&meals)).into_response())
        }
        _ => Ok(ERROR.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn ajax_detection_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        assert!(!is_ajax(&headers));
        headers.insert("x-requested-with", HeaderValue::from_static("xmlhttprequest"));
        assert!(is_ajax(&headers));
        headers.insert("x-requested-with", HeaderValue::from_static("fetch"));
        assert!(!is_ajax(&headers));
    }
}
