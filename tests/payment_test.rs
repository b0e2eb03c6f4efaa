//! Payment hand-off page and the signed provider callback.

mod common;

use axum::http::StatusCode;
use common::{assert_redirect, body_text, Browser, TestApp, WEBHOOK_SECRET};
use pizza_shop::{entities::cart, models::OrderStatus};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

async fn place_order(app: &TestApp, username: &str) -> (Browser, i32) {
    let mut browser = app.browser();
    browser.register(username, "secret").await;
    browser
        .ajax(&[("type", "set"), ("meal", "pepperoni"), ("amount", "2")])
        .await;
    browser.get("/accounts/order/").await;

    let order = cart::Entity::find()
        .filter(cart::Column::Archive.eq(true))
        .one(&*app.state.db)
        .await
        .unwrap()
        .expect("archived order");
    (browser, order.id)
}

async fn status(app: &TestApp, cart_id: i32) -> Option<OrderStatus> {
    let cart = cart::Entity::find_by_id(cart_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    app.state.states.status_of(cart.status_id)
}

#[tokio::test]
async fn payment_page_renders_the_provider_form() {
    let app = TestApp::new().await;
    let (mut browser, order_id) = place_order(&app, "ivan").await;

    let response = browser.get(&format!("/payment/cart/{}/", order_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"name="business" value="merchant@pizza.test""#), "{html}");
    assert!(html.contains(r#"name="amount" value="1040""#));
    assert!(html.contains(&format!(r#"name="invoice" value="{}""#, order_id)));
    assert!(html.contains(&format!(
        r#"name="notify_url" value="http://pizza.test/payment/success/{}/""#,
        order_id
    )));
    assert!(html.contains(r#"name="custom" value="ivan""#));
}

#[tokio::test]
async fn payment_page_hides_other_users_orders() {
    let app = TestApp::new().await;
    let (_owner, order_id) = place_order(&app, "ivan").await;

    let mut stranger = app.browser();
    stranger.register("olga", "secret").await;
    let response = stranger.get(&format!("/payment/cart/{}/", order_id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payment_page_requires_login() {
    let app = TestApp::new().await;
    let response = app.browser().get("/payment/cart/1/").await;
    assert_redirect(&response, "/accounts/login/?next=%2Fpayment%2Fcart%2F1%2F");
}

#[tokio::test]
async fn unsigned_or_forged_callbacks_change_nothing() {
    let app = TestApp::new().await;
    let (_browser, order_id) = place_order(&app, "ivan").await;

    let unsigned = app.payment_callback(order_id, None).await;
    assert_eq!(unsigned.status(), StatusCode::UNAUTHORIZED);

    let forged = app.payment_callback(order_id, Some("not-the-secret")).await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(status(&app, order_id).await, Some(OrderStatus::Unpaid));
}

#[tokio::test]
async fn signed_callback_marks_the_order_paid_once() {
    let app = TestApp::new().await;
    let (mut browser, order_id) = place_order(&app, "ivan").await;

    let response = app.payment_callback(order_id, Some(WEBHOOK_SECRET)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
    assert_eq!(status(&app, order_id).await, Some(OrderStatus::Paid));

    let again = app.payment_callback(order_id, Some(WEBHOOK_SECRET)).await;
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(status(&app, order_id).await, Some(OrderStatus::Paid));

    let history = body_text(browser.get("/accounts/").await).await;
    assert!(!history.contains(&format!("/payment/cart/{}/", order_id)));
    assert_redirect(
        &browser.get(&format!("/payment/cart/{}/", order_id)).await,
        "/accounts/",
    );
}

#[tokio::test]
async fn callbacks_for_unknown_or_open_carts_are_refused() {
    let app = TestApp::new().await;

    let missing = app.payment_callback(999, Some(WEBHOOK_SECRET)).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let mut browser = app.browser();
    browser.get("/").await;
    let open = cart::Entity::find()
        .one(&*app.state.db)
        .await
        .unwrap()
        .expect("session cart");
    let response = app.payment_callback(open.id, Some(WEBHOOK_SECRET)).await;
    assert!(response.status().is_client_error());
    assert_eq!(status(&app, open.id).await, Some(OrderStatus::Pending));
}

#[tokio::test]
async fn callbacks_are_disabled_without_a_secret() {
    let app = TestApp::with_config(|config| config.payment_webhook_secret = None).await;
    let (_browser, order_id) = place_order(&app, "ivan").await;

    let response = app.payment_callback(order_id, Some(WEBHOOK_SECRET)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(status(&app, order_id).await, Some(OrderStatus::Unpaid));
}

#[tokio::test]
async fn signed_notice_for_another_order_is_refused() {
    let app = TestApp::new().await;
    let (_ivan, first) = place_order(&app, "ivan").await;

    let mut olga = app.browser();
    olga.register("olga", "secret").await;
    olga.ajax(&[("type", "add"), ("meal", "hawaiian")]).await;
    olga.get("/accounts/order/").await;
    let second = cart::Entity::find()
        .filter(cart::Column::Archive.eq(true))
        .filter(cart::Column::Id.ne(first))
        .one(&*app.state.db)
        .await
        .unwrap()
        .expect("second order")
        .id;

    let body = format!("invoice={}&payment_status=Completed", first);
    let response = app
        .payment_callback_with_body(second, &body, Some(WEBHOOK_SECRET))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(status(&app, second).await, Some(OrderStatus::Unpaid));
    assert_eq!(status(&app, first).await, Some(OrderStatus::Unpaid));
}

#[tokio::test]
async fn stated_amount_must_match_the_order_total() {
    let app = TestApp::new().await;
    let (_browser, order_id) = place_order(&app, "ivan").await;

    let short = format!("invoice={}&amount=1&payment_status=Completed", order_id);
    let response = app
        .payment_callback_with_body(order_id, &short, Some(WEBHOOK_SECRET))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(status(&app, order_id).await, Some(OrderStatus::Unpaid));

    let exact = format!("invoice={}&amount=1040.00&payment_status=Completed", order_id);
    let response = app
        .payment_callback_with_body(order_id, &exact, Some(WEBHOOK_SECRET))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status(&app, order_id).await, Some(OrderStatus::Paid));
}
