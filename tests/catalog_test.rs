//! Catalog pages, pagination and the health check.

mod common;

use axum::http::StatusCode;
use common::{assert_ok, body_text, TestApp};

#[tokio::test]
async fn index_lists_sections_and_meals() {
    let app = TestApp::new().await;
    let response = app.browser().get("/").await;
    assert_ok(&response);

    let html = body_text(response).await;
    assert!(html.contains(r#"<a href="/pizza/">Pizza</a>"#), "{html}");
    assert!(html.contains(r#"<a href="/rolls/">Rolls</a>"#));
    assert!(html.contains(r#"data-meal="baked-salmon""#));
}

#[tokio::test]
async fn about_page_renders() {
    let app = TestApp::new().await;
    let html = body_text(app.browser().get("/about/").await).await;
    assert!(html.contains("<title>Информация | Pizza House</title>"));
}

#[tokio::test]
async fn section_page_collects_meals_of_all_sub_sections() {
    let app = TestApp::new().await;
    let html = body_text(app.browser().get("/pizza/").await).await;

    for slug in ["margherita", "four-cheese", "pepperoni", "hawaiian"] {
        assert!(html.contains(&format!(r#"data-meal="{}""#, slug)), "{slug}");
    }
    assert!(!html.contains(r#"data-meal="baked-salmon""#));
    assert!(!html.contains(r#"class="pagination""#));
}

#[tokio::test]
async fn section_pages_are_paginated() {
    let app = TestApp::with_config(|config| config.catalog_page_size = 3).await;
    let mut browser = app.browser();

    let first = body_text(browser.get("/pizza/").await).await;
    assert!(first.contains(r#"<li class="active"><span>1</span></li>"#), "{first}");
    assert_eq!(first.matches(r#"<div class="meal""#).count(), 3);

    let second = body_text(browser.get("/pizza/?page=2").await).await;
    assert!(second.contains(r#"<li class="active"><span>2</span></li>"#));
    assert_eq!(second.matches(r#"<div class="meal""#).count(), 1);
}

#[tokio::test]
async fn odd_page_numbers_fall_back() {
    let app = TestApp::with_config(|config| config.catalog_page_size = 3).await;
    let mut browser = app.browser();

    let garbage = body_text(browser.get("/pizza/?page=abc").await).await;
    assert!(garbage.contains(r#"<li class="active"><span>1</span></li>"#));

    let too_far = body_text(browser.get("/pizza/?page=99").await).await;
    assert!(too_far.contains(r#"<li class="active"><span>2</span></li>"#));
}

#[tokio::test]
async fn sub_section_page_lists_its_own_meals() {
    let app = TestApp::new().await;
    let html = body_text(app.browser().get("/pizza/special/").await).await;

    assert!(html.contains(r#"data-meal="hawaiian""#));
    assert!(!html.contains(r#"data-meal="margherita""#));
}

#[tokio::test]
async fn sub_section_under_the_wrong_section_is_missing() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    assert_eq!(
        browser.get("/rolls/classic/").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        browser.get("/rolls/classic/margherita/").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        browser.get("/pizza/special/margherita/").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn unknown_or_malformed_slugs_are_missing() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    for path in ["/drinks/", "/pizza/desserts/", "/pizza/classic/calzone/", "/Pizza!/"] {
        assert_eq!(browser.get(path).await.status(), StatusCode::NOT_FOUND, "{path}");
    }
    assert_eq!(
        browser.get("/no/such/page/at/all/").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn meal_page_shows_details_and_quantity_in_cart() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let before = body_text(browser.get("/pizza/classic/margherita/").await).await;
    assert!(before.contains(r#"data-meal="margherita" value="0""#), "{before}");
    assert!(before.contains("Mozzarella"));
    assert!(before.contains("Calories"));
    assert!(before.contains("/media/"));

    browser
        .ajax(&[("type", "set"), ("meal", "margherita"), ("amount", "4")])
        .await;
    let after = body_text(browser.get("/pizza/classic/margherita/").await).await;
    assert!(after.contains(r#"data-meal="margherita" value="4""#));
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::new().await;
    let response = app.browser().get("/").await;

    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}

#[tokio::test]
async fn health_reports_database_up() {
    let app = TestApp::new().await;
    let response = app.browser().get("/health").await;
    assert_ok(&response);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "up");
    assert_eq!(body["database"], "up");
}
