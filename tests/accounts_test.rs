//! Registration, login with cart claim, logout and the login wall.

mod common;

use common::{assert_ok, assert_redirect, body_text, TestApp};
use pizza_shop::{
    entities::{cart, contact, user},
    forms::{BAD_CREDENTIALS, PASSWORDS_DIFFER, USERNAME_TAKEN},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

async fn find_user(app: &TestApp, username: &str) -> Option<user::Model> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&*app.state.db)
        .await
        .unwrap()
}

async fn only_cart(app: &TestApp) -> cart::Model {
    let mut carts = cart::Entity::find().all(&*app.state.db).await.unwrap();
    assert_eq!(carts.len(), 1, "{carts:?}");
    carts.remove(0)
}

#[tokio::test]
async fn register_page_renders_for_anonymous_visitors() {
    let app = TestApp::new().await;
    let mut browser = app.browser();
    let response = browser.get("/accounts/register/").await;
    assert_ok(&response);
    let html = body_text(response).await;
    assert!(html.contains(r#"name="password2""#));
}

#[tokio::test]
async fn password_mismatch_creates_nothing() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let response = browser
        .post_form(
            "/accounts/register/",
            &[
                ("username", "ivan"),
                ("email", "ivan@pizza.test"),
                ("password", "secret-one"),
                ("password2", "secret-two"),
                ("phone", ""),
            ],
        )
        .await;
    assert_ok(&response);
    let html = body_text(response).await;
    assert!(html.contains(PASSWORDS_DIFFER));
    assert!(!html.contains("secret-one"));
    assert!(find_user(&app, "ivan").await.is_none());
}

#[tokio::test]
async fn bad_phone_is_rejected() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let response = browser
        .post_form(
            "/accounts/register/",
            &[
                ("username", "ivan"),
                ("email", "ivan@pizza.test"),
                ("password", "secret"),
                ("password2", "secret"),
                ("phone", "call me maybe"),
            ],
        )
        .await;
    assert_ok(&response);
    assert!(find_user(&app, "ivan").await.is_none());
}

#[tokio::test]
async fn registration_logs_in_and_claims_the_cart() {
    let app = TestApp::new().await;
    let mut browser = app.browser();
    browser.get("/").await;
    browser.ajax(&[("type", "add"), ("meal", "margherita")]).await;

    let response = browser.register("ivan", "secret").await;
    assert_redirect(&response, "/accounts/profile/");

    let user = find_user(&app, "ivan").await.expect("user stored");
    assert!(user.is_active);
    assert_ne!(user.password_hash, "secret");

    let contacts = contact::Entity::find()
        .filter(contact::Column::UserId.eq(user.id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(contacts.len(), 1);

    let cart = only_cart(&app).await;
    assert_eq!(cart.owner_id, Some(user.id));

    let html = body_text(browser.get("/about/").await).await;
    assert!(html.contains("/accounts/logout/"));
    assert!(html.contains(r#"data-count="1""#));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = TestApp::new().await;
    assert_redirect(
        &app.browser().register("ivan", "secret").await,
        "/accounts/profile/",
    );

    let mut other = app.browser();
    let response = other.register("ivan", "another").await;
    assert_ok(&response);
    assert!(body_text(response).await.contains(USERNAME_TAKEN));
    assert!(!body_text(other.get("/").await).await.contains("/accounts/logout/"));
}

#[tokio::test]
async fn wrong_password_redisplays_the_form() {
    let app = TestApp::new().await;
    app.browser().register("ivan", "secret").await;

    let mut browser = app.browser();
    let response = browser.login("ivan", "wrong").await;
    assert_ok(&response);
    assert!(body_text(response).await.contains(BAD_CREDENTIALS));
}

#[tokio::test]
async fn login_claims_the_anonymous_cart() {
    let app = TestApp::new().await;
    let user_id = {
        let mut first = app.browser();
        first.register("ivan", "secret").await;
        first.get("/accounts/logout/").await;
        find_user(&app, "ivan").await.unwrap().id
    };

    let mut browser = app.browser();
    browser.get("/").await;
    browser
        .ajax(&[("type", "set"), ("meal", "pepperoni"), ("amount", "3")])
        .await;

    assert_redirect(&browser.login("ivan", "secret").await, "/");

    let cart = only_cart(&app).await;
    assert_eq!(cart.owner_id, Some(user_id));
    let html = body_text(browser.get("/about/").await).await;
    assert!(html.contains(r#"data-count="3""#), "{html}");
}

#[tokio::test]
async fn login_follows_local_next_only() {
    let app = TestApp::new().await;
    app.browser().register("ivan", "secret").await;

    let mut browser = app.browser();
    let response = browser
        .post_form(
            "/accounts/login/",
            &[
                ("username", "ivan"),
                ("password", "secret"),
                ("next", "/accounts/profile/"),
            ],
        )
        .await;
    assert_redirect(&response, "/accounts/profile/");

    for next in ["https://evil.example/", "//evil.example/", r"\\evil.example"] {
        let mut browser = app.browser();
        let response = browser
            .post_form(
                "/accounts/login/",
                &[("username", "ivan"), ("password", "secret"), ("next", next)],
            )
            .await;
        assert_redirect(&response, "/");
    }
}

#[tokio::test]
async fn profile_requires_login() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let response = browser.get("/accounts/profile/").await;
    assert_redirect(&response, "/accounts/login/?next=%2Faccounts%2Fprofile%2F");

    let response = browser.get("/accounts/").await;
    assert_redirect(&response, "/accounts/login/?next=%2Faccounts%2F");
}

#[tokio::test]
async fn login_page_carries_next() {
    let app = TestApp::new().await;
    let html = body_text(
        app.browser()
            .get("/accounts/login/?next=%2Faccounts%2Fprofile%2F")
            .await,
    )
    .await;
    assert!(html.contains(r#"name="next" value="/accounts/profile/""#), "{html}");
}

#[tokio::test]
async fn logout_discards_the_open_cart_and_session() {
    let app = TestApp::new().await;
    let mut browser = app.browser();
    browser.register("ivan", "secret").await;
    browser.ajax(&[("type", "add"), ("meal", "margherita")]).await;
    assert_eq!(cart::Entity::find().all(&*app.state.db).await.unwrap().len(), 1);

    let response = browser.get("/accounts/logout/").await;
    assert_redirect(&response, "/");
    assert!(!browser.has_session());
    assert!(cart::Entity::find().all(&*app.state.db).await.unwrap().is_empty());

    assert_redirect(
        &browser.get("/accounts/profile/").await,
        "/accounts/login/?next=%2Faccounts%2Fprofile%2F",
    );
}

#[tokio::test]
async fn anonymous_logout_is_harmless() {
    let app = TestApp::new().await;
    let mut browser = app.browser();
    browser.get("/").await;

    assert_redirect(&browser.get("/accounts/logout/").await, "/");
    assert!(cart::Entity::find().all(&*app.state.db).await.unwrap().is_empty());
}

#[tokio::test]
async fn authenticated_visitors_skip_registration() {
    let app = TestApp::new().await;
    let mut browser = app.browser();
    browser.register("ivan", "secret").await;

    assert_redirect(&browser.get("/accounts/register/").await, "/accounts/profile/");
}
