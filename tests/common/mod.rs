#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use pizza_shop::{
    app_router,
    config::AppConfig,
    db::{establish_connection_with_config, run_migrations, DbConfig},
    models::order_status::seed_states,
    seed::{import_catalog, CatalogFile},
    services::payments::{sign, SIGNATURE_HEADER, TIMESTAMP_HEADER},
    AppState,
};
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const HOST: &str = "pizza.test";

const CATALOG: &str = r#"{
    "sections": [
        {
            "slug": "pizza",
            "title": "Pizza",
            "sub_sections": [
                {
                    "slug": "classic",
                    "title": "Classic",
                    "meals": [
                        {"slug": "margherita", "title": "Margherita", "price": 450, "weight": "450 g",
                         "images": [{"file": "1.jpg"}],
                         "ingredients": [{"title": "Mozzarella", "type": "Cheese"}],
                         "info": {"Calories": "780"}},
                        {"slug": "four-cheese", "title": "Four Cheese", "price": 590, "weight": "470 g"},
                        {"slug": "pepperoni", "title": "Pepperoni", "price": 520, "weight": "480 g"}
                    ]
                },
                {
                    "slug": "special",
                    "title": "Special",
                    "meals": [
                        {"slug": "hawaiian", "title": "Hawaiian", "price": 540, "weight": "500 g"}
                    ]
                }
            ]
        },
        {
            "slug": "rolls",
            "title": "Rolls",
            "sub_sections": [
                {
                    "slug": "baked",
                    "title": "Baked",
                    "meals": [
                        {"slug": "baked-salmon", "title": "Baked Salmon", "price": 380, "weight": "8 pcs"},
                        {"slug": "philadelphia", "title": "Ролл Филадельфия", "price": 420, "weight": "8 шт"}
                    ]
                }
            ]
        }
    ]
}"#;

/// Application over a fresh in-memory SQLite database with a small catalog
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8000,
            "test".into(),
        );
        config.site_url = format!("http://{}", HOST);
        config.payment_merchant_id = "merchant@pizza.test".into();
        config.payment_webhook_secret = Some(WEBHOOK_SECRET.into());
        adjust(&mut config);

        let db = establish_connection_with_config(&DbConfig::single_connection(
            config.database_url.clone(),
        ))
        .await
        .expect("connect to in-memory sqlite");
        run_migrations(&db).await.expect("migrate");
        let states = seed_states(&db).await.expect("seed states");

        let catalog: CatalogFile = serde_json::from_str(CATALOG).expect("catalog json");
        import_catalog(&db, &catalog).await.expect("import catalog");

        let state = AppState::new(db, config, states);
        Self {
            router: app_router(state.clone()),
            state,
        }
    }

    /// A cookie-keeping client, like one browser tab
    pub fn browser(&self) -> Browser {
        Browser {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Sends a payment confirmation, signed with `secret` when given
    pub async fn payment_callback(&self, cart_id: i32, secret: Option<&str>) -> Response {
        let body = format!("invoice={}&payment_status=Completed", cart_id);
        self.payment_callback_with_body(cart_id, &body, secret).await
    }

    /// Posts `body` to the callback of `cart_id`, signed with `secret` when given
    pub async fn payment_callback_with_body(
        &self,
        cart_id: i32,
        body: &str,
        secret: Option<&str>,
    ) -> Response {
        let body = body.to_string();
        let mut request = Request::builder()
            .method(Method::POST)
            .uri(format!("/payment/success/{}/", cart_id))
            .header(header::HOST, HOST)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");

        if let Some(secret) = secret {
            let ts = Utc::now().timestamp();
            request = request
                .header(TIMESTAMP_HEADER, ts.to_string())
                .header(SIGNATURE_HEADER, sign(secret, ts, body.as_bytes()));
        }

        self.router
            .clone()
            .oneshot(request.body(Body::from(body)).expect("request"))
            .await
            .expect("router is infallible")
    }
}

pub struct Browser {
    router: Router,
    cookie: Option<String>,
}

impl Browser {
    pub fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    pub fn session_cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    async fn send(&mut self, request: axum::http::request::Builder, body: Body) -> Response {
        let mut request = request.header(header::HOST, HOST);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie.as_str());
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).expect("request"))
            .await
            .expect("router is infallible");

        for value in response.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().unwrap_or_default();
            let pair = raw.split(';').next().unwrap_or_default().trim();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            if name != "sessionid" {
                continue;
            }
            let expired = raw.to_ascii_lowercase().contains("max-age=0") || value.is_empty();
            self.cookie = if expired {
                None
            } else {
                Some(pair.to_string())
            };
        }
        response
    }

    pub async fn get(&mut self, path: &str) -> Response {
        self.send(Request::builder().method(Method::GET).uri(path), Body::empty())
            .await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> Response {
        let body = encode_form(fields);
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(path)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body),
        )
        .await
    }

    /// POST /handler/ as the page scripts do
    pub async fn ajax(&mut self, fields: &[(&str, &str)]) -> Response {
        let body = encode_form(fields);
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri("/handler/")
                .header("x-requested-with", "XMLHttpRequest")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body),
        )
        .await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> Response {
        self.post_form(
            "/accounts/register/",
            &[
                ("username", username),
                ("email", "someone@pizza.test"),
                ("password", password),
                ("password2", password),
                ("phone", ""),
            ],
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Response {
        self.post_form(
            "/accounts/login/",
            &[("username", username), ("password", password)],
        )
        .await
    }
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub fn assert_redirect(response: &Response, to: &str) {
    assert!(
        response.status().is_redirection(),
        "expected redirect to {to}, got {}",
        response.status()
    );
    assert_eq!(location(response), to);
}

pub fn assert_ok(response: &Response) {
    assert_eq!(response.status(), StatusCode::OK);
}
