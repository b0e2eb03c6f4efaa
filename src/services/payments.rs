//! Payment provider handoff and callback verification.
//!
//! The storefront never sees card data. It renders a form that posts the
//! order to the provider, and the provider later calls back with a signed
//! confirmation. Callbacks carry `x-timestamp` and `x-signature` headers; the
//! signature is hex HMAC-SHA256 over `"<timestamp>.<body>"`.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{config::AppConfig, services::orders::OrderView};

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Hidden fields of the provider form, in submission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentForm {
    pub action: String,
    pub fields: Vec<(&'static str, String)>,
}

impl PaymentForm {
    pub fn for_order(order: &OrderView, config: &AppConfig, username: &str) -> Self {
        let site = config.site_base();
        let id = order.cart.id;
        Self {
            action: config.payment_gateway_url.clone(),
            fields: vec![
                ("business", config.payment_merchant_id.clone()),
                ("amount", order.summary.total.to_string()),
                ("currency_code", config.payment_currency.clone()),
                ("item_name", "products".to_string()),
                ("invoice", id.to_string()),
                ("notify_url", format!("{}/payment/success/{}/", site, id)),
                ("return", format!("{}/accounts/", site)),
                ("cancel_return", format!("{}/payment/cart/{}/", site, id)),
                ("custom", username.to_string()),
            ],
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Why a callback was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    MissingHeaders,
    BadTimestamp,
    Expired,
    Mismatch,
}

/// The order-binding fields of a callback body. Only trusted once the
/// signature over the body has been verified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentNotice {
    pub invoice: Option<String>,
    pub amount: Option<String>,
}

/// Why a signed notice does not apply to the order it was posted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeError {
    InvoiceMismatch,
    BadAmount,
}

impl PaymentNotice {
    pub fn parse(body: &[u8]) -> Self {
        let mut notice = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "invoice" => notice.invoice = Some(value.into_owned()),
                "amount" => notice.amount = Some(value.into_owned()),
                _ => {}
            }
        }
        notice
    }

    /// The notice must name `cart_id` as its invoice. Returns the paid amount
    /// in whole units when the notice states one.
    pub fn verify(&self, cart_id: i32) -> Result<Option<i64>, NoticeError> {
        let invoice = self
            .invoice
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i32>().ok());
        if invoice != Some(cart_id) {
            return Err(NoticeError::InvoiceMismatch);
        }

        match self.amount.as_deref() {
            None => Ok(None),
            Some(raw) => parse_whole_amount(raw).map(Some).ok_or(NoticeError::BadAmount),
        }
    }
}

/// `"1040"` or `"1040.00"`; fractional units are not sold
fn parse_whole_amount(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let whole = match raw.split_once('.') {
        Some((whole, fraction)) if fraction.bytes().all(|b| b == b'0') => whole,
        Some(_) => return None,
        None => raw,
    };
    whole.parse().ok()
}

/// Hex signature for a callback body
pub fn sign(secret: &str, timestamp: i64, body: &[u8]) -> String {
    hex::encode(mac_for(secret, timestamp, body).finalize().into_bytes())
}

/// Checks the callback headers against `body`. `now` is unix seconds.
pub fn verify_signature(
    headers: &HeaderMap,
    body: &[u8],
    secret: &str,
    tolerance_secs: u64,
    now: i64,
) -> Result<(), SignatureError> {
    let (Some(ts), Some(sig)) = (
        headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok()),
        headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()),
    ) else {
        return Err(SignatureError::MissingHeaders);
    };

    let timestamp: i64 = ts.trim().parse().map_err(|_| SignatureError::BadTimestamp)?;
    if now.abs_diff(timestamp) > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    let expected = hex::decode(sig.trim()).map_err(|_| SignatureError::Mismatch)?;
    mac_for(secret, timestamp, body)
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

fn mac_for(secret: &str, timestamp: i64, body: &[u8]) -> HmacSha256 {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 takes keys of any size"),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    mac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::cart,
        models::OrderStatus,
        services::cart::CartSummary,
    };
    use axum::http::HeaderValue;
    use chrono::Utc;

    const SECRET: &str = "whsec_test";

    fn headers(ts: &str, sig: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(TIMESTAMP_HEADER, HeaderValue::from_str(ts).unwrap());
        h.insert(SIGNATURE_HEADER, HeaderValue::from_str(sig).unwrap());
        h
    }

    #[test]
    fn accepts_valid_signature() {
        let now = 1_700_000_000;
        let sig = sign(SECRET, now, b"status=paid");
        assert_eq!(
            verify_signature(&headers(&now.to_string(), &sig), b"status=paid", SECRET, 300, now),
            Ok(())
        );
    }

    #[test]
    fn rejects_tampered_body_and_wrong_secret() {
        let now = 1_700_000_000;
        let sig = sign(SECRET, now, b"status=paid");
        let h = headers(&now.to_string(), &sig);
        assert_eq!(
            verify_signature(&h, b"status=refunded", SECRET, 300, now),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify_signature(&h, b"status=paid", "other", 300, now),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_stale_and_malformed_requests() {
        let now = 1_700_000_000;
        let old = now - 301;
        let sig = sign(SECRET, old, b"");
        assert_eq!(
            verify_signature(&headers(&old.to_string(), &sig), b"", SECRET, 300, now),
            Err(SignatureError::Expired)
        );
        assert_eq!(
            verify_signature(&headers("yesterday", &sig), b"", SECRET, 300, now),
            Err(SignatureError::BadTimestamp)
        );
        assert_eq!(
            verify_signature(&headers(&now.to_string(), "zz"), b"", SECRET, 300, now),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify_signature(&HeaderMap::new(), b"", SECRET, 300, now),
            Err(SignatureError::MissingHeaders)
        );
    }

    #[test]
    fn form_carries_order_and_site_urls() {
        let mut config = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8000,
            "development".into(),
        );
        config.site_url = "https://pizza.example/".into();
        config.payment_merchant_id = "shop@pizza.example".into();

        let order = OrderView {
            cart: cart::Model {
                id: 42,
                token: "A".repeat(40),
                owner_id: Some(1),
                status_id: 2,
                archive: true,
                contact: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            status: OrderStatus::Unpaid,
            lines: Vec::new(),
            summary: CartSummary { count: 3, total: 1350 },
        };

        let form = PaymentForm::for_order(&order, &config, "ivan");
        assert_eq!(form.action, "https://www.paypal.com/cgi-bin/webscr");
        assert_eq!(form.field("business"), Some("shop@pizza.example"));
        assert_eq!(form.field("amount"), Some("1350"));
        assert_eq!(form.field("currency_code"), Some("RUB"));
        assert_eq!(form.field("item_name"), Some("products"));
        assert_eq!(form.field("invoice"), Some("42"));
        assert_eq!(
            form.field("notify_url"),
            Some("https://pizza.example/payment/success/42/")
        );
        assert_eq!(
            form.field("cancel_return"),
            Some("https://pizza.example/payment/cart/42/")
        );
        assert_eq!(form.field("custom"), Some("ivan"));
    }

    #[test]
    fn notice_must_name_the_cart_it_is_posted_for() {
        let notice = PaymentNotice::parse(b"invoice=1&payment_status=Completed");
        assert_eq!(notice.verify(1), Ok(None));
        assert_eq!(notice.verify(2), Err(NoticeError::InvoiceMismatch));
        assert_eq!(
            PaymentNotice::parse(b"payment_status=Completed").verify(1),
            Err(NoticeError::InvoiceMismatch)
        );
    }

    #[test]
    fn notice_amounts_are_whole_units() {
        let notice = |body: &[u8]| PaymentNotice::parse(body).verify(7);
        assert_eq!(notice(b"invoice=7&amount=1040"), Ok(Some(1040)));
        assert_eq!(notice(b"invoice=7&amount=1040.00"), Ok(Some(1040)));
        assert_eq!(notice(b"invoice=7&amount=1040.50"), Err(NoticeError::BadAmount));
        assert_eq!(notice(b"invoice=7&amount=lots"), Err(NoticeError::BadAmount));
    }
}
