//! Server-side HTML rendering.
//!
//! Pages are assembled with `format!` around a shared [`layout`]. Every value
//! that originates from the database or the request goes through [`escape`].

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod pagination;
pub mod payment;

use axum::http::StatusCode;

use crate::{
    entities::section,
    services::cart::{CartLine, CartSummary},
};

pub const SITE_TITLE: &str = "Pizza House";

/// Per-request chrome shown around every page
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub username: Option<String>,
    pub cart: CartSummary,
    pub cart_lines: Vec<CartLine>,
    pub sections: Vec<section::Model>,
}

/// Head metadata for a page
#[derive(Debug, Clone, Default)]
pub struct Meta<'a> {
    pub title: &'a str,
    pub keywords: &'a str,
    pub description: &'a str,
}

impl<'a> Meta<'a> {
    pub fn titled(title: &'a str) -> Self {
        Self {
            title,
            ..Default::default()
        }
    }
}

/// Escapes text for use in HTML bodies and double-quoted attributes
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Whole currency units with the rouble sign
pub fn format_price(amount: i64) -> String {
    format!("{} &#8381;", amount)
}

/// Percent-encodes a value for a query string
pub fn encode_query(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn nav(ctx: &PageContext) -> String {
    let items: String = ctx
        .sections
        .iter()
        .map(|s| {
            format!(
                r#"<li><a href="/{}/">{}</a></li>"#,
                escape(&s.slug),
                escape(&s.title)
            )
        })
        .collect();

    let account = match &ctx.username {
        Some(name) => format!(
            r#"<a href="/accounts/profile/">{}</a> | <a href="/accounts/logout/">Выйти</a>"#,
            escape(name)
        ),
        None => r#"<a href="/accounts/login/">Войти</a> | <a href="/accounts/register/">Регистрация</a>"#
            .to_string(),
    };

    format!(
        r#"<nav><ul class="sections">{items}</ul><div class="account">{account}</div>{cart}</nav>"#,
        items = items,
        account = account,
        cart = cart::thumb(&ctx.cart, &ctx.cart_lines),
    )
}

/// Wraps page content in the site layout
pub fn layout(meta: &Meta<'_>, ctx: &PageContext, content: &str) -> String {
    let title = if meta.title.is_empty() {
        SITE_TITLE.to_string()
    } else {
        format!("{} | {}", escape(meta.title), SITE_TITLE)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head>
<meta charset="utf-8">
<title>{title}</title>
<meta name="keywords" content="{keywords}">
<meta name="description" content="{description}">
<link rel="stylesheet" href="/static/css/main.css">
<script src="/static/js/cart.js"></script>
</head>
<body>
<header><a class="logo" href="/">{site}</a>{nav}</header>
<main>
{content}
</main>
<footer><a href="/about/">О нас</a></footer>
</body>
</html>
"#,
        title = title,
        keywords = escape(meta.keywords),
        description = escape(meta.description),
        site = SITE_TITLE,
        nav = nav(ctx),
        content = content,
    )
}

/// Standalone error page; rendered without per-request chrome
pub fn error_page(status: StatusCode, message: &str, request_id: Option<String>) -> String {
    let reference = request_id
        .map(|id| format!(r#"<p class="request-id">Request ID: {}</p>"#, escape(&id)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head><meta charset="utf-8"><title>{code} | {site}</title></head>
<body>
<h1>{code}</h1>
<p>{message}</p>
{reference}
<p><a href="/">На главную</a></p>
</body>
</html>
"#,
        code = status.as_u16(),
        site = SITE_TITLE,
        message = escape(message),
        reference = reference,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_and_quotes() {
        assert_eq!(
            escape(r#"<a href="x">'Tom' & Jerry</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;Tom&#x27; &amp; Jerry&lt;/a&gt;"
        );
        assert_eq!(escape("Маргарита"), "Маргарита");
    }

    #[test]
    fn layout_escapes_username_and_titles() {
        let ctx = PageContext {
            username: Some("<script>".into()),
            ..Default::default()
        };
        let html = layout(&Meta::titled("A & B"), &ctx, "<p>body</p>");
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<title>A &amp; B | Pizza House</title>"));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn anonymous_layout_offers_login() {
        let html = layout(&Meta::default(), &PageContext::default(), "");
        assert!(html.contains(r#"href="/accounts/login/""#));
        assert!(!html.contains("/accounts/logout/"));
    }

    #[test]
    fn encode_query_escapes_reserved_characters() {
        assert_eq!(encode_query("/a b?c=d&e"), "%2Fa+b%3Fc%3Dd%26e");
    }
}
