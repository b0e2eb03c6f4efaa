//! Open-redirect protection for the `next` parameter.

use url::Url;

/// Whether `target` may be used as a post-login redirect.
///
/// Relative paths are allowed. Absolute and scheme-relative URLs are allowed
/// only for `http`/`https` pointing at `host` (the request's `Host` header,
/// port included).
pub fn is_safe_redirect(target: &str, host: Option<&str>) -> bool {
    let target = target.trim();
    if target.is_empty() || target.chars().any(char::is_control) {
        return false;
    }

    // Browsers treat backslashes like forward slashes
    let target = target.replace('\\', "/");
    if target.starts_with("///") {
        return false;
    }

    if let Some(rest) = target.strip_prefix("//") {
        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        return host.is_some_and(|h| !authority.is_empty() && authority.eq_ignore_ascii_case(h));
    }

    match Url::parse(&target) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && host.is_some_and(|h| authority_of(&url).eq_ignore_ascii_case(h))
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            target.starts_with('/') || !target.contains(':')
        }
        Err(_) => false,
    }
}

/// `next` when it is safe, `fallback` otherwise
pub fn safe_next<'a>(next: Option<&'a str>, host: Option<&str>, fallback: &'a str) -> &'a str {
    match next {
        Some(next) if is_safe_redirect(next, host) => next.trim(),
        _ => fallback,
    }
}

fn authority_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/accounts/profile/")]
    #[case("/moscow/pizza/?page=2")]
    #[case("profile/")]
    #[case("http://pizza.test/accounts/")]
    #[case("https://PIZZA.test/")]
    #[case("//pizza.test/about/")]
    fn allows_same_host(#[case] target: &str) {
        assert!(is_safe_redirect(target, Some("pizza.test")), "{target}");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("https://evil.test/")]
    #[case("//evil.test/")]
    #[case("///evil.test/")]
    #[case("/\\evil.test/")]
    #[case("\\\\evil.test")]
    #[case("javascript:alert(1)")]
    #[case("ftp://pizza.test/")]
    #[case("http://pizza.test:8080/")]
    #[case("/foo\n/bar")]
    fn rejects_foreign_or_unsafe(#[case] target: &str) {
        assert!(!is_safe_redirect(target, Some("pizza.test")), "{target:?}");
    }

    #[test]
    fn absolute_urls_need_a_known_host() {
        assert!(!is_safe_redirect("http://pizza.test/", None));
        assert!(is_safe_redirect("/fine/", None));
    }

    #[test]
    fn port_is_part_of_the_host() {
        assert!(is_safe_redirect("http://localhost:8000/x", Some("localhost:8000")));
    }

    #[test]
    fn safe_next_falls_back() {
        assert_eq!(safe_next(Some("https://evil.test/"), Some("pizza.test"), "/"), "/");
        assert_eq!(safe_next(None, Some("pizza.test"), "/"), "/");
        assert_eq!(safe_next(Some("/about/"), Some("pizza.test"), "/"), "/about/");
    }
}
