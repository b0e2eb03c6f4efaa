//! Page-number window for catalog listings.
//!
//! Short listings show every page. Longer ones show a small window around the
//! current page plus the first two and last two pages as jump targets.

use super::escape;

const LEADING_PAGE_RANGE_DISPLAYED: u64 = 2;
const TRAILING_PAGE_RANGE_DISPLAYED: u64 = 2;
const LEADING_PAGE_RANGE: u64 = 2;
const TRAILING_PAGE_RANGE: u64 = 2;
const NUM_PAGES_OUTSIDE_RANGE: u64 = 2;
const ADJACENT_PAGES: u64 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: u64,
    pub page: u64,
    pub previous: u64,
    pub next: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub page_range: Vec<u64>,
    pub in_leading_range: bool,
    pub in_trailing_range: bool,
    /// Jump targets at the start of the list (ascending)
    pub head: Vec<u64>,
    /// Jump targets at the end of the list (ascending)
    pub tail: Vec<u64>,
}

impl PageWindow {
    /// `page` must already be clamped into `1..=pages`
    pub fn new(page: u64, pages: u64) -> Self {
        let pages = pages.max(1);
        let page = page.clamp(1, pages);

        let mut in_leading_range = false;
        let mut in_trailing_range = false;
        let mut head = Vec::new();
        let mut tail = Vec::new();

        let page_range: Vec<u64> =
            if pages <= LEADING_PAGE_RANGE_DISPLAYED + NUM_PAGES_OUTSIDE_RANGE + 1 {
                in_leading_range = true;
                in_trailing_range = true;
                (1..=pages).collect()
            } else if page <= LEADING_PAGE_RANGE {
                in_leading_range = true;
                tail = last_pages(pages);
                (1..=LEADING_PAGE_RANGE_DISPLAYED).collect()
            } else if page > pages - TRAILING_PAGE_RANGE {
                in_trailing_range = true;
                head = first_pages();
                (pages - TRAILING_PAGE_RANGE_DISPLAYED + 1..=pages).collect()
            } else {
                head = first_pages();
                tail = last_pages(pages);
                let low = page.saturating_sub(ADJACENT_PAGES).max(1);
                let high = (page + ADJACENT_PAGES).min(pages);
                (low..=high).collect()
            };

        let has_previous = page > 1;
        let has_next = page < pages;

        Self {
            pages,
            page,
            previous: if has_previous { page - 1 } else { page },
            next: if has_next { page + 1 } else { page },
            has_previous,
            has_next,
            page_range,
            in_leading_range,
            in_trailing_range,
            head,
            tail,
        }
    }
}

fn first_pages() -> Vec<u64> {
    (1..=NUM_PAGES_OUTSIDE_RANGE).collect()
}

fn last_pages(pages: u64) -> Vec<u64> {
    (pages + 1 - NUM_PAGES_OUTSIDE_RANGE..=pages).collect()
}

/// Renders the pager. `base` is the listing path without query string.
pub fn render(window: &PageWindow, base: &str) -> String {
    if window.pages <= 1 {
        return String::new();
    }

    let base = escape(base);
    let link = |n: u64, label: &str| format!(r#"<li><a href="{}?page={}">{}</a></li>"#, base, n, label);

    let mut html = String::from(r#"<ul class="pagination">"#);
    if window.has_previous {
        html.push_str(&link(window.previous, "&laquo;"));
    }
    for n in window.head.iter().filter(|n| !window.page_range.contains(n)) {
        html.push_str(&link(*n, &n.to_string()));
    }
    if !window.head.is_empty() {
        html.push_str(r#"<li class="gap">&hellip;</li>"#);
    }
    for &n in &window.page_range {
        if n == window.page {
            html.push_str(&format!(r#"<li class="active"><span>{}</span></li>"#, n));
        } else {
            html.push_str(&link(n, &n.to_string()));
        }
    }
    if !window.tail.is_empty() {
        html.push_str(r#"<li class="gap">&hellip;</li>"#);
    }
    for n in window.tail.iter().filter(|n| !window.page_range.contains(n)) {
        html.push_str(&link(*n, &n.to_string()));
    }
    if window.has_next {
        html.push_str(&link(window.next, "&raquo;"));
    }
    html.push_str("</ul>");
    html
}
