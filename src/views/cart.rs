//! Cart widgets and the fragments returned to ajax calls.

use super::{catalog::meal_tile, escape, format_price};
use crate::services::{
    cart::{CartLine, CartSummary, LineUpdate},
    catalog::MealCard,
};

/// Header cart: totals, lines and the checkout link
pub fn thumb(summary: &CartSummary, lines: &[CartLine]) -> String {
    let items: String = lines
        .iter()
        .map(|l| line(&l.card, l.amount, l.sum()))
        .collect();

    let checkout = if lines.is_empty() {
        r#"<p class="cart-empty">Корзина пуста</p>"#.to_string()
    } else {
        r#"<a class="checkout" href="/accounts/order/">Оформить заказ</a>"#.to_string()
    };

    format!(
        r#"<div id="cart-thumb" data-count="{count}" data-total="{total}"><span class="cart-count">{count}</span> <span class="cart-total">{total_fmt}</span><ul class="cart-lines">{items}</ul>{checkout}</div>"#,
        count = summary.count,
        total = summary.total,
        total_fmt = format_price(summary.total),
        items = items,
        checkout = checkout,
    )
}

fn line(card: &MealCard, amount: i32, sum: i64) -> String {
    format!(
        r#"<li class="cart-meal" data-meal="{slug}"><a href="{url}">{title}</a> <input class="amount" type="number" name="amount" value="{amount}"> <span class="sum">{sum}</span> <button class="del" data-meal="{slug}">&times;</button></li>"#,
        slug = escape(&card.meal.slug),
        url = escape(&card.url()),
        title = escape(&card.meal.title),
        amount = amount,
        sum = format_price(sum),
    )
}

/// Answer to `add`/`set`: the updated line, with the new cart totals as
/// data attributes for the header
pub fn line_fragment(update: &LineUpdate) -> String {
    let sum = i64::from(update.amount) * i64::from(update.card.meal.price);
    format!(
        r#"<div class="cart-update" data-count="{count}" data-total="{total}">{line}</div>"#,
        count = update.summary.count,
        total = update.summary.total,
        line = line(&update.card, update.amount, sum),
    )
}

pub fn search_results(cards: &[MealCard]) -> String {
    if cards.is_empty() {
        return r#"<div class="search-output"><p>Ничего не найдено</p></div>"#.to_string();
    }
    let tiles: String = cards.iter().map(meal_tile).collect();
    format!(r#"<div class="search-output">{}</div>"#, tiles)
}
