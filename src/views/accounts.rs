//! Login, registration and order history pages.

use super::{escape, format_price, layout, Meta, PageContext};
use crate::{
    forms::{FormErrors, LoginForm, RegistrationForm, NON_FIELD},
    services::orders::OrderView,
};

fn field_errors(errors: &FormErrors, field: &str) -> String {
    let messages = errors.field(field);
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", escape(m)))
        .collect();
    format!(r#"<ul class="errorlist">{}</ul>"#, items)
}

fn input(kind: &str, name: &str, value: &str, placeholder: &str, errors: &FormErrors) -> String {
    format!(
        r#"<p>{errs}<input type="{kind}" name="{name}" value="{value}" placeholder="{placeholder}"></p>"#,
        errs = field_errors(errors, name),
        kind = kind,
        name = name,
        value = escape(value),
        placeholder = escape(placeholder),
    )
}

fn next_field(next: Option<&str>) -> String {
    next.map(|n| format!(r#"<input type="hidden" name="next" value="{}">"#, escape(n)))
        .unwrap_or_default()
}

pub fn login_page(ctx: &PageContext, form: &LoginForm, errors: &FormErrors) -> String {
    let content = format!(
        r#"<h1>Вход</h1>
<form method="post" action="/accounts/login/" class="login">
{all}{username}{password}{next}
<button type="submit">Войти</button>
</form>
<p><a href="/accounts/register/">Регистрация</a></p>"#,
        all = field_errors(errors, NON_FIELD),
        username = input("text", "username", &form.username, "Имя", errors),
        password = input("password", "password", "", "Пароль", errors),
        next = next_field(form.next.as_deref()),
    );
    layout(&Meta::titled("Вход"), ctx, &content)
}

pub fn register_page(ctx: &PageContext, form: &RegistrationForm, errors: &FormErrors) -> String {
    let content = format!(
        r#"<h1>Регистрация</h1>
<form method="post" action="/accounts/register/" class="register">
{all}{username}{email}{password}{password2}{phone}{next}
<button type="submit">Зарегистрироваться</button>
</form>"#,
        all = field_errors(errors, NON_FIELD),
        username = input("text", "username", &form.username, "Имя", errors),
        email = input("email", "email", &form.email, "E-mail", errors),
        password = input("password", "password", "", "Пароль", errors),
        password2 = input("password", "password2", "", "Повторите пароль", errors),
        phone = input("tel", "phone", &form.phone, "+7-(999)-999-9999", errors),
        next = next_field(form.next.as_deref()),
    );
    layout(&Meta::titled("Регистрация"), ctx, &content)
}

fn order(view: &OrderView) -> String {
    let lines: String = view
        .lines
        .iter()
        .map(|l| {
            format!(
                r#"<tr><td><a href="{}">{}</a></td><td>{}</td><td>{}</td></tr>"#,
                escape(&l.card.url()),
                escape(&l.card.meal.title),
                l.amount,
                format_price(l.sum())
            )
        })
        .collect();

    let pay = if view.is_payable() {
        format!(
            r#"<a class="pay" href="/payment/cart/{}/">Оплатить</a>"#,
            view.cart.id
        )
    } else {
        String::new()
    };

    format!(
        r#"<div class="order" id="order-{id}"><h3>Заказ №{id} от {date}</h3><p class="status" title="{details}">{status}</p><table>{lines}</table><p class="total">Итого: {total}</p>{pay}</div>"#,
        id = view.cart.id,
        date = view.cart.updated_at.format("%d.%m.%Y %H:%M"),
        details = escape(view.status.details()),
        status = escape(view.status.text()),
        lines = lines,
        total = format_price(view.summary.total),
        pay = pay,
    )
}

pub fn profile_page(ctx: &PageContext, orders: &[OrderView]) -> String {
    let body = if orders.is_empty() {
        "<p>Вы ещё ничего не заказывали.</p>".to_string()
    } else {
        orders.iter().map(order).collect()
    };
    let content = format!(r#"<h1>Ваши заказы</h1><div class="orders">{}</div>"#, body);
    layout(&Meta::titled("Ваш Профиль"), ctx, &content)
}
