use super::{escape, format_price, layout, Meta, PageContext};
use crate::services::{orders::OrderView, payments::PaymentForm};

/// Order summary plus the auto-submittable provider form
pub fn payment_page(ctx: &PageContext, order: &OrderView, form: &PaymentForm) -> String {
    let hidden: String = form
        .fields
        .iter()
        .map(|(name, value)| {
            format!(
                r#"<input type="hidden" name="{}" value="{}">"#,
                name,
                escape(value)
            )
        })
        .collect();

    let content = format!(
        r#"<h1>Оплата заказа №{id}</h1>
<p>Сумма к оплате: {total}</p>
<form action="{action}" method="post" class="payment">
{hidden}
<button type="submit">Перейти к оплате</button>
</form>"#,
        id = order.cart.id,
        total = format_price(order.summary.total),
        action = escape(&form.action),
        hidden = hidden,
    );
    layout(&Meta::titled("Оплата"), ctx, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::cart, models::OrderStatus, services::cart::CartSummary};
    use chrono::Utc;

    #[test]
    fn renders_hidden_fields_escaped() {
        let order = OrderView {
            cart: cart::Model {
                id: 5,
                token: "C".repeat(40),
                owner_id: Some(1),
                status_id: 2,
                archive: true,
                contact: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            status: OrderStatus::Unpaid,
            lines: Vec::new(),
            summary: CartSummary { count: 1, total: 700 },
        };
        let form = PaymentForm {
            action: "https://pay.example/checkout".into(),
            fields: vec![("custom", "a\"b".into()), ("invoice", "5".into())],
        };
        let html = payment_page(&PageContext::default(), &order, &form);
        assert!(html.contains(r#"action="https://pay.example/checkout""#));
        assert!(html.contains(r#"name="custom" value="a&quot;b""#));
        assert!(html.contains("700 &#8381;"));
    }
}
