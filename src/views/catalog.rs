use super::{escape, format_price, layout, pagination, Meta, PageContext};
use crate::{
    entities::{section, sub_section},
    services::catalog::{MealCard, MealDetail, Page},
};

pub const MEDIA_URL: &str = "/media/";

pub fn media_url(path: &str) -> String {
    format!("{}{}", MEDIA_URL, escape(path.trim_start_matches('/')))
}

/// Tile used by every meal listing
pub fn meal_tile(card: &MealCard) -> String {
    let image = card
        .image
        .as_deref()
        .map(|path| {
            format!(
                r#"<img src="{}" alt="{}">"#,
                media_url(path),
                escape(&card.meal.title)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="meal" data-meal="{slug}"><a href="{url}">{image}<h3>{title}</h3></a><p class="weight">{weight}</p><p class="price">{price}</p><button class="add" data-meal="{slug}">В корзину</button></div>"#,
        slug = escape(&card.meal.slug),
        url = escape(&card.url()),
        image = image,
        title = escape(&card.meal.title),
        weight = escape(&card.meal.weight),
        price = format_price(i64::from(card.meal.price)),
    )
}

fn tiles(cards: &[MealCard]) -> String {
    let tiles: String = cards.iter().map(meal_tile).collect();
    format!(r#"<div class="meals">{}</div>"#, tiles)
}

fn paged(page: &Page<MealCard>, base: &str) -> String {
    let window = pagination::PageWindow::new(page.number, page.num_pages);
    format!("{}{}", tiles(&page.items), pagination::render(&window, base))
}

pub fn index(ctx: &PageContext, meals: &[MealCard]) -> String {
    let content = format!(
        r#"<section class="index"><div class="search"><input id="search" type="search" placeholder="Поиск"><div id="search-output"></div></div>{}</section>"#,
        tiles(meals)
    );
    layout(&Meta::titled("Главная"), ctx, &content)
}

pub fn section_page(
    ctx: &PageContext,
    section: &section::Model,
    sub_sections: &[sub_section::Model],
    page: &Page<MealCard>,
) -> String {
    let subs: String = sub_sections
        .iter()
        .map(|s| {
            format!(
                r#"<li><a href="/{}/{}/">{}</a></li>"#,
                escape(&section.slug),
                escape(&s.slug),
                escape(&s.title)
            )
        })
        .collect();

    let content = format!(
        r#"<h1>{title}</h1><ul class="sub-sections">{subs}</ul><div class="description">{description}</div>{meals}"#,
        title = escape(&section.title),
        subs = subs,
        description = escape(&section.description),
        meals = paged(page, &format!("/{}/", section.slug)),
    );

    let meta = Meta {
        title: &section.title,
        keywords: &section.keywords,
        description: &section.description,
    };
    layout(&meta, ctx, &content)
}

pub fn sub_section_page(
    ctx: &PageContext,
    section: &section::Model,
    sub_section: &sub_section::Model,
    page: &Page<MealCard>,
) -> String {
    let content = format!(
        r#"<nav class="crumbs"><a href="/{section_slug}/">{section}</a> / <span>{title}</span></nav><h1>{title}</h1><div class="description">{description}</div>{meals}"#,
        section_slug = escape(&section.slug),
        section = escape(&section.title),
        title = escape(&sub_section.title),
        description = escape(&sub_section.description),
        meals = paged(page, &format!("/{}/{}/", section.slug, sub_section.slug)),
    );

    let title = format!("{}{}", section.title, sub_section.title);
    let meta = Meta {
        title: &title,
        keywords: &sub_section.keywords,
        description: &sub_section.description,
    };
    layout(&meta, ctx, &content)
}

pub fn meal_page(
    ctx: &PageContext,
    detail: &MealDetail,
    in_cart: i32,
    others: &[MealCard],
) -> String {
    let meal = &detail.card.meal;

    let gallery: String = detail
        .images
        .iter()
        .map(|img| {
            format!(
                r#"<img src="{}" alt="{}">"#,
                media_url(&img.image),
                escape(img.description.as_deref().unwrap_or(&meal.title))
            )
        })
        .collect();

    let ingredients = if detail.ingredients.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p class="ingredients">Состав: {}</p>"#,
            escape(&detail.ingredients)
        )
    };

    let infos: String = detail
        .infos
        .iter()
        .map(|(name, value)| {
            format!(
                "<tr><th>{}</th><td>{}</td></tr>",
                escape(name),
                escape(value)
            )
        })
        .collect();

    let content = format!(
        r#"<nav class="crumbs"><a href="/{section_slug}/">{section}</a> / <a href="/{section_slug}/{sub_slug}/">{sub}</a></nav>
<article class="meal-detail" data-meal="{slug}">
<h1>{title}</h1>
<div class="gallery">{gallery}</div>
<p class="weight">{weight}</p>
<p class="price">{price}</p>
{ingredients}
<table class="infos">{infos}</table>
<div class="description">{description}</div>
<p class="in-cart">В корзине: <input class="amount" type="number" name="amount" data-meal="{slug}" value="{in_cart}"></p>
<button class="add" data-meal="{slug}">В корзину</button>
</article>
<h2>Другие блюда</h2>{others}"#,
        section_slug = escape(&detail.section.slug),
        section = escape(&detail.section.title),
        sub_slug = escape(&detail.sub_section.slug),
        sub = escape(&detail.sub_section.title),
        slug = escape(&meal.slug),
        title = escape(&meal.title),
        gallery = gallery,
        weight = escape(&meal.weight),
        price = format_price(i64::from(meal.price)),
        ingredients = ingredients,
        infos = infos,
        description = escape(&meal.description),
        in_cart = in_cart,
        others = tiles(others),
    );

    let meta = Meta {
        title: &meal.title,
        keywords: &meal.keywords,
        description: &meal.description,
    };
    layout(&meta, ctx, &content)
}

pub fn about(ctx: &PageContext) -> String {
    let content = r#"<h1>Информация</h1>
<p>Pizza House готовит пиццу, роллы и горячие блюда и доставляет их по городу.</p>
<p>Заказ можно оформить на сайте после регистрации. Оплата принимается онлайн.</p>"#;
    layout(&Meta::titled("Информация"), ctx, content)
}
