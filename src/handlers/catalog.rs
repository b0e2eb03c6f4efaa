use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;

use super::{check_slug, page_context};
use crate::{
    auth::Visitor,
    errors::{ServiceError, ServiceResult},
    services::catalog::{PageRequest, INDEX_MEALS, SIMILAR_MEALS},
    views, AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

pub async fn index(State(state): State<AppState>, visitor: Visitor) -> ServiceResult<Html<String>> {
    let (ctx, _) = page_context(&state, &visitor).await?;
    let meals = state.catalog_service().random_meals(INDEX_MEALS).await?;
    Ok(Html(views::catalog::index(&ctx, &meals)))
}

pub async fn about(State(state): State<AppState>, visitor: Visitor) -> ServiceResult<Html<String>> {
    let (ctx, _) = page_context(&state, &visitor).await?;
    Ok(Html(views::catalog::about(&ctx)))
}

pub async fn section(
    State(state): State<AppState>,
    Path(section_slug): Path<String>,
    Query(query): Query<PageQuery>,
    visitor: Visitor,
) -> ServiceResult<Html<String>> {
    check_slug(&section_slug)?;
    let catalog = state.catalog_service();
    let section = catalog
        .section(&section_slug)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("section '{}'", section_slug)))?;

    let (ctx, _) = page_context(&state, &visitor).await?;
    let sub_sections = catalog.sub_sections(&section).await?;
    let page = catalog
        .section_meals(&section, PageRequest::parse(query.page.as_deref()))
        .await?;

    Ok(Html(views::catalog::section_page(
        &ctx,
        &section,
        &sub_sections,
        &page,
    )))
}

pub async fn sub_section(
    State(state): State<AppState>,
    Path((section_slug, sub_section_slug)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
    visitor: Visitor,
) -> ServiceResult<Html<String>> {
    check_slug(&section_slug)?;
    check_slug(&sub_section_slug)?;
    let catalog = state.catalog_service();

    let not_found = || {
        ServiceError::not_found(format!(
            "sub-section '{}/{}'",
            section_slug, sub_section_slug
        ))
    };
    let section = catalog.section(&section_slug).await?.ok_or_else(not_found)?;
    let sub_section = catalog
        .sub_section(&section_slug, &sub_section_slug)
        .await?
        .ok_or_else(not_found)?;

    let (ctx, _) = page_context(&state, &visitor).await?;
    let page = catalog
        .sub_section_meals(&sub_section, PageRequest::parse(query.page.as_deref()))
        .await?;

    Ok(Html(views::catalog::sub_section_page(
        &ctx,
        &section,
        &sub_section,
        &page,
    )))
}

pub async fn meal(
    State(state): State<AppState>,
    Path((section_slug, sub_section_slug, meal_slug)): Path<(String, String, String)>,
    visitor: Visitor,
) -> ServiceResult<Html<String>> {
    for slug in [&section_slug, &sub_section_slug, &meal_slug] {
        check_slug(slug)?;
    }
    let catalog = state.catalog_service();
    let detail = catalog
        .meal_detail(&section_slug, &sub_section_slug, &meal_slug)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("meal '{}'", meal_slug)))?;

    let (ctx, cart) = page_context(&state, &visitor).await?;
    let in_cart = state.cart_service().amount_of(cart.id, &meal_slug).await?;
    let others = catalog.other_meals(&meal_slug, SIMILAR_MEALS).await?;

    Ok(Html(views::catalog::meal_page(&ctx, &detail, in_cart, &others)))
}
