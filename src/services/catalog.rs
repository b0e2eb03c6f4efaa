use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    sea_query::Expr,
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::{debug, instrument};

use crate::{
    entities::{ingredient, info_type, meal, meal_image, meal_info, section, sub_section},
    errors::ServiceError,
};

/// Meals on the landing page
pub const INDEX_MEALS: u64 = 9;
/// "You may also like" meals on a meal page
pub const SIMILAR_MEALS: u64 = 3;

/// A meal together with what is needed to link to and picture it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealCard {
    pub meal: meal::Model,
    pub section_slug: String,
    pub image: Option<String>,
}

impl MealCard {
    pub fn url(&self) -> String {
        format!(
            "/{}/{}/{}/",
            self.section_slug, self.meal.sub_section_slug, self.meal.slug
        )
    }
}

#[derive(Debug, Clone)]
pub struct MealDetail {
    pub card: MealCard,
    pub section: section::Model,
    pub sub_section: sub_section::Model,
    pub images: Vec<meal_image::Model>,
    /// Comma-separated ingredient titles, empty when there are none
    pub ingredients: String,
    /// (info type name, value)
    pub infos: Vec<(String, String)>,
}

/// One page of a listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based
    pub number: u64,
    /// Always at least 1
    pub num_pages: u64,
}

/// A `?page=` value as sent by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// Missing or not an integer
    First,
    Number(i64),
}

impl PageRequest {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
            Some(n) => PageRequest::Number(n),
            None => PageRequest::First,
        }
    }

    /// Out-of-range numbers (including zero and negatives) land on the last page
    pub fn resolve(self, num_pages: u64) -> u64 {
        let num_pages = num_pages.max(1);
        match self {
            PageRequest::First => 1,
            PageRequest::Number(n) if n >= 1 && (n as u64) <= num_pages => n as u64,
            PageRequest::Number(_) => num_pages,
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    page_size: u64,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, page_size: u64) -> Self {
        Self {
            db,
            page_size: page_size.max(1),
        }
    }

    #[instrument(skip(self))]
    pub async fn sections(&self) -> Result<Vec<section::Model>, ServiceError> {
        Ok(section::Entity::find()
            .order_by_asc(section::Column::Title)
            .all(&*self.db)
            .await?)
    }

    pub async fn section(&self, slug: &str) -> Result<Option<section::Model>, ServiceError> {
        Ok(section::Entity::find_by_id(slug.to_string())
            .one(&*self.db)
            .await?)
    }

    pub async fn sub_sections(
        &self,
        section: &section::Model,
    ) -> Result<Vec<sub_section::Model>, ServiceError> {
        Ok(section
            .find_related(sub_section::Entity)
            .order_by_asc(sub_section::Column::Title)
            .all(&*self.db)
            .await?)
    }

    /// The subsection, only if it hangs under `section_slug`
    pub async fn sub_section(
        &self,
        section_slug: &str,
        slug: &str,
    ) -> Result<Option<sub_section::Model>, ServiceError> {
        Ok(sub_section::Entity::find_by_id(slug.to_string())
            .filter(sub_section::Column::SectionSlug.eq(section_slug))
            .one(&*self.db)
            .await?)
    }

    /// Meals of every subsection of a section, newest first
    #[instrument(skip(self, section), fields(section = %section.slug))]
    pub async fn section_meals(
        &self,
        section: &section::Model,
        page: PageRequest,
    ) -> Result<Page<MealCard>, ServiceError> {
        let sub_slugs: Vec<String> = sub_section::Entity::find()
            .filter(sub_section::Column::SectionSlug.eq(section.slug.as_str()))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|s| s.slug)
            .collect();

        let query = meal::Entity::find()
            .filter(meal::Column::SubSectionSlug.is_in(sub_slugs))
            .order_by_desc(meal::Column::AddedAt)
            .order_by_asc(meal::Column::Slug);
        self.paginate(query, page).await
    }

    #[instrument(skip(self, sub_section), fields(sub_section = %sub_section.slug))]
    pub async fn sub_section_meals(
        &self,
        sub_section: &sub_section::Model,
        page: PageRequest,
    ) -> Result<Page<MealCard>, ServiceError> {
        let query = meal::Entity::find()
            .filter(meal::Column::SubSectionSlug.eq(sub_section.slug.as_str()))
            .order_by_desc(meal::Column::AddedAt)
            .order_by_asc(meal::Column::Slug);
        self.paginate(query, page).await
    }

    async fn paginate(
        &self,
        query: sea_orm::Select<meal::Entity>,
        page: PageRequest,
    ) -> Result<Page<MealCard>, ServiceError> {
        let paginator = query.paginate(&*self.db, self.page_size);
        let num_pages = paginator.num_pages().await?.max(1);
        let number = page.resolve(num_pages);
        let meals = paginator.fetch_page(number - 1).await?;
        debug!(number, num_pages, count = meals.len(), "fetched meal page");

        Ok(Page {
            items: cards(&*self.db, meals).await?,
            number,
            num_pages,
        })
    }

    /// Random meals for the landing page
    pub async fn random_meals(&self, limit: u64) -> Result<Vec<MealCard>, ServiceError> {
        let meals = meal::Entity::find()
            .order_by(Expr::cust("RANDOM()"), Order::Asc)
            .limit(limit)
            .all(&*self.db)
            .await?;
        cards(&*self.db, meals).await
    }

    /// The meal, only if it sits under the given section and subsection
    #[instrument(skip(self))]
    pub async fn meal_detail(
        &self,
        section_slug: &str,
        sub_section_slug: &str,
        meal_slug: &str,
    ) -> Result<Option<MealDetail>, ServiceError> {
        let db = &*self.db;

        let Some(sub_section) = self.sub_section(section_slug, sub_section_slug).await? else {
            return Ok(None);
        };
        let Some(meal) = meal::Entity::find_by_id(meal_slug.to_string())
            .filter(meal::Column::SubSectionSlug.eq(sub_section.slug.as_str()))
            .one(db)
            .await?
        else {
            return Ok(None);
        };
        let section = section::Entity::find_by_id(section_slug.to_string())
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("section {}", section_slug)))?;

        let images = meal
            .find_related(meal_image::Entity)
            .order_by_asc(meal_image::Column::Id)
            .all(db)
            .await?;

        let ingredients = meal
            .find_related(ingredient::Entity)
            .order_by_asc(ingredient::Column::Title)
            .all(db)
            .await?
            .into_iter()
            .map(|i| i.title)
            .collect::<Vec<_>>()
            .join(", ");

        let infos = meal_info::Entity::find()
            .filter(meal_info::Column::MealSlug.eq(meal.slug.as_str()))
            .find_also_related(info_type::Entity)
            .order_by_asc(meal_info::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|(info, kind)| (kind.map(|k| k.name).unwrap_or_default(), info.value))
            .collect();

        let card = MealCard {
            image: images.first().map(|i| i.image.clone()),
            section_slug: section.slug.clone(),
            meal,
        };

        Ok(Some(MealDetail {
            card,
            section,
            sub_section,
            images,
            ingredients,
            infos,
        }))
    }

    /// Random meals other than `exclude_slug`
    pub async fn other_meals(
        &self,
        exclude_slug: &str,
        limit: u64,
    ) -> Result<Vec<MealCard>, ServiceError> {
        let meals = meal::Entity::find()
            .filter(meal::Column::Slug.ne(exclude_slug))
            .order_by(Expr::cust("RANDOM()"), Order::Asc)
            .limit(limit)
            .all(&*self.db)
            .await?;
        cards(&*self.db, meals).await
    }

    /// Meals whose title contains any whitespace-separated term, ignoring case.
    /// An empty query matches nothing.
    #[instrument(skip(self))]
    pub async fn search(&self, text: &str) -> Result<Vec<MealCard>, ServiceError> {
        let terms = search_terms(text);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // SQL LOWER folds only ASCII on SQLite, so titles are folded here
        let meals: Vec<meal::Model> = meal::Entity::find()
            .order_by_asc(meal::Column::Title)
            .all(&*self.db)
            .await?
            .into_iter()
            .filter(|meal| title_matches(&meal.title, &terms))
            .collect();
        debug!(terms = terms.len(), found = meals.len(), "meal search");
        cards(&*self.db, meals).await
    }
}

/// Lower-cased, whitespace-separated terms
pub fn search_terms(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// True when the lower-cased title contains any of the (lower-cased) terms
pub fn title_matches(title: &str, terms: &[String]) -> bool {
    let title = title.to_lowercase();
    terms.iter().any(|term| title.contains(term.as_str()))
}

/// Attaches section slugs and the first gallery image to each meal
pub(crate) async fn cards<C>(db: &C, meals: Vec<meal::Model>) -> Result<Vec<MealCard>, ServiceError>
where
    C: ConnectionTrait,
{
    if meals.is_empty() {
        return Ok(Vec::new());
    }

    let sub_slugs: Vec<&str> = meals.iter().map(|m| m.sub_section_slug.as_str()).collect();
    let sections: HashMap<String, String> = sub_section::Entity::find()
        .filter(sub_section::Column::Slug.is_in(sub_slugs))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.slug, s.section_slug))
        .collect();

    let meal_slugs: Vec<&str> = meals.iter().map(|m| m.slug.as_str()).collect();
    let mut images: HashMap<String, String> = HashMap::new();
    for image in meal_image::Entity::find()
        .filter(meal_image::Column::MealSlug.is_in(meal_slugs))
        .order_by_asc(meal_image::Column::Id)
        .all(db)
        .await?
    {
        images.entry(image.meal_slug).or_insert(image.image);
    }

    Ok(meals
        .into_iter()
        .map(|meal| MealCard {
            section_slug: sections
                .get(&meal.sub_section_slug)
                .cloned()
                .unwrap_or_default(),
            image: images.remove(&meal.slug),
            meal,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 5, 1)]
    #[case(Some("abc"), 5, 1)]
    #[case(Some("3"), 5, 3)]
    #[case(Some("9999"), 5, 5)]
    #[case(Some("0"), 5, 5)]
    #[case(Some("-2"), 5, 5)]
    #[case(Some("1"), 0, 1)]
    fn page_request_resolution(
        #[case] raw: Option<&str>,
        #[case] pages: u64,
        #[case] expected: u64,
    ) {
        assert_eq!(PageRequest::parse(raw).resolve(pages), expected);
    }

    #[test]
    fn search_terms_split_on_whitespace() {
        assert_eq!(
            search_terms("  Margherita \t Four\n"),
            vec!["margherita".to_string(), "four".to_string()]
        );
        assert!(search_terms("   ").is_empty());
    }

    #[rstest]
    #[case("Пицца Маргарита", "пицца", true)]
    #[case("Пицца Маргарита", "МАРГАРИТА", true)]
    #[case("Four Cheese", "four", true)]
    #[case("Four Cheese", "50%", false)]
    #[case("Pepperoni", "пицца", false)]
    fn titles_match_regardless_of_case(
        #[case] title: &str,
        #[case] query: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(title_matches(title, &search_terms(query)), expected);
    }

    #[test]
    fn card_url_nests_slugs() {
        let card = MealCard {
            meal: meal::Model {
                slug: "margherita".into(),
                sub_section_slug: "classic".into(),
                title: "Margherita".into(),
                price: 450,
                weight: "500 г".into(),
                description: String::new(),
                keywords: String::new(),
                added_at: chrono::Utc::now(),
            },
            section_slug: "pizza".into(),
            image: None,
        };
        assert_eq!(card.url(), "/pizza/classic/margherita/");
    }
}
