//! Catalog import from a JSON document.
//!
//! Sections, sub-sections and meals are upserted by slug, so re-running an
//! import updates titles and prices in place. A meal's images, ingredients
//! and info rows are replaced by what the file lists.

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    entities::{
        info_type, ingredient, ingredient_type, meal, meal_image, meal_info, meal_ingredient,
        section, sub_section,
    },
    errors::ServiceError,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    pub sections: Vec<SectionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionEntry {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub sub_sections: Vec<SubSectionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubSectionEntry {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub meals: Vec<MealEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MealEntry {
    pub slug: String,
    pub title: String,
    pub price: i32,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub images: Vec<ImageEntry>,
    #[serde(default)]
    pub ingredients: Vec<IngredientEntry>,
    /// Info type name to value, e.g. `"Калории": "250"`
    #[serde(default)]
    pub info: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageEntry {
    pub file: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientEntry {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub sections: usize,
    pub sub_sections: usize,
    pub meals: usize,
}

fn check_slug(slug: &str) -> Result<(), ServiceError> {
    if !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(format!(
            "slug '{}' must match [0-9a-zA-Z_-]+",
            slug
        )))
    }
}

/// Loads the whole file in one transaction
pub async fn import_catalog(
    db: &DatabaseConnection,
    file: &CatalogFile,
) -> Result<ImportReport, ServiceError> {
    let txn = db.begin().await?;
    let mut report = ImportReport::default();

    for entry in &file.sections {
        check_slug(&entry.slug)?;
        upsert_section(&txn, entry).await?;
        report.sections += 1;

        for sub in &entry.sub_sections {
            check_slug(&sub.slug)?;
            upsert_sub_section(&txn, &entry.slug, sub).await?;
            report.sub_sections += 1;

            for meal in &sub.meals {
                check_slug(&meal.slug)?;
                upsert_meal(&txn, &sub.slug, meal).await?;
                report.meals += 1;
            }
        }
    }

    txn.commit().await?;
    info!(
        sections = report.sections,
        sub_sections = report.sub_sections,
        meals = report.meals,
        "Catalog imported"
    );
    Ok(report)
}

async fn upsert_section<C: ConnectionTrait>(db: &C, entry: &SectionEntry) -> Result<(), ServiceError> {
    let existing = section::Entity::find_by_id(entry.slug.clone()).one(db).await?;
    let is_new = existing.is_none();
    let mut model: section::ActiveModel = match existing {
        Some(found) => found.into(),
        None => section::ActiveModel {
            slug: Set(entry.slug.clone()),
            ..Default::default()
        },
    };
    model.title = Set(entry.title.clone());
    model.image = Set(entry.image.clone());
    model.description = Set(entry.description.clone());
    model.keywords = Set(entry.keywords.clone());
    if is_new {
        model.insert(db).await?;
    } else {
        model.update(db).await?;
    }
    Ok(())
}

async fn upsert_sub_section<C: ConnectionTrait>(
    db: &C,
    section_slug: &str,
    entry: &SubSectionEntry,
) -> Result<(), ServiceError> {
    let existing = sub_section::Entity::find_by_id(entry.slug.clone()).one(db).await?;
    let is_new = existing.is_none();
    let mut model: sub_section::ActiveModel = match existing {
        Some(found) => found.into(),
        None => sub_section::ActiveModel {
            slug: Set(entry.slug.clone()),
            ..Default::default()
        },
    };
    model.section_slug = Set(section_slug.to_string());
    model.title = Set(entry.title.clone());
    model.image = Set(entry.image.clone());
    model.description = Set(entry.description.clone());
    model.keywords = Set(entry.keywords.clone());
    if is_new {
        model.insert(db).await?;
    } else {
        model.update(db).await?;
    }
    Ok(())
}

async fn upsert_meal<C: ConnectionTrait>(
    db: &C,
    sub_section_slug: &str,
    entry: &MealEntry,
) -> Result<(), ServiceError> {
    let existing = meal::Entity::find_by_id(entry.slug.clone()).one(db).await?;
    let is_new = existing.is_none();
    let mut model: meal::ActiveModel = match existing {
        Some(found) => found.into(),
        None => meal::ActiveModel {
            slug: Set(entry.slug.clone()),
            added_at: Set(Utc::now()),
            ..Default::default()
        },
    };
    model.sub_section_slug = Set(sub_section_slug.to_string());
    model.title = Set(entry.title.clone());
    model.price = Set(entry.price);
    model.weight = Set(entry.weight.clone());
    model.description = Set(entry.description.clone());
    model.keywords = Set(entry.keywords.clone());
    if is_new {
        model.insert(db).await?;
    } else {
        model.update(db).await?;
    }

    replace_images(db, sub_section_slug, entry).await?;
    replace_ingredients(db, entry).await?;
    replace_infos(db, entry).await?;
    debug!(meal = %entry.slug, "Imported meal");
    Ok(())
}

async fn replace_images<C: ConnectionTrait>(
    db: &C,
    sub_section_slug: &str,
    entry: &MealEntry,
) -> Result<(), ServiceError> {
    meal_image::Entity::delete_many()
        .filter(meal_image::Column::MealSlug.eq(entry.slug.as_str()))
        .exec(db)
        .await?;
    for image in &entry.images {
        meal_image::ActiveModel {
            meal_slug: Set(entry.slug.clone()),
            image: Set(meal_image::upload_path(sub_section_slug, &entry.slug, &image.file)),
            description: Set(image.description.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

async fn replace_ingredients<C: ConnectionTrait>(db: &C, entry: &MealEntry) -> Result<(), ServiceError> {
    meal_ingredient::Entity::delete_many()
        .filter(meal_ingredient::Column::MealSlug.eq(entry.slug.as_str()))
        .exec(db)
        .await?;

    for item in &entry.ingredients {
        let type_id = match ingredient_type::Entity::find()
            .filter(ingredient_type::Column::Title.eq(item.kind.as_str()))
            .one(db)
            .await?
        {
            Some(found) => found.id,
            None => {
                ingredient_type::ActiveModel {
                    title: Set(item.kind.clone()),
                    ..Default::default()
                }
                .insert(db)
                .await?
                .id
            }
        };

        let ingredient_id = match ingredient::Entity::find()
            .filter(ingredient::Column::Title.eq(item.title.as_str()))
            .one(db)
            .await?
        {
            Some(found) => found.id,
            None => {
                ingredient::ActiveModel {
                    title: Set(item.title.clone()),
                    description: Set(item.description.clone()),
                    type_id: Set(type_id),
                    ..Default::default()
                }
                .insert(db)
                .await?
                .id
            }
        };

        let linked = meal_ingredient::Entity::find_by_id((entry.slug.clone(), ingredient_id))
            .one(db)
            .await?;
        if linked.is_none() {
            meal_ingredient::ActiveModel {
                meal_slug: Set(entry.slug.clone()),
                ingredient_id: Set(ingredient_id),
            }
            .insert(db)
            .await?;
        }
    }
    Ok(())
}

async fn replace_infos<C: ConnectionTrait>(db: &C, entry: &MealEntry) -> Result<(), ServiceError> {
    meal_info::Entity::delete_many()
        .filter(meal_info::Column::MealSlug.eq(entry.slug.as_str()))
        .exec(db)
        .await?;

    for (name, value) in &entry.info {
        let info_type_id = match info_type::Entity::find()
            .filter(info_type::Column::Name.eq(name.as_str()))
            .one(db)
            .await?
        {
            Some(found) => found.id,
            None => {
                info_type::ActiveModel {
                    name: Set(name.clone()),
                    ..Default::default()
                }
                .insert(db)
                .await?
                .id
            }
        };

        meal_info::ActiveModel {
            meal_slug: Set(entry.slug.clone()),
            info_type_id: Set(info_type_id),
            value: Set(value.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}
