use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A dish on the menu. Prices are whole currency units.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,
    pub sub_section_slug: String,
    pub title: String,
    pub price: i32,
    pub weight: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub keywords: String,
    pub added_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sub_section::Entity",
        from = "Column::SubSectionSlug",
        to = "super::sub_section::Column::Slug"
    )]
    SubSection,
    #[sea_orm(has_many = "super::meal_image::Entity")]
    MealImage,
    #[sea_orm(has_many = "super::meal_info::Entity")]
    MealInfo,
    #[sea_orm(has_many = "super::cart_meal::Entity")]
    CartMeal,
}

impl Related<super::sub_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubSection.def()
    }
}

impl Related<super::meal_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealImage.def()
    }
}

impl Related<super::meal_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealInfo.def()
    }
}

impl Related<super::cart_meal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartMeal.def()
    }
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        super::meal_ingredient::Relation::Ingredient.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::meal_ingredient::Relation::Meal.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
