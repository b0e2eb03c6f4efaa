use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Join table between meals and ingredients
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meal_ingredients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub meal_slug: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub ingredient_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meal::Entity",
        from = "Column::MealSlug",
        to = "super::meal::Column::Slug",
        on_delete = "Cascade"
    )]
    Meal,
    #[sea_orm(
        belongs_to = "super::ingredient::Entity",
        from = "Column::IngredientId",
        to = "super::ingredient::Column::Id",
        on_delete = "Cascade"
    )]
    Ingredient,
}

impl ActiveModelBehavior for ActiveModel {}
