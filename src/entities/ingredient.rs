use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub type_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ingredient_type::Entity",
        from = "Column::TypeId",
        to = "super::ingredient_type::Column::Id"
    )]
    IngredientType,
}

impl Related<super::ingredient_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IngredientType.def()
    }
}

impl Related<super::meal::Entity> for Entity {
    fn to() -> RelationDef {
        super::meal_ingredient::Relation::Meal.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::meal_ingredient::Relation::Ingredient.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
