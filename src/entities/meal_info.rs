use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A typed fact about a meal, e.g. calories -> "250 kcal"
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meal_infos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub meal_slug: String,
    pub info_type_id: i32,
    pub value: String,
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
        belongs_to = "super::info_type::Entity",
        from = "Column::InfoTypeId",
        to = "super::info_type::Column::Id"
    )]
    InfoType,
}

impl Related<super::meal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meal.def()
    }
}

impl Related<super::info_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InfoType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
