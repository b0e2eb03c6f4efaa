use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Top level of the catalog tree ("Пицца", "Напитки", ...)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,
    pub title: String,
    pub image: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub keywords: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sub_section::Entity")]
    SubSection,
}

impl Related<super::sub_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubSection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
