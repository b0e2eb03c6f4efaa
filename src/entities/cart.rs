use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shopping cart, and once archived, an order
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub token: String,
    pub owner_id: Option<i32>,
    pub status_id: i32,
    pub archive: bool,
    pub contact: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn is_open(&self) -> bool {
        !self.archive
    }

    /// Anonymous callers may use any cart whose token they hold; a signed-in
    /// caller only their own
    pub fn visible_to(&self, user_id: Option<i32>) -> bool {
        match user_id {
            None => true,
            Some(id) => self.owner_id == Some(id),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::state::Entity",
        from = "Column::StatusId",
        to = "super::state::Column::Id"
    )]
    Status,
    #[sea_orm(has_many = "super::cart_meal::Entity")]
    CartMeal,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::state::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl Related<super::cart_meal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartMeal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
