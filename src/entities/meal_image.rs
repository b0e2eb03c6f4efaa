use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Gallery image; removed together with its meal
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meal_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub meal_slug: String,
    pub image: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
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
}

impl Related<super::meal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Storage path for an uploaded meal image: `images_<subsection>/<meal>_<filename>`
pub fn upload_path(sub_section_slug: &str, meal_slug: &str, filename: &str) -> String {
    format!("images_{}/{}_{}", sub_section_slug, meal_slug, filename)
}

#[cfg(test)]
mod tests {
    use super::upload_path;

    #[test]
    fn upload_path_groups_by_subsection() {
        assert_eq!(
            upload_path("classic", "margherita", "top.jpg"),
            "images_classic/margherita_top.jpg"
        );
    }
}
