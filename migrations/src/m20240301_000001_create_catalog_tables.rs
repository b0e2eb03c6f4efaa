use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sections::Slug)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sections::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Sections::Image).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Sections::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Sections::Keywords)
                            .string_len(300)
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubSections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubSections::Slug)
                            .string_len(70)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubSections::SectionSlug)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubSections::Title)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubSections::Image)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubSections::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SubSections::Keywords)
                            .string_len(300)
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sub_sections_section_slug")
                            .from(SubSections::Table, SubSections::SectionSlug)
                            .to(Sections::Table, Sections::Slug)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Meals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Meals::Slug)
                            .string_len(80)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Meals::SubSectionSlug)
                            .string_len(70)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Meals::Title).string_len(150).not_null())
                    .col(
                        ColumnDef::new(Meals::Price)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Meals::Weight).string_len(70).not_null())
                    .col(
                        ColumnDef::new(Meals::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Meals::Keywords)
                            .string_len(300)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Meals::AddedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meals_sub_section_slug")
                            .from(Meals::Table, Meals::SubSectionSlug)
                            .to(SubSections::Table, SubSections::Slug)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_meals_sub_section_added")
                    .table(Meals::Table)
                    .col(Meals::SubSectionSlug)
                    .col((Meals::AddedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MealImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MealImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MealImages::MealSlug)
                            .string_len(80)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MealImages::Image)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MealImages::Description).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meal_images_meal_slug")
                            .from(MealImages::Table, MealImages::MealSlug)
                            .to(Meals::Table, Meals::Slug)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IngredientTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IngredientTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IngredientTypes::Title)
                            .string_len(100)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ingredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ingredients::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Ingredients::Title)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Ingredients::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Ingredients::TypeId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ingredients_type_id")
                            .from(Ingredients::Table, Ingredients::TypeId)
                            .to(IngredientTypes::Table, IngredientTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MealIngredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MealIngredients::MealSlug)
                            .string_len(80)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MealIngredients::IngredientId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(MealIngredients::MealSlug)
                            .col(MealIngredients::IngredientId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meal_ingredients_meal_slug")
                            .from(MealIngredients::Table, MealIngredients::MealSlug)
                            .to(Meals::Table, Meals::Slug)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meal_ingredients_ingredient_id")
                            .from(MealIngredients::Table, MealIngredients::IngredientId)
                            .to(Ingredients::Table, Ingredients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InfoTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InfoTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InfoTypes::Name).string_len(80).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MealInfos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MealInfos::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MealInfos::MealSlug)
                            .string_len(80)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MealInfos::InfoTypeId).integer().not_null())
                    .col(ColumnDef::new(MealInfos::Value).string_len(200).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meal_infos_meal_slug")
                            .from(MealInfos::Table, MealInfos::MealSlug)
                            .to(Meals::Table, Meals::Slug)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meal_infos_info_type_id")
                            .from(MealInfos::Table, MealInfos::InfoTypeId)
                            .to(InfoTypes::Table, InfoTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MealInfos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InfoTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MealIngredients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ingredients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IngredientTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MealImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Meals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubSections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sections::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Sections {
    Table,
    Slug,
    Title,
    Image,
    Description,
    Keywords,
}

#[derive(DeriveIden)]
enum SubSections {
    Table,
    Slug,
    SectionSlug,
    Title,
    Image,
    Description,
    Keywords,
}

#[derive(DeriveIden)]
pub(crate) enum Meals {
    Table,
    Slug,
    SubSectionSlug,
    Title,
    Price,
    Weight,
    Description,
    Keywords,
    AddedAt,
}

#[derive(DeriveIden)]
enum MealImages {
    Table,
    Id,
    MealSlug,
    Image,
    Description,
}

#[derive(DeriveIden)]
enum IngredientTypes {
    Table,
    Id,
    Title,
}

#[derive(DeriveIden)]
enum Ingredients {
    Table,
    Id,
    Title,
    Description,
    TypeId,
}

#[derive(DeriveIden)]
enum MealIngredients {
    Table,
    MealSlug,
    IngredientId,
}

#[derive(DeriveIden)]
enum InfoTypes {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum MealInfos {
    Table,
    Id,
    MealSlug,
    InfoTypeId,
    Value,
}
