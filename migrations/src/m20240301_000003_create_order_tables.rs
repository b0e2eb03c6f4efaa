use sea_orm_migration::prelude::*;

use crate::m20240301_000001_create_catalog_tables::Meals;
use crate::m20240301_000002_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(States::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(States::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(States::Code)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(States::Text).string_len(30).not_null())
                    .col(ColumnDef::new(States::Details).string_len(100).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Carts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Carts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Carts::Token).string_len(40).not_null())
                    .col(ColumnDef::new(Carts::OwnerId).integer().null())
                    .col(ColumnDef::new(Carts::StatusId).integer().not_null())
                    .col(
                        ColumnDef::new(Carts::Archive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Carts::Contact).string_len(200).null())
                    .col(
                        ColumnDef::new(Carts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Carts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carts_owner_id")
                            .from(Carts::Table, Carts::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carts_status_id")
                            .from(Carts::Table, Carts::StatusId)
                            .to(States::Table, States::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carts_token")
                    .table(Carts::Table)
                    .col(Carts::Token)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carts_owner_archive")
                    .table(Carts::Table)
                    .col(Carts::OwnerId)
                    .col(Carts::Archive)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CartMeals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CartMeals::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CartMeals::CartId).integer().not_null())
                    .col(ColumnDef::new(CartMeals::MealSlug).string_len(80).not_null())
                    .col(
                        ColumnDef::new(CartMeals::Amount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_meals_cart_id")
                            .from(CartMeals::Table, CartMeals::CartId)
                            .to(Carts::Table, Carts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_meals_meal_slug")
                            .from(CartMeals::Table, CartMeals::MealSlug)
                            .to(Meals::Table, Meals::Slug)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cart_meals_cart_meal")
                    .table(CartMeals::Table)
                    .col(CartMeals::CartId)
                    .col(CartMeals::MealSlug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contacts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Contacts::Phone)
                            .string_len(20)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Contacts::UserId).integer().null().unique_key())
                    .col(ColumnDef::new(Contacts::CartId).integer().null().unique_key())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contacts_user_id")
                            .from(Contacts::Table, Contacts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contacts_cart_id")
                            .from(Contacts::Table, Contacts::CartId)
                            .to(Carts::Table, Carts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CartMeals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Carts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(States::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum States {
    Table,
    Id,
    Code,
    Text,
    Details,
}

#[derive(DeriveIden)]
enum Carts {
    Table,
    Id,
    Token,
    OwnerId,
    StatusId,
    Archive,
    Contact,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CartMeals {
    Table,
    Id,
    CartId,
    MealSlug,
    Amount,
}

#[derive(DeriveIden)]
enum Contacts {
    Table,
    Id,
    Phone,
    UserId,
    CartId,
}
