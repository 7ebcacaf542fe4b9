//! Create `substance_category` table.
//!
//! Root of the hierarchy; types reference it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubstanceCategory::Table)
                    .if_not_exists()
                    .col(pk_auto(SubstanceCategory::Id))
                    .col(string_len(SubstanceCategory::Name, 128).unique_key().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SubstanceCategory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SubstanceCategory { Table, Id, Name }
