//! Create `substance_type` table.
//!
//! Deleting a category that still has types is refused by the FK. NO ACTION
//! rather than RESTRICT: SQLite reports RESTRICT failures under its own
//! extended code, which is not classified as a foreign-key violation.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubstanceType::Table)
                    .if_not_exists()
                    .col(pk_auto(SubstanceType::Id))
                    .col(string_len(SubstanceType::Name, 128).not_null())
                    .col(string_len_null(SubstanceType::DefaultUnit, 32))
                    .col(integer(SubstanceType::CategoryId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_substance_type_category")
                            .from(SubstanceType::Table, SubstanceType::CategoryId)
                            .to(SubstanceCategory::Table, SubstanceCategory::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SubstanceType::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SubstanceType { Table, Id, Name, DefaultUnit, CategoryId }

#[derive(DeriveIden)]
enum SubstanceCategory { Table, Id }
