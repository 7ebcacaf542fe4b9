//! Create `substance_usage` table. Same FK rule as types: NO ACTION on delete.
//! Amount precision stays at 16, the most sea-query emits for SQLite.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubstanceUsage::Table)
                    .if_not_exists()
                    .col(pk_auto(SubstanceUsage::Id))
                    .col(integer(SubstanceUsage::SubstanceTypeId).not_null())
                    .col(timestamp_with_time_zone(SubstanceUsage::UsageDate).not_null())
                    .col(text_null(SubstanceUsage::Notes))
                    .col(decimal_len(SubstanceUsage::Amount, 16, 6).not_null())
                    .col(string_len(SubstanceUsage::Unit, 32).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_substance_usage_type")
                            .from(SubstanceUsage::Table, SubstanceUsage::SubstanceTypeId)
                            .to(SubstanceType::Table, SubstanceType::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SubstanceUsage::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SubstanceUsage {
    Table,
    Id,
    SubstanceTypeId,
    UsageDate,
    Notes,
    Amount,
    Unit,
}

#[derive(DeriveIden)]
enum SubstanceType { Table, Id }
