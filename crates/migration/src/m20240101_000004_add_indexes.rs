use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SubstanceType: composite unique (category_id, name)
        manager
            .create_index(
                Index::create()
                    .name("uniq_substance_type_category_name")
                    .table(SubstanceType::Table)
                    .col(SubstanceType::CategoryId)
                    .col(SubstanceType::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // SubstanceUsage: index on substance_type_id and usage_date
        manager
            .create_index(
                Index::create()
                    .name("idx_substance_usage_type")
                    .table(SubstanceUsage::Table)
                    .col(SubstanceUsage::SubstanceTypeId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_substance_usage_date")
                    .table(SubstanceUsage::Table)
                    .col(SubstanceUsage::UsageDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_substance_type_category_name").table(SubstanceType::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_substance_usage_type").table(SubstanceUsage::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_substance_usage_date").table(SubstanceUsage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SubstanceType { Table, CategoryId, Name }

#[derive(DeriveIden)]
enum SubstanceUsage { Table, SubstanceTypeId, UsageDate }
