#![cfg(test)]
use migration::MigratorTrait;
use rust_decimal::Decimal;
use models::db::{connect_with_config, DatabaseConfig};
use sea_orm::DatabaseConnection;

use crate::domain::{TypeInput, TypeView, UsageInput, UsageView};
use crate::{category_service, type_service, usage_service};

/// Fresh in-memory database with all migrations applied. Each test gets its
/// own, so tests never see each other's rows.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&DatabaseConfig::in_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Category named `category` holding one type named `name`.
pub async fn seed_type(db: &DatabaseConnection, category: &str, name: &str) -> Result<TypeView, anyhow::Error> {
    let cat = category_service::create_category(db, category).await?;
    let ty = type_service::create_type(db, &TypeInput { id: None, name: name.into(), default_unit: Some("mg".into()), category_id: cat.id }).await?;
    Ok(ty)
}

pub async fn seed_usage(db: &DatabaseConnection) -> Result<UsageView, anyhow::Error> {
    let ty = seed_type(db, "Stimulants", "Caffeine").await?;
    let usage = usage_service::create_usage(db, &UsageInput {
        id: None,
        substance_type_id: ty.id,
        usage_date: None,
        notes: None,
        amount: Decimal::from(100),
        unit: "mg".into(),
    })
    .await?;
    Ok(usage)
}
