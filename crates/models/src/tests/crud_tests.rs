use anyhow::Result;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, SqlErr};

use super::setup_test_db;
use crate::{substance_category, substance_type, substance_usage};

#[tokio::test]
async fn category_insert_and_find() -> Result<()> {
    let db = setup_test_db().await?;

    let created = substance_category::new_active("Stimulants")?.insert(&db).await?;
    assert!(created.id > 0);

    let found = substance_category::Entity::find_by_id(created.id).one(&db).await?;
    assert_eq!(found, Some(created.clone()));

    let by_name = substance_category::Entity::find()
        .filter(substance_category::Column::Name.eq("Stimulants"))
        .one(&db)
        .await?;
    assert_eq!(by_name.map(|c| c.id), Some(created.id));
    Ok(())
}

#[tokio::test]
async fn category_name_unique_index() -> Result<()> {
    let db = setup_test_db().await?;
    substance_category::new_active("Opioids")?.insert(&db).await?;
    let dup = substance_category::new_active("Opioids")?.insert(&db).await;
    assert!(dup.is_err());
    // case-sensitive as stored
    substance_category::new_active("opioids")?.insert(&db).await?;
    Ok(())
}

#[tokio::test]
async fn type_pair_unique_per_category() -> Result<()> {
    let db = setup_test_db().await?;
    let a = substance_category::new_active("A")?.insert(&db).await?;
    let b = substance_category::new_active("B")?.insert(&db).await?;

    substance_type::new_active("Caffeine", Some("mg"), a.id)?.insert(&db).await?;
    let dup = substance_type::new_active("Caffeine", None, a.id)?.insert(&db).await;
    assert!(dup.is_err());

    let other = substance_type::new_active("Caffeine", None, b.id)?.insert(&db).await?;
    assert_eq!(other.category_id, b.id);
    assert_eq!(other.default_unit, None);
    Ok(())
}

#[tokio::test]
async fn foreign_keys_block_orphans_and_parent_deletes() -> Result<()> {
    let db = setup_test_db().await?;

    let orphan = substance_type::new_active("Ghost", None, 999)?.insert(&db).await;
    let err = orphan.expect_err("orphan type must be refused");
    assert!(matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))), "{err}");

    let cat = substance_category::new_active("Depressants")?.insert(&db).await?;
    let ty = substance_type::new_active("Alcohol", Some("ml"), cat.id)?.insert(&db).await?;
    substance_usage::new_active(ty.id, None, Some("beer"), Decimal::from(330), "ml")?
        .insert(&db)
        .await?;

    // parent deletes must surface as foreign-key violations, not generic errors
    let err = substance_category::Entity::delete_by_id(cat.id).exec(&db).await.expect_err("category in use");
    assert!(matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))), "{err}");
    let err = substance_type::Entity::delete_by_id(ty.id).exec(&db).await.expect_err("type in use");
    assert!(matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))), "{err}");
    Ok(())
}

#[tokio::test]
async fn relations_resolve_both_ways() -> Result<()> {
    let db = setup_test_db().await?;
    let cat = substance_category::new_active("Stimulants")?.insert(&db).await?;
    let ty = substance_type::new_active("Caffeine", Some("mg"), cat.id)?.insert(&db).await?;
    let when = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
    let usage = substance_usage::new_active(ty.id, Some(when), None, Decimal::new(15, 1), "mg")?
        .insert(&db)
        .await?;

    let parent = usage.find_related(substance_type::Entity).one(&db).await?;
    assert_eq!(parent.as_ref().map(|t| t.id), Some(ty.id));

    let types_in_cat = cat.find_related(substance_type::Entity).all(&db).await?;
    assert_eq!(types_in_cat.len(), 1);

    let with_cat = substance_type::Entity::find()
        .find_also_related(substance_category::Entity)
        .order_by_asc(substance_category::Column::Name)
        .all(&db)
        .await?;
    assert_eq!(with_cat.len(), 1);
    assert_eq!(with_cat[0].1.as_ref().map(|c| c.name.as_str()), Some("Stimulants"));

    let stored = substance_usage::Entity::find_by_id(usage.id).one(&db).await?.unwrap();
    assert_eq!(stored.usage_date, when);
    assert_eq!(stored.amount, Decimal::new(15, 1));
    assert_eq!(stored.unit, "mg");
    Ok(())
}
