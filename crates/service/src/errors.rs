use models::errors::ModelError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i32) -> Self { Self::NotFound(format!("{} with id {} not found", entity, id)) }

    pub fn db(e: DbErr) -> Self { Self::Db(e.to_string()) }

    /// Map a failed insert/update/delete. Unique violations become `Conflict`,
    /// foreign-key violations become whatever `on_foreign_key` builds, anything
    /// else is a storage error.
    pub fn from_write(e: DbErr, on_unique: &str, on_foreign_key: impl FnOnce() -> ServiceError) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict(on_unique.to_string()),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => on_foreign_key(),
            _ => Self::db(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{substance_category, substance_type};
    use sea_orm::{ActiveModelTrait, EntityTrait};

    use crate::test_support::{get_db, seed_type, seed_usage};

    fn in_use() -> ServiceError {
        ServiceError::Conflict("in use".into())
    }

    fn invalid_parent() -> ServiceError {
        ServiceError::Validation("invalid parent".into())
    }

    #[test]
    fn unclassified_db_errors_are_storage_errors() {
        let e = ServiceError::from_write(DbErr::Custom("disk full".into()), "dup", invalid_parent);
        assert!(matches!(e, ServiceError::Db(ref m) if m.contains("disk full")));
    }

    #[test]
    fn not_found_message_names_entity() {
        let e = ServiceError::not_found("substance type", 7);
        assert_eq!(e.to_string(), "not found: substance type with id 7 not found");
    }

    // The writes below skip the stores' pre-checks, as a concurrent writer would.

    #[tokio::test]
    async fn unique_violation_on_insert_is_conflict() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        substance_category::new_active("Stimulants")?.insert(&db).await?;
        let err = substance_category::new_active("Stimulants")?.insert(&db).await.expect_err("duplicate name");
        let mapped = ServiceError::from_write(err, "duplicate category", invalid_parent);
        assert!(matches!(mapped, ServiceError::Conflict(ref m) if m == "duplicate category"), "{mapped:?}");
        Ok(())
    }

    #[tokio::test]
    async fn foreign_key_violation_on_insert_is_validation() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let err = substance_type::new_active("Caffeine", None, 404)?.insert(&db).await.expect_err("missing category");
        let mapped = ServiceError::from_write(err, "duplicate type", invalid_parent);
        assert!(matches!(mapped, ServiceError::Validation(_)), "{mapped:?}");
        Ok(())
    }

    #[tokio::test]
    async fn foreign_key_violation_on_delete_is_conflict() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let ty = seed_type(&db, "Stimulants", "Caffeine").await?;
        let err = substance_category::Entity::delete_by_id(ty.category_id).exec(&db).await.expect_err("category has types");
        let mapped = ServiceError::from_write(err, "dup", in_use);
        assert!(matches!(mapped, ServiceError::Conflict(ref m) if m == "in use"), "{mapped:?}");

        let db = get_db().await?;
        let usage = seed_usage(&db).await?;
        let err = substance_type::Entity::delete_by_id(usage.substance_type_id).exec(&db).await.expect_err("type has usages");
        let mapped = ServiceError::from_write(err, "dup", in_use);
        assert!(matches!(mapped, ServiceError::Conflict(_)), "{mapped:?}");
        Ok(())
    }
}
