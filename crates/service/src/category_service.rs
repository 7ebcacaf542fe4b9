use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument};

use models::{substance_category, substance_type};
use crate::domain::{ensure_matching_id, CategoryInput, CategoryView};
use crate::errors::ServiceError;

fn duplicate_name(name: &str) -> String {
    format!("a category with the name '{}' already exists", name)
}

/// True when a category other than `exclude_id` already uses `name`.
pub(crate) async fn name_taken<C: ConnectionTrait>(conn: &C, name: &str, exclude_id: Option<i32>) -> Result<bool, ServiceError> {
    let mut q = substance_category::Entity::find().filter(substance_category::Column::Name.eq(name));
    if let Some(id) = exclude_id { q = q.filter(substance_category::Column::Id.ne(id)); }
    let n = q.count(conn).await.map_err(ServiceError::db)?;
    Ok(n > 0)
}

pub(crate) async fn exists<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, ServiceError> {
    let found = substance_category::Entity::find_by_id(id).one(conn).await.map_err(ServiceError::db)?;
    Ok(found.is_some())
}

/// All categories ordered by name.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<CategoryView>, ServiceError> {
    let rows = substance_category::Entity::find()
        .order_by_asc(substance_category::Column::Name)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(rows.into_iter().map(CategoryView::from).collect())
}

/// Get category by id.
pub async fn get_category(db: &DatabaseConnection, id: i32) -> Result<CategoryView, ServiceError> {
    substance_category::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .map(CategoryView::from)
        .ok_or_else(|| ServiceError::not_found("category", id))
}

/// Create a category with a unique, non-blank name.
#[instrument(skip(db))]
pub async fn create_category(db: &DatabaseConnection, name: &str) -> Result<CategoryView, ServiceError> {
    substance_category::validate_name(name)?;
    let txn = db.begin().await.map_err(ServiceError::db)?;
    if name_taken(&txn, name, None).await? {
        return Err(ServiceError::Conflict(duplicate_name(name)));
    }
    let created = substance_category::new_active(name)?
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, &duplicate_name(name), || ServiceError::Db("unexpected foreign key on category".into())))?;
    txn.commit().await.map_err(|e| ServiceError::from_write(e, &duplicate_name(name), || ServiceError::Db("commit failed".into())))?;
    info!(id = created.id, name = %created.name, "created category");
    Ok(created.into())
}

/// Rename a category. The body id must match `id`.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn update_category(db: &DatabaseConnection, id: i32, input: &CategoryInput) -> Result<CategoryView, ServiceError> {
    ensure_matching_id(id, input.id)?;
    substance_category::validate_name(&input.name)?;
    let txn = db.begin().await.map_err(ServiceError::db)?;
    if name_taken(&txn, &input.name, Some(id)).await? {
        return Err(ServiceError::Conflict(duplicate_name(&input.name)));
    }
    let res = substance_category::Entity::update_many()
        .col_expr(substance_category::Column::Name, Expr::value(input.name.clone()))
        .filter(substance_category::Column::Id.eq(id))
        .exec(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, &duplicate_name(&input.name), || ServiceError::Db("unexpected foreign key on category".into())))?;
    // row vanished between request and write
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("category", id));
    }
    txn.commit().await.map_err(|e| ServiceError::from_write(e, &duplicate_name(&input.name), || ServiceError::Db("commit failed".into())))?;
    info!(id, "updated category");
    Ok(CategoryView { id, name: input.name.clone() })
}

/// Delete a category nothing references.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let in_use = || ServiceError::Conflict("cannot delete category because it is associated with one or more substance types".into());
    let txn = db.begin().await.map_err(ServiceError::db)?;
    if !exists(&txn, id).await? {
        return Err(ServiceError::not_found("category", id));
    }
    let children = substance_type::Entity::find()
        .filter(substance_type::Column::CategoryId.eq(id))
        .count(&txn)
        .await
        .map_err(ServiceError::db)?;
    if children > 0 {
        return Err(in_use());
    }
    let res = substance_category::Entity::delete_by_id(id)
        .exec(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, "category delete conflict", in_use))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("category", id));
    }
    txn.commit().await.map_err(|e| ServiceError::from_write(e, "category delete conflict", in_use))?;
    info!(id, "deleted category");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_type};

    #[tokio::test]
    async fn category_crud_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;

        let c = create_category(&db, "Stimulants").await?;
        assert!(c.id > 0);
        assert_eq!(get_category(&db, c.id).await?, c);

        let renamed = update_category(&db, c.id, &CategoryInput { id: Some(c.id), name: "Uppers".into() }).await?;
        assert_eq!(renamed.name, "Uppers");
        assert_eq!(get_category(&db, c.id).await?.name, "Uppers");

        delete_category(&db, c.id).await?;
        assert!(matches!(get_category(&db, c.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        for name in ["Opioids", "Depressants", "Stimulants"] {
            create_category(&db, name).await?;
        }
        let names: Vec<String> = list_categories(&db).await?.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Depressants", "Opioids", "Stimulants"]);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        create_category(&db, "Stimulants").await?;
        let dup = create_category(&db, "Stimulants").await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn blank_name_is_rejected() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let e = create_category(&db, "   ").await.unwrap_err();
        assert!(matches!(e, ServiceError::Model(models::errors::ModelError::Validation(_))));
        assert!(list_categories(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn update_rules() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let a = create_category(&db, "A").await?;
        let b = create_category(&db, "B").await?;

        let mismatch = update_category(&db, a.id, &CategoryInput { id: Some(b.id), name: "C".into() }).await;
        assert!(matches!(mismatch, Err(ServiceError::Validation(_))));

        let taken = update_category(&db, a.id, &CategoryInput { id: Some(a.id), name: "B".into() }).await;
        assert!(matches!(taken, Err(ServiceError::Conflict(_))));

        // keeping its own name is not a conflict
        update_category(&db, a.id, &CategoryInput { id: Some(a.id), name: "A".into() }).await?;

        let missing = update_category(&db, 4242, &CategoryInput { id: Some(4242), name: "Z".into() }).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_blocked_while_types_reference_it() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let ty = seed_type(&db, "Stimulants", "Caffeine").await?;

        let blocked = delete_category(&db, ty.category_id).await;
        assert!(matches!(blocked, Err(ServiceError::Conflict(_))));

        let empty = create_category(&db, "Empty").await?;
        delete_category(&db, empty.id).await?;

        assert!(matches!(delete_category(&db, empty.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
