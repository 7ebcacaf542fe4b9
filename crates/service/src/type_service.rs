use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument};

use models::{substance_category, substance_type, substance_usage};
use crate::category_service;
use crate::domain::{ensure_matching_id, TypeInput, TypeView};
use crate::errors::ServiceError;

fn duplicate_name(name: &str) -> String {
    format!("a substance type with the name '{}' already exists in this category", name)
}

fn invalid_category(category_id: i32) -> ServiceError {
    ServiceError::Validation(format!("invalid category: category {} does not exist", category_id))
}

/// True when another type in `category_id` already uses `name`.
async fn name_taken<C: ConnectionTrait>(conn: &C, category_id: i32, name: &str, exclude_id: Option<i32>) -> Result<bool, ServiceError> {
    let mut q = substance_type::Entity::find()
        .filter(substance_type::Column::CategoryId.eq(category_id))
        .filter(substance_type::Column::Name.eq(name));
    if let Some(id) = exclude_id { q = q.filter(substance_type::Column::Id.ne(id)); }
    let n = q.count(conn).await.map_err(ServiceError::db)?;
    Ok(n > 0)
}

pub(crate) async fn exists<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, ServiceError> {
    let found = substance_type::Entity::find_by_id(id).one(conn).await.map_err(ServiceError::db)?;
    Ok(found.is_some())
}

/// Load one type with its category attached.
pub(crate) async fn load_view<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<TypeView>, ServiceError> {
    let row = substance_type::Entity::find_by_id(id)
        .find_also_related(substance_category::Entity)
        .one(conn)
        .await
        .map_err(ServiceError::db)?;
    Ok(row.map(|(t, c)| TypeView::new(t, c)))
}

/// Referential checks shared by create and update: existing category and a
/// unique (category, name) pair.
async fn validate_input<C: ConnectionTrait>(conn: &C, input: &TypeInput, exclude_id: Option<i32>) -> Result<(), ServiceError> {
    if !category_service::exists(conn, input.category_id).await? {
        return Err(invalid_category(input.category_id));
    }
    if name_taken(conn, input.category_id, &input.name, exclude_id).await? {
        return Err(ServiceError::Conflict(duplicate_name(&input.name)));
    }
    Ok(())
}

/// List types ordered by category name then type name, optionally for one category.
pub async fn list_types(db: &DatabaseConnection, category_id: Option<i32>) -> Result<Vec<TypeView>, ServiceError> {
    let mut q = substance_type::Entity::find().find_also_related(substance_category::Entity);
    if let Some(cid) = category_id {
        q = q.filter(substance_type::Column::CategoryId.eq(cid));
    }
    let rows = q
        .order_by_asc(substance_category::Column::Name)
        .order_by_asc(substance_type::Column::Name)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(rows.into_iter().map(|(t, c)| TypeView::new(t, c)).collect())
}

/// Get type by id with its category.
pub async fn get_type(db: &DatabaseConnection, id: i32) -> Result<TypeView, ServiceError> {
    load_view(db, id).await?.ok_or_else(|| ServiceError::not_found("substance type", id))
}

/// Create a type under an existing category.
#[instrument(skip(db, input), fields(name = %input.name, category_id = input.category_id))]
pub async fn create_type(db: &DatabaseConnection, input: &TypeInput) -> Result<TypeView, ServiceError> {
    substance_type::validate_name(&input.name)?;
    let txn = db.begin().await.map_err(ServiceError::db)?;
    validate_input(&txn, input, None).await?;
    let on_fk = || invalid_category(input.category_id);
    let created = substance_type::new_active(&input.name, input.default_unit.as_deref(), input.category_id)?
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, &duplicate_name(&input.name), on_fk))?;
    let view = load_view(&txn, created.id).await?.ok_or_else(|| ServiceError::not_found("substance type", created.id))?;
    txn.commit().await.map_err(|e| ServiceError::from_write(e, &duplicate_name(&input.name), on_fk))?;
    info!(id = view.id, "created substance type");
    Ok(view)
}

/// Replace name, default unit and category of a type.
#[instrument(skip(db, input), fields(name = %input.name, category_id = input.category_id))]
pub async fn update_type(db: &DatabaseConnection, id: i32, input: &TypeInput) -> Result<TypeView, ServiceError> {
    ensure_matching_id(id, input.id)?;
    substance_type::validate_name(&input.name)?;
    let txn = db.begin().await.map_err(ServiceError::db)?;
    validate_input(&txn, input, Some(id)).await?;
    let on_fk = || invalid_category(input.category_id);
    let res = substance_type::Entity::update_many()
        .col_expr(substance_type::Column::Name, Expr::value(input.name.clone()))
        .col_expr(substance_type::Column::DefaultUnit, Expr::value(substance_type::normalize_unit(input.default_unit.as_deref())))
        .col_expr(substance_type::Column::CategoryId, Expr::value(input.category_id))
        .filter(substance_type::Column::Id.eq(id))
        .exec(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, &duplicate_name(&input.name), on_fk))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("substance type", id));
    }
    let view = load_view(&txn, id).await?.ok_or_else(|| ServiceError::not_found("substance type", id))?;
    txn.commit().await.map_err(|e| ServiceError::from_write(e, &duplicate_name(&input.name), on_fk))?;
    info!(id, "updated substance type");
    Ok(view)
}

/// Delete a type no usage record references.
#[instrument(skip(db))]
pub async fn delete_type(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let in_use = || ServiceError::Conflict("cannot delete substance type because it is associated with one or more usage records".into());
    let txn = db.begin().await.map_err(ServiceError::db)?;
    if !exists(&txn, id).await? {
        return Err(ServiceError::not_found("substance type", id));
    }
    let usages = substance_usage::Entity::find()
        .filter(substance_usage::Column::SubstanceTypeId.eq(id))
        .count(&txn)
        .await
        .map_err(ServiceError::db)?;
    if usages > 0 {
        return Err(in_use());
    }
    let res = substance_type::Entity::delete_by_id(id)
        .exec(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, "substance type delete conflict", in_use))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("substance type", id));
    }
    txn.commit().await.map_err(|e| ServiceError::from_write(e, "substance type delete conflict", in_use))?;
    info!(id, "deleted substance type");
    Ok(())
}
