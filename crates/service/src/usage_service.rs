use std::collections::HashMap;

use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::{debug, info, instrument};

use models::{substance_category, substance_type, substance_usage};
use crate::domain::{ensure_matching_id, TypeView, UsageFilter, UsageInput, UsageView};
use crate::errors::ServiceError;
use crate::type_service;

fn invalid_type(substance_type_id: i32) -> ServiceError {
    ServiceError::Validation(format!("invalid substance type: substance type {} does not exist", substance_type_id))
}

/// Attach each usage's type and that type's category. Categories are fetched
/// in one query keyed by id.
async fn attach_parents<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<(substance_usage::Model, Option<substance_type::Model>)>,
) -> Result<Vec<UsageView>, ServiceError> {
    let mut category_ids: Vec<i32> = rows.iter().filter_map(|(_, t)| t.as_ref().map(|t| t.category_id)).collect();
    category_ids.sort_unstable();
    category_ids.dedup();

    let categories: HashMap<i32, substance_category::Model> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        substance_category::Entity::find()
            .filter(substance_category::Column::Id.is_in(category_ids))
            .all(conn)
            .await
            .map_err(ServiceError::db)?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|(u, t)| {
            let ty = t.map(|t| {
                let cat = categories.get(&t.category_id).cloned();
                TypeView::new(t, cat)
            });
            UsageView::new(u, ty)
        })
        .collect())
}

async fn load_view<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<UsageView>, ServiceError> {
    let row = substance_usage::Entity::find_by_id(id)
        .find_also_related(substance_type::Entity)
        .one(conn)
        .await
        .map_err(ServiceError::db)?;
    match row {
        Some(r) => Ok(attach_parents(conn, vec![r]).await?.into_iter().next()),
        None => Ok(None),
    }
}

/// List usages, most recent first, applying every filter that is set.
#[instrument(skip(db))]
pub async fn list_usages(db: &DatabaseConnection, filter: &UsageFilter) -> Result<Vec<UsageView>, ServiceError> {
    let mut q = substance_usage::Entity::find().find_also_related(substance_type::Entity);
    if let Some(start) = filter.start_date {
        q = q.filter(substance_usage::Column::UsageDate.gte(start));
    }
    if let Some(end) = filter.end_exclusive() {
        q = q.filter(substance_usage::Column::UsageDate.lt(end));
    }
    if let Some(tid) = filter.substance_type_id {
        q = q.filter(substance_usage::Column::SubstanceTypeId.eq(tid));
    }
    if let Some(cid) = filter.category_id {
        q = q.filter(substance_type::Column::CategoryId.eq(cid));
    }
    let rows = q
        .order_by_desc(substance_usage::Column::UsageDate)
        .order_by_desc(substance_usage::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    debug!(count = rows.len(), "listed usages");
    attach_parents(db, rows).await
}

/// Get usage by id with its type and category.
pub async fn get_usage(db: &DatabaseConnection, id: i32) -> Result<UsageView, ServiceError> {
    load_view(db, id).await?.ok_or_else(|| ServiceError::not_found("substance usage record", id))
}

/// Log a usage. A missing `usage_date` means now.
#[instrument(skip(db, input), fields(substance_type_id = input.substance_type_id))]
pub async fn create_usage(db: &DatabaseConnection, input: &UsageInput) -> Result<UsageView, ServiceError> {
    substance_usage::validate(input.amount, &input.unit)?;
    let txn = db.begin().await.map_err(ServiceError::db)?;
    if !type_service::exists(&txn, input.substance_type_id).await? {
        return Err(invalid_type(input.substance_type_id));
    }
    let on_fk = || invalid_type(input.substance_type_id);
    let created = substance_usage::new_active(
        input.substance_type_id,
        input.usage_date,
        input.notes.as_deref(),
        input.amount,
        &input.unit,
    )?
    .insert(&txn)
    .await
    .map_err(|e| ServiceError::from_write(e, "duplicate usage record", on_fk))?;
    let view = load_view(&txn, created.id).await?.ok_or_else(|| ServiceError::not_found("substance usage record", created.id))?;
    txn.commit().await.map_err(|e| ServiceError::from_write(e, "duplicate usage record", on_fk))?;
    info!(id = view.id, amount = %view.amount, unit = %view.unit, "created usage record");
    Ok(view)
}

/// Replace the fields of a usage record. An absent `usage_date` keeps the
/// stored timestamp.
#[instrument(skip(db, input), fields(substance_type_id = input.substance_type_id))]
pub async fn update_usage(db: &DatabaseConnection, id: i32, input: &UsageInput) -> Result<UsageView, ServiceError> {
    ensure_matching_id(id, input.id)?;
    substance_usage::validate(input.amount, &input.unit)?;
    let txn = db.begin().await.map_err(ServiceError::db)?;
    if !type_service::exists(&txn, input.substance_type_id).await? {
        return Err(invalid_type(input.substance_type_id));
    }
    let on_fk = || invalid_type(input.substance_type_id);
    let mut update = substance_usage::Entity::update_many()
        .col_expr(substance_usage::Column::SubstanceTypeId, Expr::value(input.substance_type_id))
        .col_expr(substance_usage::Column::Notes, Expr::value(input.notes.clone()))
        .col_expr(substance_usage::Column::Amount, Expr::value(input.amount))
        .col_expr(substance_usage::Column::Unit, Expr::value(input.unit.clone()));
    if let Some(when) = input.usage_date {
        update = update.col_expr(substance_usage::Column::UsageDate, Expr::value(when));
    }
    let res = update
        .filter(substance_usage::Column::Id.eq(id))
        .exec(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, "duplicate usage record", on_fk))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("substance usage record", id));
    }
    let view = load_view(&txn, id).await?.ok_or_else(|| ServiceError::not_found("substance usage record", id))?;
    txn.commit().await.map_err(|e| ServiceError::from_write(e, "duplicate usage record", on_fk))?;
    info!(id, "updated usage record");
    Ok(view)
}

/// Delete a usage record; nothing references usages.
#[instrument(skip(db))]
pub async fn delete_usage(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let res = substance_usage::Entity::delete_by_id(id)
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("substance usage record", id));
    }
    txn.commit().await.map_err(ServiceError::db)?;
    info!(id, "deleted usage record");
    Ok(())
}
