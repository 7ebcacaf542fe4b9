//! A single logged consumption event.
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

use crate::{errors, substance_type};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "substance_usage")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub substance_type_id: i32,
    pub usage_date: DateTimeUtc,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 6)))")]
    pub amount: Decimal,
    pub unit: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { SubstanceType }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::SubstanceType => Entity::belongs_to(substance_type::Entity)
                .from(Column::SubstanceTypeId)
                .to(substance_type::Column::Id)
                .into(),
        }
    }
}

impl Related<substance_type::Entity> for Entity {
    fn to() -> RelationDef { Relation::SubstanceType.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Digits after the decimal point the `amount` column keeps.
pub const AMOUNT_SCALE: u32 = 6;
/// Exclusive upper bound: `NUMERIC(16, 6)` leaves ten integer digits.
const AMOUNT_LIMIT: i64 = 10_000_000_000;

pub fn validate_amount(amount: Decimal) -> Result<(), errors::ModelError> {
    if amount <= Decimal::ZERO {
        return Err(errors::ModelError::Validation("amount must be positive".into()));
    }
    if amount >= Decimal::from(AMOUNT_LIMIT) {
        return Err(errors::ModelError::Validation("amount is too large".into()));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(errors::ModelError::Validation(format!(
            "amount allows at most {} decimal places",
            AMOUNT_SCALE
        )));
    }
    Ok(())
}

pub fn validate_unit(unit: &str) -> Result<(), errors::ModelError> {
    if unit.trim().is_empty() {
        return Err(errors::ModelError::Validation("unit cannot be empty".into()));
    }
    Ok(())
}

/// Value checks shared by insert and update.
pub fn validate(amount: Decimal, unit: &str) -> Result<(), errors::ModelError> {
    validate_amount(amount)?;
    validate_unit(unit)
}

pub fn new_active(
    substance_type_id: i32,
    usage_date: Option<DateTime<Utc>>,
    notes: Option<&str>,
    amount: Decimal,
    unit: &str,
) -> Result<ActiveModel, errors::ModelError> {
    validate(amount, unit)?;
    Ok(ActiveModel {
        substance_type_id: Set(substance_type_id),
        usage_date: Set(usage_date.unwrap_or_else(Utc::now)),
        notes: Set(notes.map(str::to_string)),
        amount: Set(amount),
        unit: Set(unit.to_string()),
        ..Default::default()
    })
}
