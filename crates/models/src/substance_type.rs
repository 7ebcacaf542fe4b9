//! A specific substance within a category, e.g. "Caffeine" under "Stimulants".
use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

use crate::{errors, substance_category, substance_usage};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "substance_type")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub default_unit: Option<String>,
    pub category_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Category, SubstanceUsage }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(substance_category::Entity)
                .from(Column::CategoryId)
                .to(substance_category::Column::Id)
                .into(),
            Relation::SubstanceUsage => Entity::has_many(substance_usage::Entity).into(),
        }
    }
}

impl Related<substance_category::Entity> for Entity {
    fn to() -> RelationDef { Relation::Category.def() }
}

impl Related<substance_usage::Entity> for Entity {
    fn to() -> RelationDef { Relation::SubstanceUsage.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("substance type name cannot be empty".into()));
    }
    Ok(())
}

/// Blank default units are stored as NULL.
pub fn normalize_unit(unit: Option<&str>) -> Option<String> {
    unit.filter(|u| !u.trim().is_empty()).map(str::to_string)
}

pub fn new_active(name: &str, default_unit: Option<&str>, category_id: i32) -> Result<ActiveModel, errors::ModelError> {
    validate_name(name)?;
    Ok(ActiveModel {
        name: Set(name.to_string()),
        default_unit: Set(normalize_unit(default_unit)),
        category_id: Set(category_id),
        ..Default::default()
    })
}
