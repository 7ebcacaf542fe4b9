//! Top-level grouping for substance types.
use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

use crate::{errors, substance_type};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "substance_category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { SubstanceType }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::SubstanceType => Entity::has_many(substance_type::Entity).into(),
        }
    }
}

impl Related<substance_type::Entity> for Entity {
    fn to() -> RelationDef { Relation::SubstanceType.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("category name cannot be empty".into()));
    }
    Ok(())
}

/// Insertable row; the id is assigned by the database.
pub fn new_active(name: &str) -> Result<ActiveModel, errors::ModelError> {
    validate_name(name)?;
    Ok(ActiveModel { name: Set(name.to_string()), ..Default::default() })
}
