//! Request inputs and response shapes shared by the stores and the HTTP layer.
//!
//! Responses attach parents explicitly (type → category, usage → type →
//! category); nothing here holds child collections.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use models::{substance_category, substance_type, substance_usage};

use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: i32,
    pub name: String,
}

impl From<substance_category::Model> for CategoryView {
    fn from(m: substance_category::Model) -> Self {
        Self { id: m.id, name: m.name }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeView {
    pub id: i32,
    pub name: String,
    pub default_unit: Option<String>,
    pub category_id: i32,
    pub category: Option<CategoryView>,
}

impl TypeView {
    pub fn new(m: substance_type::Model, category: Option<substance_category::Model>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            default_unit: m.default_unit,
            category_id: m.category_id,
            category: category.map(CategoryView::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageView {
    pub id: i32,
    pub substance_type_id: i32,
    pub usage_date: DateTime<Utc>,
    pub notes: Option<String>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub unit: String,
    pub substance_type: Option<TypeView>,
}

impl UsageView {
    pub fn new(m: substance_usage::Model, substance_type: Option<TypeView>) -> Self {
        Self {
            id: m.id,
            substance_type_id: m.substance_type_id,
            usage_date: m.usage_date,
            notes: m.notes,
            amount: m.amount.normalize(),
            unit: m.unit,
            substance_type,
        }
    }
}

/// Body of `POST /categories` and `PUT /categories/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInput {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default_unit: Option<String>,
    pub category_id: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageInput {
    #[serde(default)]
    pub id: Option<i32>,
    pub substance_type_id: i32,
    /// Defaults to now on create; left unchanged on update when absent.
    #[serde(default)]
    pub usage_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Exact decimal; JSON numbers are read without going through `f64`.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    #[serde(default)]
    pub unit: String,
}

/// Filters for the usage list. All present filters must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageFilter {
    /// Inclusive lower bound.
    pub start_date: Option<DateTime<Utc>>,
    /// The whole day is included: rows before `end_date + 1 day` match.
    pub end_date: Option<DateTime<Utc>>,
    pub substance_type_id: Option<i32>,
    pub category_id: Option<i32>,
}

impl UsageFilter {
    pub fn end_exclusive(&self) -> Option<DateTime<Utc>> {
        self.end_date.map(|d| d + Duration::days(1))
    }
}

/// Parse a list bound given as a calendar date (midnight UTC), an RFC 3339
/// timestamp, or a date and time without offset (taken as UTC).
pub fn parse_date_bound(field: &str, raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    if let Ok(d) = DateTime::parse_from_rfc3339(raw) {
        return Ok(d.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ServiceError::Validation(format!("{field} must be a date (YYYY-MM-DD) or a timestamp")))
}

/// PUT bodies must name the record they update.
pub(crate) fn ensure_matching_id(path_id: i32, body_id: Option<i32>) -> Result<(), ServiceError> {
    if body_id != Some(path_id) {
        return Err(ServiceError::Validation("ID in URL must match ID in body".into()));
    }
    Ok(())
}
