//! Service layer providing the validation and integrity rules of the CRUD API.
//! - Every write runs in one transaction: checks and the write share it.
//! - Constraint violations raised by the database are mapped to the same
//!   outcomes as the explicit pre-checks.
//! - Reuses validation and entity definitions in the `models` crate.

pub mod errors;
pub mod domain;
pub mod category_service;
pub mod type_service;
pub mod usage_service;
#[cfg(test)]
pub mod test_support;
