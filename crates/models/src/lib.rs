pub mod errors;
pub mod db;
pub mod substance_category;
pub mod substance_type;
pub mod substance_usage;

#[cfg(test)]
mod tests;
