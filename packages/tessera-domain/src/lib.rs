pub mod keywords;
pub mod query;
