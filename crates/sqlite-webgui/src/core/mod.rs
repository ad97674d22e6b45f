pub mod connection;
pub mod limits;
pub mod query;
pub mod rows;
pub mod schema;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
