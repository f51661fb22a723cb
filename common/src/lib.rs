pub mod models;
pub mod protocol;
