pub mod gridwatch;
pub mod prod_db;
