use std::env;

use crate::db::gridwatch::GridwatchArchive;

pub struct ProdDb {}

impl ProdDb {
    /// Paths come from `GRIDWATCH_RAW_PATH` and `GRIDWATCH_DUCKDB_PATH`, usually
    /// set in `.env/<env>.env`.  Default to files in the working directory.
    pub fn gridwatch() -> GridwatchArchive {
        GridwatchArchive {
            raw_path: env::var("GRIDWATCH_RAW_PATH").unwrap_or_else(|_| "gridwatch.parquet".to_string()),
            duckdb_path: env::var("GRIDWATCH_DUCKDB_PATH")
                .unwrap_or_else(|_| "data_warehouse.duckdb".to_string()),
        }
    }
}
