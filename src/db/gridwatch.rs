//! Star schema built from the gridwatch readings.
//!
//! ```text
//! input file -> raw_readings -> aggregate_main_table -> dim_time_table
//!                                                    -> dim_energy_table
//!                                                    -> dim_ict_table
//!                                                    -> fact_table
//! ```

pub mod aggregate;
pub mod columns;
#[cfg(test)]
pub mod fixtures;
pub mod loader;
pub mod schema;

use std::fmt;
use std::path::Path;

use duckdb::Connection;
use log::info;

use crate::Result;
use aggregate::{build_aggregate, Interval};
use loader::{load_raw, RAW_TABLE};
use schema::{build_energy_table, build_fact_table, build_ict_table, build_time_table, WriteMode};

use crate::utils::lib_duckdb::count_rows;

#[derive(Clone, Debug)]
pub struct GridwatchArchive {
    /// The parquet (or csv) snapshot of the readings.
    pub raw_path: String,
    pub duckdb_path: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub interval: Interval,
    pub mode: WriteMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub raw_rows: usize,
    pub aggregate_rows: usize,
    pub time_rows: usize,
    pub energy_rows: usize,
    pub ict_rows: usize,
    pub fact_rows: usize,
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "raw: {}, aggregate: {}, time: {}, energy: {}, ict: {}, fact: {}",
            self.raw_rows,
            self.aggregate_rows,
            self.time_rows,
            self.energy_rows,
            self.ict_rows,
            self.fact_rows
        )
    }
}

impl GridwatchArchive {
    /// Re-derive the whole warehouse from the raw file.
    pub fn rebuild(&self, options: &BuildOptions) -> Result<BuildSummary> {
        info!(
            "rebuilding {} from {} (interval: {}, mode: {}) ...",
            self.duckdb_path, self.raw_path, options.interval, options.mode
        );
        let conn = Connection::open(&self.duckdb_path)?;
        let summary = build_warehouse(&conn, Path::new(&self.raw_path), options)?;
        info!("done, {}", summary);
        Ok(summary)
    }
}

/// Load the input file, then build every table.
pub fn build_warehouse(
    conn: &Connection,
    input: &Path,
    options: &BuildOptions,
) -> Result<BuildSummary> {
    load_raw(conn, input)?;
    build_from_raw(conn, options)
}

/// Build every table from an already loaded `raw_readings`.
pub fn build_from_raw(conn: &Connection, options: &BuildOptions) -> Result<BuildSummary> {
    let raw_rows = count_rows(conn, RAW_TABLE)?;
    let aggregate_rows = build_aggregate(conn, options.interval, options.mode)?;
    let time_rows = build_time_table(conn, options.mode)?;
    let energy_rows = build_energy_table(conn, options.mode)?;
    let ict_rows = build_ict_table(conn, options.mode)?;
    let fact_rows = build_fact_table(conn, options.mode)?;
    Ok(BuildSummary {
        raw_rows,
        aggregate_rows,
        time_rows,
        energy_rows,
        ict_rows,
        fact_rows,
    })
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use duckdb::{AccessMode, Config, Connection};

    use crate::db::gridwatch::fixtures::{create_fixture, FIXTURE_TABLE};
    use crate::db::gridwatch::{BuildOptions, BuildSummary, GridwatchArchive};
    use crate::db::gridwatch::{aggregate::Interval, schema::WriteMode};
    use crate::utils::lib_duckdb::count_rows;

    #[test]
    fn test_rebuild_from_parquet() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let raw_path = dir.path().join("gridwatch.parquet");
        {
            let conn = Connection::open_in_memory()?;
            create_fixture(&conn)?;
            conn.execute_batch(&format!(
                "COPY {FIXTURE_TABLE} TO '{}' (FORMAT PARQUET);",
                raw_path.display()
            ))?;
        }
        let archive = GridwatchArchive {
            raw_path: raw_path.to_string_lossy().to_string(),
            duckdb_path: dir.path().join("data_warehouse.duckdb").to_string_lossy().to_string(),
        };
        let summary = archive.rebuild(&BuildOptions::default())?;
        assert_eq!(
            summary,
            BuildSummary {
                raw_rows: 48,
                aggregate_rows: 4,
                time_rows: 4,
                energy_rows: 4,
                ict_rows: 4,
                fact_rows: 4,
            }
        );

        // running it again gives the same warehouse
        let again = archive.rebuild(&BuildOptions {
            interval: Interval::Hour,
            mode: WriteMode::Merge,
        })?;
        assert_eq!(summary, again);

        // persisted tables are there, the raw copy is not
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        let conn = Connection::open_with_flags(&archive.duckdb_path, config)?;
        assert_eq!(count_rows(&conn, "fact_table")?, 4);
        assert!(count_rows(&conn, "raw_readings").is_err());
        Ok(())
    }

    #[test]
    fn test_daily_rebuild_replaces_hourly_rows() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let raw_path = dir.path().join("gridwatch.csv");
        {
            let conn = Connection::open_in_memory()?;
            create_fixture(&conn)?;
            conn.execute_batch(&format!(
                "COPY {FIXTURE_TABLE} TO '{}' (HEADER, DELIMITER ',');",
                raw_path.display()
            ))?;
        }
        let archive = GridwatchArchive {
            raw_path: raw_path.to_string_lossy().to_string(),
            duckdb_path: dir.path().join("wh.duckdb").to_string_lossy().to_string(),
        };
        archive.rebuild(&BuildOptions::default())?;
        let summary = archive.rebuild(&BuildOptions {
            interval: Interval::Day,
            mode: WriteMode::Replace,
        })?;
        assert_eq!(summary.aggregate_rows, 2);
        assert_eq!(summary.fact_rows, 2);
        Ok(())
    }
}
