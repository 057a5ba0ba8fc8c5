use std::fmt;
use std::str::FromStr;

use duckdb::Connection;
use itertools::Itertools;
use log::{debug, info};

use crate::db::gridwatch::aggregate::AGGREGATE_TABLE;
use crate::db::gridwatch::columns::{ENERGY_SOURCES, INTERCONNECTORS};
use crate::error::{GridwatchError, Result};
use crate::utils::lib_duckdb::{count_rows, quote_ident};

pub const TIME_TABLE: &str = "dim_time_table";
pub const ENERGY_TABLE: &str = "dim_energy_table";
pub const ICT_TABLE: &str = "dim_ict_table";
pub const FACT_TABLE: &str = "fact_table";

/// How a build treats tables that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Recreate the table, then upsert.  The table mirrors the current input.
    #[default]
    Replace,
    /// Create the table if missing, then upsert into the existing rows.
    Merge,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WriteMode::Replace => write!(f, "replace"),
            WriteMode::Merge => write!(f, "merge"),
        }
    }
}

impl FromStr for WriteMode {
    type Err = GridwatchError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(WriteMode::Replace),
            "merge" | "upsert" => Ok(WriteMode::Merge),
            _ => Err(GridwatchError::InvalidWriteMode(s.to_string())),
        }
    }
}

/// A warehouse table keyed by a surrogate `BIGINT` key.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub name: &'static str,
    pub key: &'static str,
    /// All columns, key included, with their DuckDB type.
    pub columns: Vec<(String, &'static str)>,
}

impl TableDef {
    pub fn new(name: &'static str, key: &'static str) -> TableDef {
        TableDef {
            name,
            key,
            columns: vec![(key.to_string(), "BIGINT")],
        }
    }

    pub fn column(mut self, name: &str, sql_type: &'static str) -> TableDef {
        self.columns.push((name.to_string(), sql_type));
        self
    }

    pub fn create_sql(&self, mode: WriteMode) -> String {
        let head = match mode {
            WriteMode::Replace => "CREATE OR REPLACE TABLE",
            WriteMode::Merge => "CREATE TABLE IF NOT EXISTS",
        };
        let cols = self
            .columns
            .iter()
            .map(|(name, sql_type)| {
                if name == self.key {
                    format!("{} {} PRIMARY KEY", quote_ident(name), sql_type)
                } else {
                    format!("{} {}", quote_ident(name), sql_type)
                }
            })
            .join(",\n    ");
        format!("{} {} (\n    {}\n);", head, self.name, cols)
    }

    /// Insert the rows of `stage`, overwriting every non-key column of the
    /// rows whose key already exists.
    pub fn upsert_sql(&self, stage: &str) -> String {
        let names = self.columns.iter().map(|(name, _)| quote_ident(name)).join(", ");
        let updates = self
            .columns
            .iter()
            .filter(|(name, _)| name != self.key)
            .map(|(name, _)| format!("{0} = excluded.{0}", quote_ident(name)))
            .join(",\n    ");
        format!(
            "INSERT INTO {} ({})\nSELECT {} FROM {}\nON CONFLICT ({}) DO UPDATE SET\n    {};",
            self.name,
            names,
            names,
            stage,
            quote_ident(self.key),
            updates
        )
    }
}

/// Stage the rows of `select` in a temporary table and upsert them into the
/// table.  Return the number of rows in the table afterwards.
pub fn write_table(
    conn: &Connection,
    def: &TableDef,
    select: &str,
    mode: WriteMode,
) -> Result<usize> {
    let stage = format!("{}_stage", def.name);
    let sql = format!(
        r#"
CREATE OR REPLACE TEMPORARY TABLE {stage} AS
{select};

{}

{}

DROP TABLE {stage};
"#,
        def.create_sql(mode),
        def.upsert_sql(&stage),
    );
    debug!("{}", sql);
    conn.execute_batch(&sql)?;
    let n = count_rows(conn, def.name)?;
    info!("  {} has {} rows", def.name, n);
    Ok(n)
}

pub fn time_table_def() -> TableDef {
    TableDef::new(TIME_TABLE, "time_id")
        .column("timestamp_id", "BIGINT")
        .column("time", "TIMESTAMP")
        .column("year", "BIGINT")
        .column("month", "BIGINT")
        .column("day", "BIGINT")
        .column("hour", "BIGINT")
}

pub fn energy_table_def() -> TableDef {
    ENERGY_SOURCES.iter().fold(
        TableDef::new(ENERGY_TABLE, "energy_id").column("timestamp_id", "BIGINT"),
        |def, name| def.column(name, "DOUBLE"),
    )
}

pub fn ict_table_def() -> TableDef {
    INTERCONNECTORS.iter().fold(
        TableDef::new(ICT_TABLE, "ict_id").column("timestamp_id", "BIGINT"),
        |def, (_, name)| def.column(name, "DOUBLE"),
    )
}

pub fn fact_table_def() -> TableDef {
    TableDef::new(FACT_TABLE, "fact_id")
        .column("time_id", "BIGINT")
        .column("energy_id", "BIGINT")
        .column("ict_id", "BIGINT")
        .column("total_demand", "DOUBLE")
        .column("avg_frequency", "DOUBLE")
}

/// Calendar breakdown of every aggregate bucket.
pub fn build_time_table(conn: &Connection, mode: WriteMode) -> Result<usize> {
    info!("building {} ...", TIME_TABLE);
    let select = format!(
        r#"
SELECT
    ROW_NUMBER() OVER (ORDER BY timestamp_id) AS time_id,
    timestamp_id,
    time,
    EXTRACT(YEAR FROM time) AS year,
    EXTRACT(MONTH FROM time) AS month,
    EXTRACT(DAY FROM time) AS day,
    EXTRACT(HOUR FROM time) AS hour
FROM {AGGREGATE_TABLE}"#
    );
    write_table(conn, &time_table_def(), &select, mode)
}

pub fn build_energy_table(conn: &Connection, mode: WriteMode) -> Result<usize> {
    info!("building {} ...", ENERGY_TABLE);
    let select = format!(
        r#"
SELECT
    ROW_NUMBER() OVER (ORDER BY timestamp_id) AS energy_id,
    timestamp_id,
    {}
FROM {AGGREGATE_TABLE}"#,
        ENERGY_SOURCES.iter().map(|e| quote_ident(e)).join(",\n    ")
    );
    write_table(conn, &energy_table_def(), &select, mode)
}

pub fn build_ict_table(conn: &Connection, mode: WriteMode) -> Result<usize> {
    info!("building {} ...", ICT_TABLE);
    let select = format!(
        r#"
SELECT
    ROW_NUMBER() OVER (ORDER BY timestamp_id) AS ict_id,
    timestamp_id,
    {}
FROM {AGGREGATE_TABLE}"#,
        INTERCONNECTORS
            .iter()
            .map(|(source, name)| format!("{} AS {}", quote_ident(source), quote_ident(name)))
            .join(",\n    ")
    );
    write_table(conn, &ict_table_def(), &select, mode)
}

/// One fact row per aggregate bucket, pointing at the three dimensions.
pub fn build_fact_table(conn: &Connection, mode: WriteMode) -> Result<usize> {
    info!("building {} ...", FACT_TABLE);
    let select = format!(
        r#"
SELECT
    ROW_NUMBER() OVER (ORDER BY t.timestamp_id) AS fact_id,
    t.time_id,
    e.energy_id,
    i.ict_id,
    a.demand AS total_demand,
    a.avg_frequency AS avg_frequency
FROM {TIME_TABLE} t
JOIN {ENERGY_TABLE} e
    ON t.timestamp_id = e.timestamp_id
JOIN {ICT_TABLE} i
    ON t.timestamp_id = i.timestamp_id
JOIN {AGGREGATE_TABLE} a
    ON t.timestamp_id = a.timestamp_id"#
    );
    write_table(conn, &fact_table_def(), &select, mode)
}
