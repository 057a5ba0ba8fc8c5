use std::fmt;
use std::str::FromStr;

use duckdb::Connection;
use itertools::Itertools;
use log::info;

use crate::db::gridwatch::columns::{measures, TIMESTAMP_COLUMN};
use crate::db::gridwatch::loader::RAW_TABLE;
use crate::db::gridwatch::schema::{write_table, TableDef, WriteMode};
use crate::error::{GridwatchError, Result};
use crate::utils::lib_duckdb::quote_ident;

pub const AGGREGATE_TABLE: &str = "aggregate_main_table";

/// Width of the buckets readings are rolled up into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interval {
    Minutes(u32),
    #[default]
    Hour,
    Day,
}

impl Interval {
    /// SQL expression truncating `column` to the start of its bucket.
    pub fn bucket_expr(&self, column: &str) -> String {
        let ts = format!("CAST({} AS TIMESTAMP)", quote_ident(column));
        match self {
            Interval::Minutes(n) => format!("TIME_BUCKET(INTERVAL '{} minutes', {})", n, ts),
            Interval::Hour => format!("DATE_TRUNC('hour', {})", ts),
            Interval::Day => format!("DATE_TRUNC('day', {})::TIMESTAMP", ts),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Interval::Minutes(n) => write!(f, "{}min", n),
            Interval::Hour => write!(f, "hour"),
            Interval::Day => write!(f, "day"),
        }
    }
}

impl FromStr for Interval {
    type Err = GridwatchError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "hour" | "hourly" | "1h" | "60min" => Ok(Interval::Hour),
            "day" | "daily" | "1d" => Ok(Interval::Day),
            _ => match s.strip_suffix("min").map(|n| n.parse::<u32>()) {
                Some(Ok(0)) | Some(Err(_)) | None => Err(GridwatchError::InvalidInterval(s.to_string())),
                Some(Ok(n)) => Ok(Interval::Minutes(n)),
            },
        }
    }
}

pub fn aggregate_table_def() -> TableDef {
    measures().iter().fold(
        TableDef::new(AGGREGATE_TABLE, "timestamp_id").column("time", "TIMESTAMP"),
        |def, m| def.column(m.alias, "DOUBLE"),
    )
}

pub fn aggregate_select(interval: Interval) -> String {
    let aggs = measures()
        .iter()
        .map(|m| {
            format!(
                "{}({}) AS {}",
                m.aggregation.sql(),
                quote_ident(m.source),
                quote_ident(m.alias)
            )
        })
        .join(",\n        ");
    format!(
        r#"
WITH data_aggregate AS (
    SELECT
        {} AS time,
        {}
    FROM {RAW_TABLE}
    WHERE {} IS NOT NULL
    GROUP BY 1
)
SELECT
    ROW_NUMBER() OVER (ORDER BY time) AS timestamp_id,
    *
FROM data_aggregate"#,
        interval.bucket_expr(TIMESTAMP_COLUMN),
        aggs,
        quote_ident(TIMESTAMP_COLUMN),
    )
}

/// Roll [`RAW_TABLE`] up into fixed intervals and write `aggregate_main_table`.
/// Buckets are numbered from 1 in time order.
pub fn build_aggregate(conn: &Connection, interval: Interval, mode: WriteMode) -> Result<usize> {
    info!("aggregating readings by {} ...", interval);
    write_table(conn, &aggregate_table_def(), &aggregate_select(interval), mode)
}
