//! Four hours of 5-minute readings straddling a new year, for tests.
//!
//! 2023-12-31 22:00 to 2024-01-01 01:55, 48 readings plus one duplicate.
//! `demand` is `100 + hour`, `frequency` alternates 49.9/50.1 over the hour,
//! `wind` is 2.0 and every other measure is 1.0.  A few column names carry
//! stray whitespace.

use duckdb::Connection;

use crate::db::gridwatch::columns::{ENERGY_SOURCES, INTERCONNECTORS};
use crate::db::gridwatch::{build_from_raw, loader::load_relation, BuildOptions, BuildSummary};
use crate::utils::lib_duckdb::quote_ident;
use crate::Result;

pub const FIXTURE_TABLE: &str = "fixture_readings";

pub fn fixture_sql() -> String {
    let mut cols = vec![
        r#"strftime(ts, '%Y-%m-%d %H:%M:%S') AS " timestamp""#.to_string(),
        r#"(100.0 + hour(ts))::DOUBLE AS "demand ""#.to_string(),
        "(CASE WHEN minute(ts) < 30 THEN 49.9 ELSE 50.1 END)::DOUBLE AS frequency".to_string(),
    ];
    for name in ENERGY_SOURCES {
        let value = if name == "wind" { "2.0" } else { "1.0" };
        let alias = if name == "coal" { " coal " } else { name };
        cols.push(format!("{}::DOUBLE AS {}", value, quote_ident(alias)));
    }
    for (name, _) in INTERCONNECTORS {
        cols.push(format!("1.0::DOUBLE AS {}", quote_ident(name)));
    }
    format!(
        r#"
CREATE OR REPLACE TABLE {FIXTURE_TABLE} AS
WITH readings AS (
    SELECT
        {}
    FROM generate_series(
        TIMESTAMP '2023-12-31 22:00:00',
        TIMESTAMP '2024-01-01 01:55:00',
        INTERVAL 5 MINUTE
    ) AS t(ts)
)
SELECT * FROM readings
UNION ALL
(SELECT * FROM readings ORDER BY " timestamp" LIMIT 1);
"#,
        cols.join(",\n        ")
    )
}

pub fn create_fixture(conn: &Connection) -> Result<()> {
    conn.execute_batch(&fixture_sql())?;
    Ok(())
}

/// Fixture loaded and the warehouse built with default options.
pub fn warehouse(conn: &Connection) -> Result<BuildSummary> {
    create_fixture(conn)?;
    load_relation(conn, FIXTURE_TABLE)?;
    build_from_raw(conn, &BuildOptions::default())
}
