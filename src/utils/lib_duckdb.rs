use std::path::Path;
use std::time::Duration;

use duckdb::{AccessMode, Config, Connection};
use log::warn;

/// Use this function to open a DuckDB connection while another process may
/// hold the write lock (e.g. a warehouse rebuild in progress).
/// Suggested `max_attempts = 8`, `initial_wait = Duration::from_millis(25)`.
pub fn open_with_retry<P: AsRef<Path>>(
    duckdb_path: P,
    max_attempts: u32,
    initial_wait: Duration,
    access_mode: AccessMode,
) -> Result<Connection, duckdb::Error> {
    let mut attempts = 0;
    let mut wait_duration = initial_wait;

    loop {
        // `AccessMode` is not `Clone` in duckdb 1.3.2; rebuild the same variant.
        let mode = match access_mode {
            AccessMode::Automatic => AccessMode::Automatic,
            AccessMode::ReadOnly => AccessMode::ReadOnly,
            AccessMode::ReadWrite => AccessMode::ReadWrite,
        };
        let config = Config::default().access_mode(mode)?;
        match Connection::open_with_flags(duckdb_path.as_ref(), config) {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                attempts += 1;
                if attempts >= max_attempts {
                    return Err(e);
                }
                warn!(
                    "Retrying DuckDB open after error: {} (attempt {}/{})",
                    e, attempts, max_attempts
                );
                std::thread::sleep(wait_duration);
                wait_duration *= 2;
            }
        }
    }
}

/// Quote an identifier for DuckDB, e.g. a column name with spaces.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal, e.g. a file path.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<usize, duckdb::Error> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {};", table), [], |row| {
        row.get(0)
    })?;
    Ok(n as usize)
}
