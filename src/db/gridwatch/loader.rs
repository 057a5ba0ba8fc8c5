use std::collections::HashSet;
use std::path::Path;

use duckdb::Connection;
use itertools::Itertools;
use log::{debug, info};

use crate::db::gridwatch::columns::required_source_columns;
use crate::error::{GridwatchError, Result};
use crate::utils::lib_duckdb::{count_rows, quote_ident, quote_literal};

/// Cleaned copy of the input, one row per distinct reading.
pub const RAW_TABLE: &str = "raw_readings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Parquet,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<InputFormat> {
        let name = path
            .file_name()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        if name.ends_with(".parquet") {
            Ok(InputFormat::Parquet)
        } else if name.ends_with(".csv") || name.ends_with(".csv.gz") {
            Ok(InputFormat::Csv)
        } else {
            Err(GridwatchError::UnsupportedFormat(path.display().to_string()))
        }
    }

    /// The DuckDB table function reading this file.
    pub fn reader(&self, path: &Path) -> String {
        let path = quote_literal(&path.to_string_lossy());
        match self {
            InputFormat::Parquet => format!("read_parquet({})", path),
            InputFormat::Csv => format!("read_csv({}, header = true)", path),
        }
    }
}

/// Load a parquet or csv snapshot into [`RAW_TABLE`].  Return the number of
/// distinct rows.
pub fn load_raw(conn: &Connection, path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(GridwatchError::NotFound(path.display().to_string()));
    }
    let format = InputFormat::from_path(path)?;
    info!("loading {:?} file {} ...", format, path.display());
    load_relation(conn, &format.reader(path))
}

/// Load any relation DuckDB can select from (a table, a view or a table
/// function call) into [`RAW_TABLE`], stripping whitespace from the column
/// names and dropping duplicate rows.
pub fn load_relation(conn: &Connection, relation: &str) -> Result<usize> {
    let columns = describe(conn, relation)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut renames: Vec<String> = Vec::with_capacity(columns.len());
    for column in &columns {
        let name = column.trim().to_string();
        if !seen.insert(name.clone()) {
            return Err(GridwatchError::DuplicateColumn(name));
        }
        renames.push(format!("{} AS {}", quote_ident(column), quote_ident(&name)));
    }

    let missing: Vec<&str> = required_source_columns()
        .into_iter()
        .filter(|c| !seen.contains(*c))
        .collect();
    if !missing.is_empty() {
        return Err(GridwatchError::MissingColumns {
            table: relation.to_string(),
            columns: missing.iter().join(", "),
        });
    }

    let sql = format!(
        r#"
CREATE OR REPLACE TEMPORARY TABLE {RAW_TABLE} AS
    SELECT DISTINCT
        {}
    FROM {};
"#,
        renames.iter().join(",\n        "),
        relation,
    );
    debug!("{}", sql);
    conn.execute_batch(&sql)?;

    let n = count_rows(conn, RAW_TABLE)?;
    info!("  loaded {} distinct rows", n);
    Ok(n)
}

/// Column names of a relation, as they are in the source.
fn describe(conn: &Connection, relation: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("DESCRIBE SELECT * FROM {};", relation))?;
    let names = stmt
        .query_map([], |row| row.get::<usize, String>(0))?
        .collect::<std::result::Result<Vec<String>, duckdb::Error>>()?;
    Ok(names)
}
