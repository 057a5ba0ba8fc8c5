use duckdb::Connection;
use futures::future::join_all;
use log::debug;

use crate::api::gridwatch::queries::{ChartData, ChartQuery};
use crate::error::{GridwatchError, Result};

/// Run the queries concurrently on tokio's blocking pool, each on its own
/// clone of `conn`.  Results come back in the order of `queries`.
pub async fn fetch_charts(
    conn: &Connection,
    queries: &[ChartQuery],
) -> Result<Vec<(ChartQuery, ChartData)>> {
    let mut tasks = Vec::with_capacity(queries.len());
    for &query in queries {
        let conn = conn.try_clone()?;
        tasks.push(tokio::task::spawn_blocking(move || {
            debug!("running query {} ...", query);
            let data = query.run(&conn);
            debug!("  query {} done", query);
            data
        }));
    }

    let mut out = Vec::with_capacity(queries.len());
    for (query, joined) in queries.iter().zip(join_all(tasks).await) {
        let data = joined.map_err(|e| GridwatchError::Task(format!("{}: {}", query, e)))??;
        out.push((*query, data));
    }
    Ok(out)
}
