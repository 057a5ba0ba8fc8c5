use std::{error::Error, fs, path::Path, time::Duration};

use clap::Parser;
use duckdb::AccessMode;
use gridwatch::{
    api::gridwatch::queries::ChartQuery,
    dashboard::{
        charts::{render_chart, Chart, DEFAULT_WINDOW, MIN_WINDOW},
        fanout::fetch_charts,
        page::{render_page, render_page_with_table},
    },
    db::prod_db::ProdDb,
    utils::lib_duckdb::open_with_retry,
};
use log::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,

    /// Warehouse file, overrides GRIDWATCH_DUCKDB_PATH
    #[arg(long)]
    duckdb: Option<String>,

    /// Rolling mean window for the demand chart
    #[arg(short, long, default_value_t = DEFAULT_WINDOW as u64,
        value_parser = clap::value_parser!(u64).range(MIN_WINDOW as u64..))]
    window: u64,

    /// Where to write the page
    #[arg(short, long, default_value = "gridwatch.html")]
    out: String,

    /// Also append the rows of this chart as an HTML table, e.g. demand-vs-production
    #[arg(short, long)]
    table: Option<ChartQuery>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let env_file = format!(".env/{}.env", args.env);
    if Path::new(&env_file).exists() {
        dotenvy::from_path(Path::new(&env_file))?;
    }
    let duckdb_path = args.duckdb.unwrap_or(ProdDb::gridwatch().duckdb_path);

    let conn = open_with_retry(&duckdb_path, 8, Duration::from_millis(25), AccessMode::ReadOnly)?;
    let results = fetch_charts(&conn, &ChartQuery::DASHBOARD).await?;
    let charts: Vec<Chart> = results
        .iter()
        .map(|(_, data)| render_chart(data, args.window as usize))
        .collect();

    let html = match args.table {
        Some(query) => {
            let data = match results.iter().find(|(q, _)| *q == query) {
                Some((_, data)) => data.clone(),
                None => query.run(&conn)?,
            };
            render_page_with_table(&charts, &data)
        }
        None => render_page(&charts),
    };
    fs::write(&args.out, html)?;
    info!("wrote {} charts to {}", charts.len(), args.out);
    Ok(())
}
