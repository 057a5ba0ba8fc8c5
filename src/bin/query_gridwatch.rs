use std::{error::Error, path::Path, time::Duration};

use clap::{Parser, ValueEnum};
use duckdb::AccessMode;
use gridwatch::{
    api::gridwatch::queries::{ChartData, ChartQuery},
    db::prod_db::ProdDb,
    utils::lib_duckdb::open_with_retry,
};
use tabled::{builder::Builder, settings::Style};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Table,
    Csv,
    Json,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,

    /// Warehouse file, overrides GRIDWATCH_DUCKDB_PATH
    #[arg(long)]
    duckdb: Option<String>,

    /// Chart name, e.g. demand-vs-production
    #[arg(short, long)]
    query: ChartQuery,

    #[arg(short, long, value_enum, default_value = "table")]
    format: Format,
}

/// Make an ASCII table from the data
fn ascii_table(data: &ChartData) -> tabled::Table {
    let mut builder = Builder::new();
    builder.push_record(data.header());
    for record in data.records() {
        builder.push_record(record);
    }
    let mut table = builder.build();
    table.with(Style::empty());
    table
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let env_file = format!(".env/{}.env", args.env);
    if Path::new(&env_file).exists() {
        dotenvy::from_path(Path::new(&env_file))?;
    }
    let duckdb_path = args.duckdb.unwrap_or(ProdDb::gridwatch().duckdb_path);

    let conn = open_with_retry(&duckdb_path, 8, Duration::from_millis(25), AccessMode::ReadOnly)?;
    let data = args.query.run(&conn)?;
    match args.format {
        Format::Table => println!("{}", ascii_table(&data)),
        Format::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(data.header())?;
            for record in data.records() {
                wtr.write_record(&record)?;
            }
            wtr.flush()?;
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&data)?),
    }
    Ok(())
}
