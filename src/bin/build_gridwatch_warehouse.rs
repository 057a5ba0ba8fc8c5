use std::{error::Error, path::Path};

use clap::Parser;
use gridwatch::db::{
    gridwatch::{aggregate::Interval, schema::WriteMode, BuildOptions},
    prod_db::ProdDb,
};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,

    /// Raw readings file (.parquet, .csv or .csv.gz), overrides GRIDWATCH_RAW_PATH
    #[arg(long)]
    raw: Option<String>,

    /// Warehouse file, overrides GRIDWATCH_DUCKDB_PATH
    #[arg(long)]
    duckdb: Option<String>,

    /// Bucket width, e.g. hour, day, 30min
    #[arg(short, long, default_value = "hour")]
    interval: Interval,

    /// replace or merge
    #[arg(short, long, default_value = "replace")]
    mode: WriteMode,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let env_file = format!(".env/{}.env", args.env);
    if Path::new(&env_file).exists() {
        dotenvy::from_path(Path::new(&env_file))?;
    }

    let mut archive = ProdDb::gridwatch();
    if let Some(raw) = args.raw {
        archive.raw_path = raw;
    }
    if let Some(duckdb) = args.duckdb {
        archive.duckdb_path = duckdb;
    }

    let options = BuildOptions {
        interval: args.interval,
        mode: args.mode,
    };
    match archive.rebuild(&options) {
        Ok(summary) => info!("{}", summary),
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
