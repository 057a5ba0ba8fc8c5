use std::path::Path;

use actix_cors::Cors;
use actix_web::middleware::{self, Logger};
use actix_web::web::Data;
use actix_web::{get, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use env_logger::Env;
use gridwatch::api::gridwatch::{api_chart, api_charts, api_dashboard, read_only_pool};
use gridwatch::db::prod_db::ProdDb;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,

    /// Warehouse file, overrides GRIDWATCH_DUCKDB_PATH
    #[arg(long)]
    duckdb: Option<String>,

    /// Port number
    #[arg(short, long, default_value = "8111")]
    port: u16,
}

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Hello world!  This is the gridwatch server.")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let env_file = format!(".env/{}.env", args.env);
    if Path::new(&env_file).exists() {
        dotenvy::from_path(Path::new(&env_file)).map_err(std::io::Error::other)?;
    }
    let duckdb_path = args.duckdb.unwrap_or(ProdDb::gridwatch().duckdb_path);
    let pool = read_only_pool(&duckdb_path).map_err(std::io::Error::other)?;

    HttpServer::new(move || {
        let cors = Cors::permissive();
        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(Data::new(pool.clone()))
            .service(hello)
            .service(api_charts)
            .service(api_chart)
            .service(api_dashboard)
    })
    .bind(("127.0.0.1", args.port))?
    // .bind(("0.0.0.0", args.port))? // use this if you want to allow all connections
    .run()
    .await
}
