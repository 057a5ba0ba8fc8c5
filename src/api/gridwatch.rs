pub mod queries;

use actix_web::{get, web, HttpResponse, Responder};
use duckdb::{AccessMode, Config, DuckdbConnectionManager};
use serde::Serialize;

use crate::dashboard::fanout::fetch_charts;
use queries::{ChartData, ChartQuery};

pub type DbPool = r2d2::Pool<DuckdbConnectionManager>;

/// Pool of read-only connections to the warehouse.
pub fn read_only_pool(duckdb_path: &str) -> crate::Result<DbPool> {
    let config = Config::default().access_mode(AccessMode::ReadOnly)?;
    let manager = DuckdbConnectionManager::file_with_flags(duckdb_path, config)?;
    Ok(r2d2::Pool::builder().build(manager)?)
}

#[derive(Debug, Serialize)]
struct ChartResponse {
    chart: &'static str,
    title: &'static str,
    rows: ChartData,
}

/// Names of all the charts the server knows about.
#[get("/gridwatch/charts")]
pub async fn api_charts() -> impl Responder {
    let names: Vec<&str> = ChartQuery::ALL.iter().map(|q| q.name()).collect();
    HttpResponse::Ok().json(names)
}

/// Rows for one chart, e.g.
/// http://127.0.0.1:8111/gridwatch/chart/demand-vs-production
#[get("/gridwatch/chart/{name}")]
pub async fn api_chart(path: web::Path<String>, pool: web::Data<DbPool>) -> impl Responder {
    let query = match path.parse::<ChartQuery>() {
        Ok(q) => q,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };
    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    match query.run(&conn) {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// The five dashboard charts, queried concurrently, in display order.
#[get("/gridwatch/dashboard")]
pub async fn api_dashboard(pool: web::Data<DbPool>) -> impl Responder {
    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    match fetch_charts(&conn, &ChartQuery::DASHBOARD).await {
        Ok(charts) => {
            let out: Vec<ChartResponse> = charts
                .into_iter()
                .map(|(q, rows)| ChartResponse {
                    chart: q.name(),
                    title: q.title(),
                    rows,
                })
                .collect();
            HttpResponse::Ok().json(out)
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web::Data, App};
    use duckdb::DuckdbConnectionManager;

    use crate::api::gridwatch::queries::{DemandProductionRow, HourlyDemandRow};
    use crate::api::gridwatch::{api_chart, api_charts, api_dashboard, DbPool};
    use crate::db::gridwatch::fixtures;

    fn pool() -> DbPool {
        let manager = DuckdbConnectionManager::memory().unwrap();
        let pool = r2d2::Pool::builder().max_size(4).build(manager).unwrap();
        fixtures::warehouse(&pool.get().unwrap()).unwrap();
        pool
    }

    fn empty_pool() -> DbPool {
        let manager = DuckdbConnectionManager::memory().unwrap();
        r2d2::Pool::builder().max_size(2).build(manager).unwrap()
    }

    #[actix_web::test]
    async fn test_chart_names() {
        let app = test::init_service(App::new().service(api_charts)).await;
        let req = test::TestRequest::get().uri("/gridwatch/charts").to_request();
        let names: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "demand-over-time");
    }

    #[actix_web::test]
    async fn test_one_chart() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(pool()))
                .service(api_chart),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/gridwatch/chart/demand-during-sleep")
            .to_request();
        let rows: Vec<HourlyDemandRow> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].hour, 0);

        let req = test::TestRequest::get()
            .uri("/gridwatch/chart/demand-vs-production")
            .to_request();
        let rows: Vec<DemandProductionRow> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2023, 2024]);

        let req = test::TestRequest::get()
            .uri("/gridwatch/chart/pie-chart")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_dashboard() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(pool()))
                .service(api_dashboard),
        )
        .await;
        let req = test::TestRequest::get().uri("/gridwatch/dashboard").to_request();
        let value: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let charts = value.as_array().unwrap();
        assert_eq!(charts.len(), 5);
        assert_eq!(charts[0]["chart"], "demand-over-time");
        assert_eq!(charts[4]["title"], "Demand vs Production");
        assert_eq!(charts[2]["rows"].as_array().unwrap().len(), 4);
    }

    #[actix_web::test]
    async fn test_query_failure_is_server_error() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(empty_pool()))
                .service(api_chart)
                .service(api_dashboard),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/gridwatch/chart/demand-over-time")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("fact_table"));

        let req = test::TestRequest::get().uri("/gridwatch/dashboard").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
