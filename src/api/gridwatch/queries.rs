use std::fmt;
use std::str::FromStr;

use duckdb::Connection;
use itertools::Itertools;
use jiff::{
    civil::{Date, DateTime},
    tz::TimeZone,
    Timestamp,
};
use serde::{Deserialize, Serialize};

use crate::db::gridwatch::aggregate::AGGREGATE_TABLE;
use crate::db::gridwatch::columns::{
    interconnector_names, ENERGY_SOURCES, EXCLUDED_FROM_PRODUCTION,
};
use crate::db::gridwatch::schema::{ENERGY_TABLE, FACT_TABLE, ICT_TABLE, TIME_TABLE};
use crate::error::GridwatchError;
use crate::utils::lib_duckdb::quote_ident;

/// The canned queries behind each chart.  None of them take parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartQuery {
    DemandOverTime,
    EnergyContribution,
    DemandDuringSleep,
    IctVisualization,
    DemandVsProduction,
    IctContribution,
}

impl ChartQuery {
    /// The dashboard charts, in display order.
    pub const DASHBOARD: [ChartQuery; 5] = [
        ChartQuery::DemandOverTime,
        ChartQuery::EnergyContribution,
        ChartQuery::DemandDuringSleep,
        ChartQuery::IctVisualization,
        ChartQuery::DemandVsProduction,
    ];

    pub const ALL: [ChartQuery; 6] = [
        ChartQuery::DemandOverTime,
        ChartQuery::EnergyContribution,
        ChartQuery::DemandDuringSleep,
        ChartQuery::IctVisualization,
        ChartQuery::DemandVsProduction,
        ChartQuery::IctContribution,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChartQuery::DemandOverTime => "demand-over-time",
            ChartQuery::EnergyContribution => "energy-contribution",
            ChartQuery::DemandDuringSleep => "demand-during-sleep",
            ChartQuery::IctVisualization => "ict-visualization",
            ChartQuery::DemandVsProduction => "demand-vs-production",
            ChartQuery::IctContribution => "ict-contribution",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartQuery::DemandOverTime => "Demand Over Time",
            ChartQuery::EnergyContribution => "Energy Contribution",
            ChartQuery::DemandDuringSleep => "Demand During Sleep",
            ChartQuery::IctVisualization => "ICT Visualization",
            ChartQuery::DemandVsProduction => "Demand vs Production",
            ChartQuery::IctContribution => "ICT Contribution",
        }
    }

    /// Names of the value columns that follow the key columns.
    pub fn value_columns(&self) -> Vec<String> {
        match self {
            ChartQuery::DemandOverTime => vec!["total_demand".to_string()],
            ChartQuery::EnergyContribution => {
                ENERGY_SOURCES.iter().map(|e| e.to_string()).collect()
            }
            ChartQuery::DemandDuringSleep => vec!["avg_demand".to_string()],
            ChartQuery::IctVisualization => interconnector_names()
                .iter()
                .map(|e| format!("avg_{}", e))
                .collect(),
            ChartQuery::DemandVsProduction => vec![
                "total_demand".to_string(),
                "total_production".to_string(),
                "avg_frequency".to_string(),
            ],
            ChartQuery::IctContribution => interconnector_names()
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    pub fn sql(&self) -> String {
        match self {
            ChartQuery::DemandOverTime => format!(
                r#"
SELECT
    epoch_us(t.time) AS time,
    AVG(f.total_demand) AS total_demand
FROM {FACT_TABLE} f
JOIN {TIME_TABLE} t
    ON f.time_id = t.time_id
GROUP BY t.time
ORDER BY t.time;
"#
            ),
            ChartQuery::EnergyContribution => format!(
                r#"
SELECT
    t.year::SMALLINT AS year,
    t.month::TINYINT AS month,
    t.day::TINYINT AS day,
    {}
FROM {FACT_TABLE} f
JOIN {TIME_TABLE} t
    ON f.time_id = t.time_id
JOIN {ENERGY_TABLE} e
    ON f.energy_id = e.energy_id
GROUP BY t.year, t.month, t.day
ORDER BY t.year, t.month, t.day;
"#,
                ENERGY_SOURCES
                    .iter()
                    .map(|c| format!("SUM(e.{0}) AS {0}", quote_ident(c)))
                    .join(",\n    ")
            ),
            ChartQuery::DemandDuringSleep => format!(
                r#"
SELECT
    EXTRACT(HOUR FROM time)::TINYINT AS hour,
    AVG(demand) AS avg_demand
FROM {AGGREGATE_TABLE}
GROUP BY 1
ORDER BY 1;
"#
            ),
            ChartQuery::IctVisualization => format!(
                r#"
SELECT
    t.year::SMALLINT AS year,
    {}
FROM {FACT_TABLE} f
JOIN {TIME_TABLE} t
    ON f.time_id = t.time_id
JOIN {ICT_TABLE} i
    ON f.ict_id = i.ict_id
GROUP BY t.year
ORDER BY t.year;
"#,
                interconnector_names()
                    .iter()
                    .map(|c| format!(
                        "AVG(i.{}) AS {}",
                        quote_ident(c),
                        quote_ident(&format!("avg_{}", c))
                    ))
                    .join(",\n    ")
            ),
            ChartQuery::DemandVsProduction => format!(
                r#"
SELECT
    t.year::SMALLINT AS year,
    SUM(f.total_demand) AS total_demand,
    SUM({}) AS total_production,
    AVG(f.avg_frequency) AS avg_frequency
FROM {FACT_TABLE} f
JOIN {TIME_TABLE} t
    ON f.time_id = t.time_id
JOIN {ENERGY_TABLE} p
    ON f.energy_id = p.energy_id
JOIN {ICT_TABLE} i
    ON f.ict_id = i.ict_id
GROUP BY t.year
ORDER BY t.year;
"#,
                production_expr()
            ),
            ChartQuery::IctContribution => format!(
                r#"
SELECT
    t.year::SMALLINT AS year,
    t.month::TINYINT AS month,
    t.day::TINYINT AS day,
    {}
FROM {FACT_TABLE} f
JOIN {TIME_TABLE} t
    ON f.time_id = t.time_id
JOIN {ICT_TABLE} i
    ON f.ict_id = i.ict_id
GROUP BY t.year, t.month, t.day
ORDER BY t.year, t.month, t.day;
"#,
                interconnector_names()
                    .iter()
                    .map(|c| format!("SUM(i.{0}) AS {0}", quote_ident(c)))
                    .join(",\n    ")
            ),
        }
    }

    pub fn run(&self, conn: &Connection) -> crate::Result<ChartData> {
        let sql = self.sql();
        let data = match self {
            ChartQuery::DemandOverTime => ChartData::DemandOverTime(get_demand_over_time(conn, &sql)?),
            ChartQuery::EnergyContribution => {
                ChartData::EnergyContribution(get_daily_mix(conn, &sql, ENERGY_SOURCES.len())?)
            }
            ChartQuery::DemandDuringSleep => {
                ChartData::DemandDuringSleep(get_hourly_demand(conn, &sql)?)
            }
            ChartQuery::IctVisualization => {
                ChartData::IctVisualization(get_yearly_ict(conn, &sql, interconnector_names().len())?)
            }
            ChartQuery::DemandVsProduction => {
                ChartData::DemandVsProduction(get_demand_vs_production(conn, &sql)?)
            }
            ChartQuery::IctContribution => {
                ChartData::IctContribution(get_daily_mix(conn, &sql, interconnector_names().len())?)
            }
        };
        Ok(data)
    }
}

impl fmt::Display for ChartQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ChartQuery {
    type Err = GridwatchError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase().replace('_', "-");
        ChartQuery::ALL
            .into_iter()
            .find(|q| q.name() == name)
            .ok_or_else(|| GridwatchError::UnknownChart(s.to_string()))
    }
}

/// Every energy source plus every interconnector except East-West, summed per row.
fn production_expr() -> String {
    let sources = ENERGY_SOURCES.iter().map(|c| format!("p.{}", quote_ident(c)));
    let flows = interconnector_names()
        .into_iter()
        .filter(|c| *c != EXCLUDED_FROM_PRODUCTION)
        .map(|c| format!("i.{}", quote_ident(c)));
    sources.chain(flows).join(" + ")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRow {
    pub time: DateTime,
    pub total_demand: Option<f64>,
}

/// One calendar day, values in the order of [`ChartQuery::value_columns`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMixRow {
    pub date: Date,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyDemandRow {
    pub hour: i8,
    pub avg_demand: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyIctRow {
    pub year: i16,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandProductionRow {
    pub year: i16,
    pub total_demand: Option<f64>,
    pub total_production: Option<f64>,
    pub avg_frequency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartData {
    DemandOverTime(Vec<DemandRow>),
    EnergyContribution(Vec<DailyMixRow>),
    DemandDuringSleep(Vec<HourlyDemandRow>),
    IctVisualization(Vec<YearlyIctRow>),
    DemandVsProduction(Vec<DemandProductionRow>),
    IctContribution(Vec<DailyMixRow>),
}

impl ChartData {
    pub fn query(&self) -> ChartQuery {
        match self {
            ChartData::DemandOverTime(_) => ChartQuery::DemandOverTime,
            ChartData::EnergyContribution(_) => ChartQuery::EnergyContribution,
            ChartData::DemandDuringSleep(_) => ChartQuery::DemandDuringSleep,
            ChartData::IctVisualization(_) => ChartQuery::IctVisualization,
            ChartData::DemandVsProduction(_) => ChartQuery::DemandVsProduction,
            ChartData::IctContribution(_) => ChartQuery::IctContribution,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChartData::DemandOverTime(rs) => rs.len(),
            ChartData::EnergyContribution(rs) | ChartData::IctContribution(rs) => rs.len(),
            ChartData::DemandDuringSleep(rs) => rs.len(),
            ChartData::IctVisualization(rs) => rs.len(),
            ChartData::DemandVsProduction(rs) => rs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names for tabular output.
    pub fn header(&self) -> Vec<String> {
        let keys: Vec<&str> = match self {
            ChartData::DemandOverTime(_) => vec!["time"],
            ChartData::EnergyContribution(_) | ChartData::IctContribution(_) => vec!["date"],
            ChartData::DemandDuringSleep(_) => vec!["hour"],
            ChartData::IctVisualization(_) | ChartData::DemandVsProduction(_) => vec!["year"],
        };
        keys.into_iter()
            .map(|e| e.to_string())
            .chain(self.query().value_columns())
            .collect()
    }

    /// Rows as strings, NULLs as empty strings.
    pub fn records(&self) -> Vec<Vec<String>> {
        fn with_key(key: String, values: &[Option<f64>]) -> Vec<String> {
            std::iter::once(key)
                .chain(values.iter().map(|v| fmt_value(*v)))
                .collect()
        }
        match self {
            ChartData::DemandOverTime(rs) => rs
                .iter()
                .map(|r| with_key(r.time.to_string(), &[r.total_demand]))
                .collect(),
            ChartData::EnergyContribution(rs) | ChartData::IctContribution(rs) => rs
                .iter()
                .map(|r| with_key(r.date.to_string(), &r.values))
                .collect(),
            ChartData::DemandDuringSleep(rs) => rs
                .iter()
                .map(|r| with_key(r.hour.to_string(), &[r.avg_demand]))
                .collect(),
            ChartData::IctVisualization(rs) => rs
                .iter()
                .map(|r| with_key(r.year.to_string(), &r.values))
                .collect(),
            ChartData::DemandVsProduction(rs) => rs
                .iter()
                .map(|r| {
                    with_key(
                        r.year.to_string(),
                        &[r.total_demand, r.total_production, r.avg_frequency],
                    )
                })
                .collect(),
        }
    }
}

pub fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "".to_string(),
    }
}

fn get_values(row: &duckdb::Row, first: usize, count: usize) -> duckdb::Result<Vec<Option<f64>>> {
    (first..first + count)
        .map(|i| row.get::<usize, Option<f64>>(i))
        .collect()
}

pub fn get_demand_over_time(conn: &Connection, query: &str) -> crate::Result<Vec<DemandRow>> {
    let mut stmt = conn.prepare(query)?;
    let raw: Vec<(i64, Option<f64>)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<duckdb::Result<_>>()?;
    let mut rows = Vec::with_capacity(raw.len());
    for (micro, total_demand) in raw {
        rows.push(DemandRow {
            time: Timestamp::from_microsecond(micro)?
                .to_zoned(TimeZone::UTC)
                .datetime(),
            total_demand,
        });
    }
    Ok(rows)
}

pub fn get_daily_mix(
    conn: &Connection,
    query: &str,
    count: usize,
) -> crate::Result<Vec<DailyMixRow>> {
    let mut stmt = conn.prepare(query)?;
    let raw: Vec<(i16, i8, i8, Vec<Option<f64>>)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, get_values(row, 3, count)?))
        })?
        .collect::<duckdb::Result<_>>()?;
    let mut rows = Vec::with_capacity(raw.len());
    for (year, month, day, values) in raw {
        rows.push(DailyMixRow {
            date: Date::new(year, month, day)?,
            values,
        });
    }
    Ok(rows)
}

pub fn get_hourly_demand(conn: &Connection, query: &str) -> crate::Result<Vec<HourlyDemandRow>> {
    let mut stmt = conn.prepare(query)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(HourlyDemandRow {
                hour: row.get(0)?,
                avg_demand: row.get(1)?,
            })
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn get_yearly_ict(
    conn: &Connection,
    query: &str,
    count: usize,
) -> crate::Result<Vec<YearlyIctRow>> {
    let mut stmt = conn.prepare(query)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(YearlyIctRow {
                year: row.get(0)?,
                values: get_values(row, 1, count)?,
            })
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn get_demand_vs_production(
    conn: &Connection,
    query: &str,
) -> crate::Result<Vec<DemandProductionRow>> {
    let mut stmt = conn.prepare(query)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(DemandProductionRow {
                year: row.get(0)?,
                total_demand: row.get(1)?,
                total_production: row.get(2)?,
                avg_frequency: row.get(3)?,
            })
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;
    Ok(rows)
}
