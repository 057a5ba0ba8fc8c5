use itertools::Itertools;

use crate::api::gridwatch::queries::{ChartData, ChartQuery};
use crate::dashboard::transforms::{yearly_totals, SLEEP_WINDOW};

pub fn static_text(query: ChartQuery) -> &'static str {
    match query {
        ChartQuery::DemandOverTime => {
            "Electricity demand on the grid, smoothed with a trailing rolling mean. \
             The seasonal cycle dominates, with winter peaks well above summer lows."
        }
        ChartQuery::EnergyContribution => {
            "Yearly generation by source. The mix has moved away from coal towards \
             gas, wind and other renewables."
        }
        ChartQuery::DemandDuringSleep => {
            "Average demand by hour of day. Hours between 22:00 and 06:00 are \
             counted as sleeping hours."
        }
        ChartQuery::IctVisualization => {
            "Average flow on each interconnector per year. East-West is left out \
             since it links two parts of the same grid."
        }
        ChartQuery::DemandVsProduction => {
            "Yearly demand against domestic production plus imports. The gap \
             between the two lines is the balance the grid has to cover."
        }
        ChartQuery::IctContribution => "Yearly totals of the flow on each interconnector.",
    }
}

/// One sentence computed from the rows.
pub fn summary(data: &ChartData) -> String {
    if data.is_empty() {
        return "No data.".to_string();
    }
    let columns = data.query().value_columns();
    let sentence = match data {
        ChartData::DemandOverTime(rows) => rows
            .iter()
            .filter_map(|r| r.total_demand.map(|v| (r.time, v)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(time, v)| format!("Peak demand of {:.0} MW at {}.", v, time)),
        ChartData::EnergyContribution(rows) | ChartData::IctContribution(rows) => {
            let totals = yearly_totals(rows);
            let label = if data.query() == ChartQuery::EnergyContribution {
                "source"
            } else {
                "interconnector"
            };
            largest(&columns, |i| totals.iter().filter_map(|t| t.values.get(i)).sum()).map(
                |(name, v)| {
                    format!(
                        "The largest {} over {} is {} with {:.0} MWh.",
                        label,
                        year_span(totals.first().map(|t| t.year), totals.last().map(|t| t.year)),
                        name,
                        v
                    )
                },
            )
        }
        ChartData::DemandDuringSleep(rows) => match SLEEP_WINDOW.split_average(rows) {
            (Some(sleep), Some(awake)) if awake != 0.0 => Some(format!(
                "Average demand while sleeping is {:.0} MW against {:.0} MW awake, {:.1}% lower.",
                sleep,
                awake,
                100.0 * (awake - sleep) / awake
            )),
            _ => None,
        },
        ChartData::IctVisualization(rows) => largest(&columns, |i| {
            if columns[i] == "avg_east_west_ict" {
                return f64::NEG_INFINITY;
            }
            let vs = rows
                .iter()
                .filter_map(|r| r.values.get(i).copied().flatten())
                .collect_vec();
            if vs.is_empty() {
                f64::NEG_INFINITY
            } else {
                vs.iter().sum::<f64>() / vs.len() as f64
            }
        })
        .filter(|(_, v)| v.is_finite())
        .map(|(name, v)| {
            format!(
                "{} carries the largest average flow, {:.0} MW.",
                name.trim_start_matches("avg_"),
                v
            )
        }),
        ChartData::DemandVsProduction(rows) => rows
            .iter()
            .rev()
            .find_map(|r| match (r.total_demand, r.total_production) {
                (Some(d), Some(p)) if d != 0.0 => Some((r.year, 100.0 * p / d)),
                _ => None,
            })
            .map(|(year, pct)| format!("In {} production covered {:.1}% of demand.", year, pct)),
    };
    sentence.unwrap_or_else(|| "No data.".to_string())
}

pub fn commentary(data: &ChartData) -> String {
    format!("{} {}", static_text(data.query()), summary(data))
}

/// Column with the biggest score.
fn largest<F: Fn(usize) -> f64>(columns: &[String], score: F) -> Option<(String, f64)> {
    (0..columns.len())
        .map(|i| (columns[i].clone(), score(i)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

fn year_span(first: Option<i16>, last: Option<i16>) -> String {
    match (first, last) {
        (Some(a), Some(b)) if a == b => format!("{}", a),
        (Some(a), Some(b)) => format!("{}-{}", a, b),
        _ => "the period".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, datetime};

    use crate::api::gridwatch::queries::{
        ChartData, ChartQuery, DailyMixRow, DemandProductionRow, DemandRow, HourlyDemandRow,
        YearlyIctRow,
    };
    use crate::dashboard::commentary::{commentary, static_text, summary};

    #[test]
    fn test_peak_demand() {
        let data = ChartData::DemandOverTime(vec![
            DemandRow {
                time: datetime(2024, 1, 1, 17, 0, 0, 0),
                total_demand: Some(41000.0),
            },
            DemandRow {
                time: datetime(2024, 1, 1, 18, 0, 0, 0),
                total_demand: Some(43000.4),
            },
            DemandRow {
                time: datetime(2024, 1, 1, 19, 0, 0, 0),
                total_demand: None,
            },
        ]);
        assert_eq!(
            summary(&data),
            "Peak demand of 43000 MW at 2024-01-01T18:00:00."
        );
    }

    #[test]
    fn test_largest_source() {
        let mut values = vec![Some(1.0); 10];
        values[3] = Some(5.0);
        let data = ChartData::EnergyContribution(vec![
            DailyMixRow {
                date: date(2022, 3, 1),
                values: values.clone(),
            },
            DailyMixRow {
                date: date(2023, 3, 1),
                values,
            },
        ]);
        assert_eq!(
            summary(&data),
            "The largest source over 2022-2023 is wind with 10 MWh."
        );
    }

    #[test]
    fn test_sleep_vs_awake() {
        let data = ChartData::DemandDuringSleep(vec![
            HourlyDemandRow {
                hour: 2,
                avg_demand: Some(75.0),
            },
            HourlyDemandRow {
                hour: 12,
                avg_demand: Some(100.0),
            },
        ]);
        assert_eq!(
            summary(&data),
            "Average demand while sleeping is 75 MW against 100 MW awake, 25.0% lower."
        );
    }

    #[test]
    fn test_ict_skips_east_west() {
        let mut values = vec![Some(1.0); 12];
        values[3] = Some(100.0); // east_west
        values[5] = Some(7.0);
        let data = ChartData::IctVisualization(vec![YearlyIctRow { year: 2020, values }]);
        let columns = ChartQuery::IctVisualization.value_columns();
        assert_eq!(columns[3], "avg_east_west_ict");
        let expected = format!(
            "{} carries the largest average flow, 7 MW.",
            columns[5].trim_start_matches("avg_")
        );
        assert_eq!(summary(&data), expected);
    }

    #[test]
    fn test_production_share() {
        let data = ChartData::DemandVsProduction(vec![
            DemandProductionRow {
                year: 2023,
                total_demand: Some(200.0),
                total_production: Some(150.0),
                avg_frequency: Some(50.0),
            },
            DemandProductionRow {
                year: 2024,
                total_demand: None,
                total_production: Some(1.0),
                avg_frequency: None,
            },
        ]);
        assert_eq!(summary(&data), "In 2023 production covered 75.0% of demand.");
    }

    #[test]
    fn test_short_rows() {
        // fewer values than columns
        let data = ChartData::IctVisualization(vec![YearlyIctRow {
            year: 2020,
            values: vec![Some(1.0), Some(3.0)],
        }]);
        let columns = ChartQuery::IctVisualization.value_columns();
        let expected = format!(
            "{} carries the largest average flow, 3 MW.",
            columns[1].trim_start_matches("avg_")
        );
        assert_eq!(summary(&data), expected);

        let data = ChartData::EnergyContribution(vec![DailyMixRow {
            date: date(2022, 3, 1),
            values: vec![Some(2.0)],
        }]);
        assert_eq!(
            summary(&data),
            "The largest source over 2022 is coal with 2 MWh."
        );
    }

    #[test]
    fn test_empty() {
        let data = ChartData::DemandOverTime(vec![]);
        assert_eq!(summary(&data), "No data.");
        assert!(commentary(&data).starts_with(static_text(ChartQuery::DemandOverTime)));
    }
}
