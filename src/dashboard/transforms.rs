//! Reshaping of query results before they are plotted.

use std::collections::BTreeMap;

use crate::api::gridwatch::queries::{DailyMixRow, HourlyDemandRow, YearlyIctRow};

/// Trailing mean over `window` values.  A position gets a value only once a
/// full window of non-null values ends there.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if window == 0 {
        out.resize(values.len(), None);
        return out;
    }
    let mut sum = 0.0;
    let mut nulls = 0usize;
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => sum += v,
            None => nulls += 1,
        }
        if i >= window {
            match values[i - window] {
                Some(v) => sum -= v,
                None => nulls -= 1,
            }
        }
        if i + 1 >= window && nulls == 0 {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyTotal {
    pub year: i16,
    pub values: Vec<f64>,
}

/// Sum daily rows by calendar year.  Nulls count as zero, and years with no
/// data between the first and the last one come out as zeros.
pub fn yearly_totals(rows: &[DailyMixRow]) -> Vec<YearlyTotal> {
    let width = rows.iter().map(|r| r.values.len()).max().unwrap_or(0);
    let mut by_year: BTreeMap<i16, Vec<f64>> = BTreeMap::new();
    for row in rows {
        let totals = by_year
            .entry(row.date.year())
            .or_insert_with(|| vec![0.0; width]);
        for (total, value) in totals.iter_mut().zip(&row.values) {
            *total += value.unwrap_or(0.0);
        }
    }
    let (Some(&first), Some(&last)) = (by_year.keys().next(), by_year.keys().next_back()) else {
        return Vec::new();
    };
    (first..=last)
        .map(|year| YearlyTotal {
            year,
            values: by_year.remove(&year).unwrap_or_else(|| vec![0.0; width]),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series<X> {
    pub name: String,
    pub x: Vec<X>,
    pub y: Vec<Option<f64>>,
}

/// Long format: one series per value column, leaving out the `skip` ones.
pub fn yearly_series(rows: &[YearlyIctRow], columns: &[String], skip: &[&str]) -> Vec<Series<i16>> {
    let years: Vec<i16> = rows.iter().map(|r| r.year).collect();
    columns
        .iter()
        .enumerate()
        .filter(|(_, name)| !skip.contains(&name.as_str()))
        .map(|(i, name)| Series {
            name: name.clone(),
            x: years.clone(),
            y: rows
                .iter()
                .map(|r| r.values.get(i).copied().flatten())
                .collect(),
        })
        .collect()
}

/// Night hours, wrapping around midnight: `[start_hour, 24) + [0, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepWindow {
    pub start_hour: i8,
    pub end_hour: i8,
}

pub const SLEEP_WINDOW: SleepWindow = SleepWindow {
    start_hour: 22,
    end_hour: 6,
};

impl SleepWindow {
    pub fn contains(&self, hour: i8) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    /// Average demand (sleeping, awake), skipping nulls.
    pub fn split_average(&self, rows: &[HourlyDemandRow]) -> (Option<f64>, Option<f64>) {
        let mean = |sleeping: bool| {
            let vs: Vec<f64> = rows
                .iter()
                .filter(|r| self.contains(r.hour) == sleeping)
                .filter_map(|r| r.avg_demand)
                .collect();
            if vs.is_empty() {
                None
            } else {
                Some(vs.iter().sum::<f64>() / vs.len() as f64)
            }
        };
        (mean(true), mean(false))
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use crate::api::gridwatch::queries::{DailyMixRow, HourlyDemandRow, YearlyIctRow};
    use crate::dashboard::transforms::*;

    #[test]
    fn test_rolling_mean() {
        let vs = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        assert_eq!(
            rolling_mean(&vs, 2),
            vec![None, Some(1.5), Some(2.5), Some(3.5)]
        );
        assert_eq!(rolling_mean(&vs, 1), vs);
        assert_eq!(rolling_mean(&vs, 5), vec![None; 4]);
        assert_eq!(rolling_mean(&vs, 0), vec![None; 4]);
    }

    #[test]
    fn test_rolling_mean_with_gaps() {
        let vs = vec![Some(1.0), None, Some(3.0), Some(5.0), Some(7.0)];
        assert_eq!(
            rolling_mean(&vs, 2),
            vec![None, None, None, Some(4.0), Some(6.0)]
        );
    }

    #[test]
    fn test_yearly_totals() {
        let rows = vec![
            DailyMixRow {
                date: date(2021, 12, 31),
                values: vec![Some(1.0), None],
            },
            DailyMixRow {
                date: date(2021, 6, 1),
                values: vec![Some(2.0), Some(5.0)],
            },
            DailyMixRow {
                date: date(2023, 1, 1),
                values: vec![Some(4.0), Some(1.0)],
            },
        ];
        let totals = yearly_totals(&rows);
        assert_eq!(
            totals,
            vec![
                YearlyTotal {
                    year: 2021,
                    values: vec![3.0, 5.0]
                },
                YearlyTotal {
                    year: 2022,
                    values: vec![0.0, 0.0]
                },
                YearlyTotal {
                    year: 2023,
                    values: vec![4.0, 1.0]
                },
            ]
        );
        assert!(yearly_totals(&[]).is_empty());
    }

    #[test]
    fn test_yearly_series_skips_columns() {
        let rows = vec![
            YearlyIctRow {
                year: 2020,
                values: vec![Some(1.0), Some(2.0), Some(3.0)],
            },
            YearlyIctRow {
                year: 2021,
                values: vec![Some(4.0), None, Some(6.0)],
            },
        ];
        let columns: Vec<String> = vec!["avg_a".into(), "avg_b".into(), "avg_c".into()];
        let series = yearly_series(&rows, &columns, &["avg_b"]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].name, "avg_c");
        assert_eq!(series[1].x, vec![2020, 2021]);
        assert_eq!(series[1].y, vec![Some(3.0), Some(6.0)]);
    }

    #[test]
    fn test_sleep_window() {
        assert!(SLEEP_WINDOW.contains(22));
        assert!(SLEEP_WINDOW.contains(0));
        assert!(SLEEP_WINDOW.contains(5));
        assert!(!SLEEP_WINDOW.contains(6));
        assert!(!SLEEP_WINDOW.contains(21));
        let day_shift = SleepWindow {
            start_hour: 9,
            end_hour: 17,
        };
        assert!(day_shift.contains(9));
        assert!(!day_shift.contains(17));

        let rows: Vec<HourlyDemandRow> = (0..24)
            .map(|h| HourlyDemandRow {
                hour: h,
                avg_demand: Some(if SLEEP_WINDOW.contains(h) { 20.0 } else { 30.0 }),
            })
            .collect();
        assert_eq!(SLEEP_WINDOW.split_average(&rows), (Some(20.0), Some(30.0)));
        assert_eq!(SLEEP_WINDOW.split_average(&[]), (None, None));
    }
}
