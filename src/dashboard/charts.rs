use plotly::{
    common::{Line, Mode, Title},
    layout::{Axis, BarMode},
    Bar, Layout, Plot, Scatter,
};

use crate::api::gridwatch::queries::{ChartData, ChartQuery};
use crate::dashboard::commentary::commentary;
use crate::dashboard::transforms::{rolling_mean, yearly_series, yearly_totals, SLEEP_WINDOW};

pub const DEFAULT_WINDOW: usize = 400;
pub const MIN_WINDOW: usize = 100;

pub struct Chart {
    pub query: ChartQuery,
    pub title: String,
    pub plot: Plot,
    pub commentary: String,
}

fn layout(title: &str, x: &str, y: &str) -> Layout {
    Layout::new()
        .title(Title::with_text(title))
        .x_axis(Axis::new().title(Title::with_text(x)))
        .y_axis(Axis::new().title(Title::with_text(y)))
}

/// Turn the rows of one query into a plot.  The `window` only applies to
/// the demand over time chart.
pub fn render_chart(data: &ChartData, window: usize) -> Chart {
    let query = data.query();
    let columns = query.value_columns();
    let mut plot = Plot::new();
    match data {
        ChartData::DemandOverTime(rows) => {
            let x: Vec<String> = rows.iter().map(|r| r.time.to_string()).collect();
            let demand: Vec<Option<f64>> = rows.iter().map(|r| r.total_demand).collect();
            let trace0 = Scatter::new(x.clone(), demand.clone())
                .name("hourly")
                .mode(Mode::Lines)
                .line(Line::new().width(0.5))
                .opacity(0.4);
            plot.add_trace(trace0);
            let label = format!("{}-period rolling mean", window);
            let trace1 = Scatter::new(x, rolling_mean(&demand, window))
                .name(&label)
                .mode(Mode::Lines)
                .line(Line::new().width(1.2));
            plot.add_trace(trace1);
            plot.set_layout(layout(query.title(), "Time", "Demand, MW"));
        }
        ChartData::EnergyContribution(rows) | ChartData::IctContribution(rows) => {
            let totals = yearly_totals(rows);
            let years: Vec<i16> = totals.iter().map(|t| t.year).collect();
            for (i, name) in columns.iter().enumerate() {
                let y: Vec<f64> = totals
                    .iter()
                    .map(|t| t.values.get(i).copied().unwrap_or(0.0))
                    .collect();
                plot.add_trace(Bar::new(years.clone(), y).name(name));
            }
            plot.set_layout(layout(query.title(), "Year", "MWh").bar_mode(BarMode::Stack));
        }
        ChartData::DemandDuringSleep(rows) => {
            let (sleeping, awake): (Vec<_>, Vec<_>) =
                rows.iter().partition(|r| SLEEP_WINDOW.contains(r.hour));
            for (name, part) in [("sleeping", sleeping), ("awake", awake)] {
                let x: Vec<i8> = part.iter().map(|r| r.hour).collect();
                let y: Vec<Option<f64>> = part.iter().map(|r| r.avg_demand).collect();
                plot.add_trace(Bar::new(x, y).name(name));
            }
            plot.set_layout(layout(query.title(), "Hour of day", "Average demand, MW"));
        }
        ChartData::IctVisualization(rows) => {
            for series in yearly_series(rows, &columns, &["avg_east_west_ict"]) {
                let trace = Scatter::new(series.x, series.y)
                    .name(series.name.trim_start_matches("avg_"))
                    .mode(Mode::LinesMarkers)
                    .line(Line::new().width(1.2));
                plot.add_trace(trace);
            }
            plot.set_layout(layout(query.title(), "Year", "Average flow, MW"));
        }
        ChartData::DemandVsProduction(rows) => {
            let years: Vec<i16> = rows.iter().map(|r| r.year).collect();
            let demand: Vec<Option<f64>> = rows.iter().map(|r| r.total_demand).collect();
            let production: Vec<Option<f64>> = rows.iter().map(|r| r.total_production).collect();
            plot.add_trace(
                Scatter::new(years.clone(), demand)
                    .name("demand")
                    .mode(Mode::LinesMarkers),
            );
            plot.add_trace(
                Scatter::new(years, production)
                    .name("production")
                    .mode(Mode::LinesMarkers),
            );
            plot.set_layout(layout(query.title(), "Year", "MWh"));
        }
    }

    Chart {
        query,
        title: query.title().to_string(),
        plot,
        commentary: commentary(data),
    }
}
