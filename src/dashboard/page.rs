use build_html::{Html, HtmlContainer, HtmlPage};

use crate::api::gridwatch::queries::ChartData;
use crate::dashboard::charts::Chart;

pub const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

fn chart_page(charts: &[Chart]) -> HtmlPage {
    let mut page = HtmlPage::new()
        .with_title("Gridwatch")
        .with_script_link(PLOTLY_JS)
        .with_header(1, "Gridwatch");
    for chart in charts {
        page = page
            .with_header(2, &chart.title)
            .with_raw(chart.plot.to_inline_html(Some(chart.query.name())))
            .with_paragraph(&chart.commentary);
    }
    page
}

/// All the charts on one page, each followed by its commentary.
pub fn render_page(charts: &[Chart]) -> String {
    chart_page(charts).to_html_string()
}

/// Rows of any chart as a plain table.
pub fn html_table(data: &ChartData) -> build_html::Table {
    let mut table = build_html::Table::new();
    table.add_header_row(data.header());
    for record in data.records() {
        table.add_body_row(record);
    }
    table
}

/// Same as [`render_page`] with the rows of `data` appended as a table.
pub fn render_page_with_table(charts: &[Chart], data: &ChartData) -> String {
    chart_page(charts)
        .with_header(2, data.query().title())
        .with_table(html_table(data))
        .to_html_string()
}

#[cfg(test)]
mod tests {
    use crate::api::gridwatch::queries::{ChartData, DemandProductionRow, HourlyDemandRow};
    use crate::dashboard::charts::render_chart;
    use crate::dashboard::page::{render_page, render_page_with_table, PLOTLY_JS};

    #[test]
    fn test_page() {
        let sleep = ChartData::DemandDuringSleep(vec![
            HourlyDemandRow {
                hour: 1,
                avg_demand: Some(80.0),
            },
            HourlyDemandRow {
                hour: 13,
                avg_demand: Some(100.0),
            },
        ]);
        let chart = render_chart(&sleep, 400);
        let html = render_page(&[chart]);
        assert!(html.contains(PLOTLY_JS));
        assert!(html.contains("<h2>Demand During Sleep</h2>"));
        assert!(html.contains("id=\"demand-during-sleep\""));
        assert!(html.contains("20.0% lower"));
    }

    #[test]
    fn test_page_with_table() {
        let data = ChartData::DemandVsProduction(vec![DemandProductionRow {
            year: 2023,
            total_demand: Some(10.0),
            total_production: None,
            avg_frequency: Some(50.0),
        }]);
        let html = render_page_with_table(&[], &data);
        assert!(html.contains("total_production"));
        assert!(html.contains("<td>2023</td>"));
    }
}
