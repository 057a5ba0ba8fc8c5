//! Everything between the query results and the HTML dashboard.
//!
//! [`fanout::fetch_charts`] runs the chart queries concurrently,
//! [`charts::render_chart`] turns each result into a plotly figure and
//! [`page::render_page`] lays them out on one page.

pub mod charts;
pub mod commentary;
pub mod fanout;
pub mod page;
pub mod transforms;
