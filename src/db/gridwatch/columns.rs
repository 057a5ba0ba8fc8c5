//! Column catalogue of the gridwatch dataset.
//!
//! All readings are in MW, `frequency` in Hz.

pub const TIMESTAMP_COLUMN: &str = "timestamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Avg,
}

impl Aggregation {
    pub fn sql(&self) -> &'static str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Avg => "AVG",
        }
    }
}

/// A raw column and how it is rolled up in `aggregate_main_table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measure {
    pub source: &'static str,
    pub aggregation: Aggregation,
    pub alias: &'static str,
}

pub const DEMAND: Measure = Measure {
    source: "demand",
    aggregation: Aggregation::Sum,
    alias: "demand",
};

pub const FREQUENCY: Measure = Measure {
    source: "frequency",
    aggregation: Aggregation::Avg,
    alias: "avg_frequency",
};

/// Generation sources, in the order they are stored.
pub const ENERGY_SOURCES: [&str; 10] = [
    "coal", "nuclear", "ccgt", "wind", "pumped", "hydro", "biomass", "oil", "solar", "ocgt",
];

/// Interconnector and transfer flows: (aggregate column, `dim_ict_table` column).
pub const INTERCONNECTORS: [(&str, &str); 12] = [
    ("french_ict", "french_ict"),
    ("dutch_ict", "dutch_ict"),
    ("irish_ict", "irish_ict"),
    ("ew_ict", "east_west_ict"),
    ("nemo", "nemo_belgium_ict"),
    ("other", "other_generator"),
    ("north_south", "north_south"),
    ("scotland_england", "scotland_england"),
    ("ifa2", "ifa2"),
    ("intelec_ict", "intelec_ict"),
    ("nsl", "norway_ict"),
    ("vkl_ict", "viking_ict"),
];

/// Left out of total production, see the demand vs production query.
pub const EXCLUDED_FROM_PRODUCTION: &str = "east_west_ict";

/// Every measure of the aggregate table, in column order.
pub fn measures() -> Vec<Measure> {
    let mut out = vec![DEMAND, FREQUENCY];
    out.extend(ENERGY_SOURCES.iter().map(|&name| Measure {
        source: name,
        aggregation: Aggregation::Sum,
        alias: name,
    }));
    out.extend(INTERCONNECTORS.iter().map(|&(name, _)| Measure {
        source: name,
        aggregation: Aggregation::Sum,
        alias: name,
    }));
    out
}

/// Columns the raw input must carry, after whitespace is stripped from the names.
pub fn required_source_columns() -> Vec<&'static str> {
    let mut out = vec![TIMESTAMP_COLUMN];
    out.extend(measures().iter().map(|m| m.source));
    out
}

/// Renamed interconnector columns as they appear in `dim_ict_table`.
pub fn interconnector_names() -> Vec<&'static str> {
    INTERCONNECTORS.iter().map(|(_, name)| *name).collect()
}
