use std::fmt;

use crate::data::aggregate::AggregatedTable;
use crate::data::model::{columns, CellValue};
use crate::figure::{Series, ThroughputPlotter};
use crate::stats::Describe;

/// Columns every analysis reports on: full, 10, 15 and 20 MHz.
pub const THROUGHPUT_COLUMNS: [&str; 4] = [
    columns::APP_THROUGHPUT_DL,
    columns::APP_THROUGHPUT_DL_10,
    columns::APP_THROUGHPUT_DL_15,
    columns::APP_THROUGHPUT_DL_20,
];

/// bit/s → Mbit/s
pub const NORMALIZATION: f64 = 1e6;
pub const UNIT: &str = "Mbit/s";

/// Plot x axis: 0..120 Mbit/s in 1 Mbit/s steps.
pub fn x_domain() -> Vec<f64> {
    (0..120).map(f64::from).collect()
}

// ---------------------------------------------------------------------------
// Per-column summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub stats: Describe,
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stats)?;
        write!(f, "Name: {}, dtype: float64", self.column)
    }
}

/// Finite values of a column divided by `scale`; missing cells are dropped.
/// An absent column yields an empty series.
pub fn scaled_values(table: &AggregatedTable, column: &str, scale: f64) -> Vec<f64> {
    table
        .column(column)
        .unwrap_or_default()
        .iter()
        .filter_map(CellValue::as_f64)
        .map(|v| v / scale)
        .collect()
}

/// Describe every throughput column, values divided by `scale`.
pub fn summarize(table: &AggregatedTable, scale: f64) -> Vec<ColumnSummary> {
    THROUGHPUT_COLUMNS
        .iter()
        .map(|column| ColumnSummary {
            column: column.to_string(),
            stats: Describe::of(&scaled_values(table, column, scale)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Plot driver
// ---------------------------------------------------------------------------

/// Feed the normalized throughput distributions to `plotter`: one ECDF
/// overlay (10 MHz, full, 15 MHz) and one density each for full, 10 MHz and
/// 15 MHz. The 20 MHz column is summarized only.
pub fn drive_plots(table: &AggregatedTable, plotter: &mut impl ThroughputPlotter) {
    let x = x_domain();
    let series = |column: &str, label: &str| {
        Series::new(label, scaled_values(table, column, NORMALIZATION))
    };

    plotter.plot_ecdf_triplet(
        [
            series(columns::APP_THROUGHPUT_DL_10, "Application th. (10 MHz)"),
            series(columns::APP_THROUGHPUT_DL, "Application th."),
            series(columns::APP_THROUGHPUT_DL_15, "Application th. (15 MHz)"),
        ],
        &x,
        UNIT,
    );
    plotter.plot_density(series(columns::APP_THROUGHPUT_DL, "App. th."), &x, UNIT);
    plotter.plot_density(series(columns::APP_THROUGHPUT_DL_10, "App. th. 10 MHz"), &x, UNIT);
    plotter.plot_density(series(columns::APP_THROUGHPUT_DL_15, "App. th. 15 MHz"), &x, UNIT);
}
