use chrono::{Datelike, NaiveDate};
use eframe::egui::Color32;

use crate::color::series_color;
use crate::data::model::{CombinedTable, Family};

// ---------------------------------------------------------------------------
// Chart model – what the plot panel draws, independent of egui_plot
// ---------------------------------------------------------------------------

/// One line layer: `[x, y]` points where x is a day number (see [`date_to_x`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayer {
    pub family: Family,
    pub title: String,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

/// Two overlaid layers on a shared temporal x-axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub layers: Vec<ChartLayer>,
}

impl Chart {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|l| l.points.is_empty())
    }
}

/// Build the overlay chart for the (filtered) combined table.
///
/// `indicators` are the indicator codes selected for CPI and PGI. An empty
/// table gives layers with no points; missing (NaN) values are left out of
/// their layer.
pub fn build_chart(table: &CombinedTable, indicators: [&str; 2]) -> Chart {
    let layers = Family::ALL
        .iter()
        .zip(indicators)
        .map(|(&family, indicator)| ChartLayer {
            family,
            title: format!("Data for {indicator} from {family}"),
            color: series_color(family),
            points: table
                .rows
                .iter()
                .map(|row| [date_to_x(row.period), row.value(family)])
                .filter(|[_, y]| y.is_finite())
                .collect(),
        })
        .collect();
    Chart { layers }
}

/// Days since 0001-01-01 (day 1), used as the plot's x coordinate.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`date_to_x`], rounding to the nearest day.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}
