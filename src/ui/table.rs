use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Family, SeriesTable};

const PREVIEW_ROWS: usize = 5;
const ROW_HEIGHT: f32 = 18.0;

/// First rows of a fetched series as a small two-column table.
pub fn series_preview(ui: &mut Ui, family: Family, series: &SeriesTable) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(90.0))
        .header(ROW_HEIGHT, |mut header| {
            header.col(|ui| {
                ui.strong("period");
            });
            header.col(|ui| {
                ui.strong(format!("value ({family})"));
            });
        })
        .body(|mut body| {
            for obs in series.head(PREVIEW_ROWS) {
                body.row(ROW_HEIGHT, |mut row| {
                    row.col(|ui| {
                        ui.label(obs.period.format("%Y-%m-%d").to_string());
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.3}", obs.value));
                    });
                });
            }
        });
    ui.label(format!("{} rows", series.len()));
}
