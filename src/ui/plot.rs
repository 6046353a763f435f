use eframe::egui::{RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::chart::x_to_date;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Combined chart (central panel)
// ---------------------------------------------------------------------------

fn day_label(x: f64) -> String {
    x_to_date(x)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Render both series as overlaid lines on a date axis.
pub fn combined_chart(ui: &mut Ui, state: &AppState) {
    let (Some(chart), Some(table)) = (state.chart(), &state.filtered) else {
        return;
    };

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for layer in &chart.layers {
            ui.label(RichText::new(&layer.title).color(layer.color).strong());
        }
    });
    if table.is_empty() {
        ui.label("No rows in the selected date range.");
    }

    Plot::new("combined_chart")
        .legend(Legend::default())
        .height(360.0)
        .x_axis_label("period")
        .y_axis_label("value")
        .x_axis_formatter(|mark, _range| day_label(mark.value))
        .label_formatter(|name, point| {
            let date = day_label(point.x);
            if name.is_empty() {
                format!("{date}\n{:.3}", point.y)
            } else {
                format!("{name}\n{date}\n{:.3}", point.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for layer in &chart.layers {
                let points: PlotPoints = layer.points.iter().copied().collect();
                let line = Line::new(points)
                    .name(&layer.title)
                    .color(layer.color)
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}
