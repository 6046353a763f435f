use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use crate::color::diagnostic_color;
use crate::data::model::{DateRange, Dimension, Family};
use crate::data::selection::options;
use crate::state::{AppState, Note};
use crate::summarize::{Surprise, JOKE};
use crate::ui::table;

// ---------------------------------------------------------------------------
// Left side panel – indicator selection
// ---------------------------------------------------------------------------

/// Render the six dropdowns (three per family).
pub fn selection_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Indicators");
    ui.separator();

    let mut change: Option<(Family, Dimension, String)> = None;

    for family in Family::ALL {
        let fs = state.family(family);
        ui.strong(family.code());
        if let Some(note) = &fs.metadata_note {
            note_label(ui, note);
        }
        if fs.metadata.is_empty() {
            ui.label("No options available (File → Reload data to retry).");
        }

        for dim in Dimension::ALL {
            let current = fs.selection.get(dim).unwrap_or_default().to_string();
            let choices = options(fs.metadata.labels(dim));

            ui.label(format!("Select {} ({family})", dim.label()));
            egui::ComboBox::from_id_salt((family, dim))
                .selected_text(&current)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for choice in choices {
                        let selected = choice == current;
                        if ui.selectable_label(selected, &choice).clicked() && !selected {
                            change = Some((family, dim, choice));
                        }
                    }
                });
        }
        ui.add_space(8.0);
    }

    // Apply after the loop: selecting re-fetches and mutates `state`.
    if let Some((family, dim, choice)) = change {
        state.select(family, dim, choice);
    }
}

// ---------------------------------------------------------------------------
// Central panel sections
// ---------------------------------------------------------------------------

/// Fetch outcome and preview rows of each series.
pub fn series_overview(ui: &mut Ui, state: &AppState) {
    for family in Family::ALL {
        let fs = state.family(family);
        let Some(key) = &fs.fetched_key else {
            continue;
        };
        ui.label(format!("Fetching data for: {key}"));
        if let Some(note) = &fs.fetch_note {
            note_label(ui, note);
        }
        if let Some(series) = &fs.series {
            ui.push_id(family, |ui: &mut Ui| {
                table::series_preview(ui, family, series);
            });
        }
        ui.add_space(6.0);
    }
}

/// Start / end date pickers, defaulted to the combined table's bounds.
pub fn range_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(range) = state.range else {
        return;
    };
    let mut start = range.start;
    let mut end = range.end;

    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Start date");
        changed |= ui
            .add(DatePickerButton::new(&mut start).id_salt("start_date"))
            .changed();
        ui.separator();
        ui.label("End date");
        changed |= ui
            .add(DatePickerButton::new(&mut end).id_salt("end_date"))
            .changed();
    });

    if changed {
        log::debug!("Date range set to {start} – {end}");
        state.set_range(DateRange { start, end });
    }
}

/// The surprise button, the joke and the model's summary.
pub fn surprise_section(ui: &mut Ui, state: &mut AppState) {
    ui.separator();
    if ui
        .add_enabled(!state.surprise.is_pending(), egui::Button::new("Click for a surprise!"))
        .clicked()
    {
        state.start_surprise();
    }

    if matches!(state.surprise, Surprise::Hidden) {
        return;
    }
    ui.label(JOKE);

    let mut cancel = false;
    match &state.surprise {
        Surprise::Hidden => {}
        Surprise::Pending(_) => {
            ui.horizontal(|ui: &mut Ui| {
                ui.spinner();
                ui.label("Asking the model…");
                cancel = ui.small_button("Cancel").clicked();
            });
        }
        Surprise::Done(summary) => {
            ui.heading("AI Analysis of the Graphs");
            ui.label(summary);
        }
        Surprise::Failed(err) => {
            ui.heading("AI Analysis of the Graphs");
            ui.label(RichText::new(format!("Error: {err}")).color(Color32::RED));
        }
    }
    if cancel {
        state.cancel_surprise();
    }
}

fn note_label(ui: &mut Ui, note: &Note) {
    ui.label(RichText::new(&note.text).color(diagnostic_color(note.ok)));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload data").clicked() {
                state.reload();
                ui.close_menu();
            }
            let enabled = state.filtered.is_some();
            if ui
                .add_enabled(enabled, egui::Button::new("Export combined CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(combined), Some(filtered)) = (&state.combined, &state.filtered) {
            ui.label(format!(
                "{} shared periods, {} in range",
                combined.len(),
                filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn export_file_dialog(state: &mut AppState) {
    let Some(table) = &state.filtered else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export combined table")
        .set_file_name("combined.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match crate::data::export::write_csv(&path, table) {
            Ok(()) => {
                log::info!("Exported {} rows to {}", table.len(), path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
