use std::time::Duration;

use eframe::egui::{self, ScrollArea, Ui};

use crate::state::{AppState, NO_DATA_MESSAGE};
use crate::ui::{panels, plot};

pub const TITLE: &str = "Combined outlook of selected macroeconomic indicators";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MacroOutlookApp {
    pub state: AppState,
}

impl MacroOutlookApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for MacroOutlookApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_surprise();
        if self.state.surprise.is_pending() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: indicator dropdowns ----
        egui::SidePanel::left("selection_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                ScrollArea::vertical()
                    .id_salt("selection_scroll")
                    .show(ui, |ui: &mut Ui| {
                        panels::selection_panel(ui, &mut self.state);
                    });
            });

        // ---- Central panel: series, range, chart, surprise ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .id_salt("main_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.heading(TITLE);
                    ui.separator();

                    panels::series_overview(ui, &self.state);

                    if self.state.filtered.is_none() {
                        ui.label(NO_DATA_MESSAGE);
                        return;
                    }
                    panels::range_controls(ui, &mut self.state);
                    plot::combined_chart(ui, &self.state);
                    panels::surprise_section(ui, &mut self.state);
                });
        });
    }
}
