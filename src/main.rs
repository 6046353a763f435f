mod app;
mod chart;
mod color;
mod config;
mod data;
mod state;
mod summarize;
mod ui;

use anyhow::{Context, Result};
use app::MacroOutlookApp;
use clap::Parser;
use eframe::egui;

use config::Config;
use data::dbnomics::DbnomicsClient;
use state::AppState;
use summarize::Summarizer;

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();

    let client = DbnomicsClient::new(&config.api_base, config.timeout())
        .context("building DBnomics client")?;
    let summarizer = Summarizer::new(
        &config.hf_api_base,
        &config.model,
        config.hf_token.clone(),
        config.timeout(),
    )
    .context("building summarization client")?;

    let mut state = AppState::new(client, summarizer);
    state.load_metadata();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Macro Outlook – CPI & PGI",
        options,
        Box::new(|_cc| Ok(Box::new(MacroOutlookApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
