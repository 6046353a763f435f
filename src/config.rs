use std::time::Duration;

use clap::Parser;

use crate::data::dbnomics::DBNOMICS_API_BASE;
use crate::summarize::{DEFAULT_MODEL, HF_API_BASE};

/// Combined outlook of selected macroeconomic indicators.
#[derive(Parser, Debug, Clone)]
#[command(name = "macro-outlook")]
#[command(version, about)]
pub struct Config {
    /// DBnomics API root (metadata and series endpoints hang off `/series`)
    #[arg(long, env = "DBNOMICS_API_BASE", default_value = DBNOMICS_API_BASE)]
    pub api_base: String,

    /// Inference API root for the summarization model
    #[arg(long, env = "HF_API_BASE", default_value = HF_API_BASE)]
    pub hf_api_base: String,

    /// Summarization model id
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Bearer token for the inference API
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
