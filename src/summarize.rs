//! Hosted summarization of the combined table (the "surprise" button).

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::model::CombinedTable;

pub const HF_API_BASE: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";

pub const JOKE: &str = "Why did Salvador Dali and Einstein never get along? \
Because Dali was always too surreal for Einstein's reality!";

const PROMPT_PREFIX: &str = "Analyze the following data trends:\n\n";

/// Errors from the summarization endpoint.
#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed model output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model returned no summary")]
    EmptyOutput,

    #[error("Summary worker stopped before replying")]
    WorkerGone,
}

/// Fixed generation bounds.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerationParams {
    pub max_length: u32,
    pub min_length: u32,
    pub do_sample: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: 150,
            min_length: 30,
            do_sample: false,
        }
    }
}

#[derive(Serialize)]
struct SummaryRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParams,
}

#[derive(Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

/// Prompt sent to the model: fixed prefix plus the table as text.
pub fn analysis_prompt(table: &CombinedTable) -> String {
    format!("{PROMPT_PREFIX}{}", table.to_text())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking client for a Hugging Face style summarization endpoint.
#[derive(Clone)]
pub struct Summarizer {
    http: reqwest::blocking::Client,
    endpoint: String,
    token: Option<String>,
    params: GenerationParams,
}

impl Summarizer {
    pub fn new(
        api_base: &str,
        model: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SummarizeError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("macro-outlook/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/models/{}", api_base.trim_end_matches('/'), model),
            token: token.filter(|t| !t.trim().is_empty()),
            params: GenerationParams::default(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Summarize `text`, returning the first result's `summary_text`.
    pub fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        log::debug!("POST {} ({} chars)", self.endpoint, text.len());

        let mut request = self.http.post(&self.endpoint).json(&SummaryRequest {
            inputs: text,
            parameters: self.params,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(SummarizeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let outputs: Vec<SummaryOutput> = serde_json::from_str(&body)?;
        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .ok_or(SummarizeError::EmptyOutput)
    }
}

// ---------------------------------------------------------------------------
// Background job
// ---------------------------------------------------------------------------

/// A summarization running on its own thread. Dropping the job abandons
/// the result; the worker finishes its request and its send fails quietly.
pub struct SummaryJob {
    rx: Receiver<Result<String, SummarizeError>>,
}

impl SummaryJob {
    pub fn spawn(summarizer: Summarizer, prompt: String) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = summarizer.summarize(&prompt);
            if tx.send(result).is_err() {
                log::debug!("Summary cancelled, dropping result");
            }
        });
        Self { rx }
    }

    /// Non-blocking poll; `None` while the worker is still running.
    pub fn poll(&self) -> Option<Result<String, SummarizeError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(SummarizeError::WorkerGone)),
        }
    }
}

/// Lifecycle of the surprise panel.
#[derive(Default)]
pub enum Surprise {
    #[default]
    Hidden,
    Pending(SummaryJob),
    Done(String),
    Failed(String),
}

impl Surprise {
    pub fn is_pending(&self) -> bool {
        matches!(self, Surprise::Pending(_))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use httpmock::prelude::*;

    use super::*;
    use crate::data::model::CombinedRow;

    fn summarizer(server: &MockServer, token: Option<&str>) -> Summarizer {
        Summarizer::new(
            &server.base_url(),
            DEFAULT_MODEL,
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn table() -> CombinedTable {
        CombinedTable {
            rows: vec![CombinedRow {
                period: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                value_cpi: 270.97,
                value_pgi: 112.5,
            }],
        }
    }

    #[test]
    fn test_analysis_prompt() {
        let prompt = analysis_prompt(&table());
        assert!(prompt.starts_with("Analyze the following data trends:\n\n"));
        assert!(prompt.contains("value_cpi"));
        assert!(prompt.ends_with("2021-01-01     270.97      112.5"));
    }

    #[test]
    fn test_summarize_sends_fixed_parameters() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/models/facebook/bart-large-cnn")
                .header("authorization", "Bearer hf_test")
                .body_includes(r#""parameters":{"max_length":150,"min_length":30,"do_sample":false}"#);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!([{ "summary_text": "Prices rose." }]));
        });

        let summary = summarizer(&server, Some("hf_test"))
            .summarize("some text")
            .unwrap();
        mock.assert();
        assert_eq!(summary, "Prices rose.");
    }

    #[test]
    fn test_summarize_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(503)
                .json_body(serde_json::json!({ "error": "Model is currently loading" }));
        });

        let err = summarizer(&server, None).summarize("x").unwrap_err();
        match err {
            SummarizeError::Status { status, body } => {
                assert_eq!(status, 503);
                assert!(body.contains("loading"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_summarize_malformed_and_empty_output() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/models/empty");
            then.status(200).json_body(serde_json::json!([]));
        });
        server.mock(|when, then| {
            when.method(POST).path("/models/weird");
            then.status(200).json_body(serde_json::json!({ "text": "nope" }));
        });

        let empty = Summarizer::new(&server.base_url(), "empty", None, Duration::from_secs(5)).unwrap();
        assert!(matches!(empty.summarize("x"), Err(SummarizeError::EmptyOutput)));

        let weird = Summarizer::new(&server.base_url(), "weird", None, Duration::from_secs(5)).unwrap();
        assert!(matches!(weird.summarize("x"), Err(SummarizeError::Json(_))));
    }

    #[test]
    fn test_job_delivers_result() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(serde_json::json!([{ "summary_text": "Flat trend." }]));
        });

        let job = SummaryJob::spawn(summarizer(&server, None), analysis_prompt(&table()));
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let result = loop {
            if let Some(result) = job.poll() {
                break result;
            }
            assert!(std::time::Instant::now() < deadline, "worker never replied");
            thread::sleep(Duration::from_millis(10));
        };
        assert_eq!(result.unwrap(), "Flat trend.");
    }
}
