use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Family, FamilyMetadata, LabelDictionary, Observation, QueryKey, SeriesTable};

pub const DBNOMICS_API_BASE: &str = "https://api.db.nomics.world/v22";

/// Fixed query used for the per-family metadata request.
const METADATA_QUERY: [(&str, &str); 4] = [
    ("facets", "1"),
    ("format", "json"),
    ("limit", "1000"),
    ("observations", "1"),
];

const SERIES_QUERY: [(&str, &str); 2] = [("observations", "1"), ("format", "json")];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Status(StatusCode),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no observations returned for {0}")]
    Empty(String),
}

// ---------------------------------------------------------------------------
// Wire schema – every level optional, absent paths mean "no labels"
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct MetadataEnvelope {
    #[serde(default)]
    dataset: Option<DatasetSection>,
}

#[derive(Debug, Default, Deserialize)]
struct DatasetSection {
    #[serde(default)]
    dimensions_values_labels: Option<DimensionLabels>,
}

#[derive(Debug, Default, Deserialize)]
struct DimensionLabels {
    #[serde(rename = "FREQ", default)]
    freq: Option<LabelDictionary>,
    #[serde(rename = "REF_AREA", default)]
    ref_area: Option<LabelDictionary>,
    #[serde(rename = "INDICATOR", default)]
    indicator: Option<LabelDictionary>,
}

impl From<MetadataEnvelope> for FamilyMetadata {
    fn from(envelope: MetadataEnvelope) -> Self {
        let labels = envelope
            .dataset
            .and_then(|d| d.dimensions_values_labels)
            .unwrap_or_default();
        FamilyMetadata {
            frequencies: labels.freq.unwrap_or_default(),
            ref_areas: labels.ref_area.unwrap_or_default(),
            indicators: labels.indicator.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeriesEnvelope {
    #[serde(default)]
    series: Option<SeriesSection>,
}

#[derive(Debug, Deserialize)]
struct SeriesSection {
    #[serde(default)]
    docs: Vec<SeriesDoc>,
}

/// One series document: parallel `period` / `period_start_day` / `value`.
#[derive(Debug, Deserialize)]
struct SeriesDoc {
    #[serde(default)]
    period: Vec<String>,
    #[serde(default)]
    period_start_day: Vec<String>,
    #[serde(default)]
    value: Vec<JsonValue>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking DBnomics client, shared by the metadata and series fetchers.
#[derive(Clone)]
pub struct DbnomicsClient {
    http: reqwest::blocking::Client,
    api_base: String,
}

impl DbnomicsClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("macro-outlook/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the frequency / region / indicator label dictionaries of a
    /// family. Missing paths in the body decode to empty dictionaries; any
    /// status other than 200 is an error.
    pub fn fetch_metadata(&self, family: Family) -> Result<FamilyMetadata, FetchError> {
        let url = format!("{}/series/{}", self.api_base, family.dataset_path());
        log::debug!("GET {url} (metadata for {family})");

        let response = self.http.get(&url).query(&METADATA_QUERY).send()?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status()));
        }
        let body = response.text()?;
        let envelope: MetadataEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.into())
    }

    /// Fetch the observations of one series. An envelope without documents
    /// or without any dated observation is reported as [`FetchError::Empty`].
    pub fn fetch_series(&self, key: &QueryKey) -> Result<SeriesTable, FetchError> {
        let url = format!("{}/series/{}", self.api_base, key.as_str());
        log::debug!("GET {url}");

        let response = self.http.get(&url).query(&SERIES_QUERY).send()?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status()));
        }
        let body = response.text()?;
        let envelope: SeriesEnvelope = serde_json::from_str(&body)?;

        let doc = envelope
            .series
            .and_then(|s| s.docs.into_iter().next())
            .ok_or_else(|| FetchError::Empty(key.to_string()))?;
        let rows = observations(&doc);
        if rows.is_empty() {
            return Err(FetchError::Empty(key.to_string()));
        }

        Ok(SeriesTable {
            key: key.clone(),
            rows,
        })
    }
}

/// Zip the parallel arrays of a document into observations. Rows whose
/// period cannot be parsed are skipped; a value that is not a number
/// (`"NA"`) is kept as `NaN` so the period still takes part in the join.
fn observations(doc: &SeriesDoc) -> Vec<Observation> {
    doc.value
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let period = doc
                .period_start_day
                .get(i)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                .or_else(|| doc.period.get(i).and_then(|p| parse_period(p)))?;
            let value = raw.as_f64().unwrap_or(f64::NAN);
            Some(Observation { period, value })
        })
        .collect()
}

/// Map a DBnomics period label to the first day it covers.
///
/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYY-Qn` and `YYYY-Sn`.
pub fn parse_period(period: &str) -> Option<NaiveDate> {
    let period = period.trim();
    if let Ok(date) = NaiveDate::parse_from_str(period, "%Y-%m-%d") {
        return Some(date);
    }

    let (year, rest) = match period.split_once('-') {
        Some((y, r)) => (y, Some(r)),
        None => (period, None),
    };
    let year: i32 = year.parse().ok()?;

    let month = match rest {
        None => 1,
        Some(r) if r.starts_with('Q') => {
            let q: u32 = r[1..].parse().ok()?;
            if !(1..=4).contains(&q) {
                return None;
            }
            (q - 1) * 3 + 1
        }
        Some(r) if r.starts_with('S') => {
            let s: u32 = r[1..].parse().ok()?;
            if !(1..=2).contains(&s) {
                return None;
            }
            (s - 1) * 6 + 1
        }
        Some(r) => r.parse().ok()?,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}
