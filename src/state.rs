use crate::chart::{build_chart, Chart};
use crate::data::dbnomics::{DbnomicsClient, FetchError};
use crate::data::filter::filter_range;
use crate::data::merge::combine;
use crate::data::model::{CombinedTable, DateRange, Dimension, Family, FamilyMetadata, QueryKey, SeriesTable};
use crate::data::selection::FamilySelection;
use crate::summarize::{analysis_prompt, Summarizer, Surprise, SummaryJob};

pub const NO_DATA_MESSAGE: &str = "No valid data to display the combined chart.";

/// A line of inline feedback shown under a family's section.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub text: String,
    pub ok: bool,
}

impl Note {
    fn ok(text: String) -> Self {
        Self { text, ok: true }
    }

    fn problem(text: String) -> Self {
        Self { text, ok: false }
    }
}

// ---------------------------------------------------------------------------
// Per-family state
// ---------------------------------------------------------------------------

pub struct FamilyState {
    pub family: Family,
    pub metadata: FamilyMetadata,
    pub selection: FamilySelection,

    /// Key of the last series fetch, `None` until one was possible.
    pub fetched_key: Option<QueryKey>,

    /// Last fetched series; `None` when the fetch failed or came back empty.
    pub series: Option<SeriesTable>,

    /// Diagnostic from the metadata request, if it failed.
    pub metadata_note: Option<Note>,

    /// Outcome of the last series fetch.
    pub fetch_note: Option<Note>,
}

impl FamilyState {
    fn new(family: Family) -> Self {
        Self {
            family,
            metadata: FamilyMetadata::default(),
            selection: FamilySelection::default(),
            fetched_key: None,
            series: None,
            metadata_note: None,
            fetch_note: None,
        }
    }

    /// Selected indicator code, empty when nothing is selected.
    pub fn indicator_code(&self) -> &str {
        self.selection.code(Dimension::Indicator).unwrap_or_default()
    }

    fn load_metadata(&mut self, client: &DbnomicsClient) {
        let family = self.family;
        match client.fetch_metadata(family) {
            Ok(metadata) => {
                log::info!(
                    "{family} metadata: {} frequencies, {} areas, {} indicators",
                    metadata.frequencies.len(),
                    metadata.ref_areas.len(),
                    metadata.indicators.len()
                );
                self.metadata = metadata;
                self.metadata_note = None;
            }
            Err(e) => {
                log::warn!("Metadata request for {family} failed: {e}");
                self.metadata = FamilyMetadata::default();
                self.metadata_note = Some(Note::problem(format!(
                    "Failed to retrieve data for {family}: {}",
                    status_text(&e)
                )));
            }
        }
        self.selection = FamilySelection::with_defaults(family, &self.metadata);
    }

    /// Fetch the series when the selection maps to a different key, or
    /// retry the same key after a failed fetch. Returns whether anything
    /// changed.
    fn sync_series(&mut self, client: &DbnomicsClient) -> bool {
        let key = self.selection.query_key(self.family);
        let failed = key.is_some() && self.series.is_none();
        if key == self.fetched_key && !failed {
            return false;
        }

        self.series = None;
        self.fetch_note = None;
        if let Some(key) = &key {
            match client.fetch_series(key) {
                Ok(table) => {
                    log::info!("Fetched {} observations for {key}", table.len());
                    self.series = Some(table);
                    self.fetch_note = Some(Note::ok(format!("{} Data fetched successfully", self.family)));
                }
                Err(e) => {
                    log::warn!("Series {key} unavailable: {e}");
                    self.fetch_note = Some(Note::problem(format!(
                        "{} Data fetched but the table is empty or not valid",
                        self.family
                    )));
                }
            }
        }
        self.fetched_key = key;
        true
    }
}

/// The part of a fetch error shown to the user: the status line for HTTP
/// errors, the full message otherwise.
fn status_text(e: &FetchError) -> String {
    match e {
        FetchError::Status(status) => status.to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Every widget change goes
/// through one of the methods below, which re-derive what depends on it.
pub struct AppState {
    client: DbnomicsClient,
    summarizer: Summarizer,

    pub cpi: FamilyState,
    pub pgi: FamilyState,

    /// Inner join of both series, `None` unless both are present.
    pub combined: Option<CombinedTable>,

    /// Date pickers; reset to the combined table's bounds on every rebuild.
    pub range: Option<DateRange>,

    /// `combined` narrowed to `range`.
    pub filtered: Option<CombinedTable>,

    pub surprise: Surprise,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(client: DbnomicsClient, summarizer: Summarizer) -> Self {
        Self {
            client,
            summarizer,
            cpi: FamilyState::new(Family::Cpi),
            pgi: FamilyState::new(Family::Pgi),
            combined: None,
            range: None,
            filtered: None,
            surprise: Surprise::default(),
            status_message: None,
        }
    }

    pub fn family(&self, family: Family) -> &FamilyState {
        match family {
            Family::Cpi => &self.cpi,
            Family::Pgi => &self.pgi,
        }
    }

    fn family_mut(&mut self, family: Family) -> &mut FamilyState {
        match family {
            Family::Cpi => &mut self.cpi,
            Family::Pgi => &mut self.pgi,
        }
    }

    /// Fetch both families' label dictionaries, pre-select the defaults and
    /// fetch the resulting series.
    pub fn load_metadata(&mut self) {
        self.cpi.load_metadata(&self.client);
        self.pgi.load_metadata(&self.client);
        self.refresh();
    }

    /// Reload everything from scratch: metadata, defaults and both series.
    pub fn reload(&mut self) {
        log::info!("Reloading metadata and series");
        for fs in [&mut self.cpi, &mut self.pgi] {
            fs.fetched_key = None;
            fs.series = None;
            fs.fetch_note = None;
        }
        self.load_metadata();
        self.recombine();
    }

    /// Change one dropdown value.
    pub fn select(&mut self, family: Family, dimension: Dimension, option: String) {
        self.family_mut(family).selection.set(dimension, option);
        self.refresh();
    }

    /// Refetch series whose key changed, then rebuild the combined table.
    pub fn refresh(&mut self) {
        let cpi_changed = self.cpi.sync_series(&self.client);
        let pgi_changed = self.pgi.sync_series(&self.client);
        if cpi_changed || pgi_changed {
            self.recombine();
        }
    }

    fn recombine(&mut self) {
        self.combined = combine(self.cpi.series.as_ref(), self.pgi.series.as_ref());
        self.range = self.combined.as_ref().and_then(CombinedTable::period_bounds);
        self.surprise = Surprise::Hidden;
        match &self.combined {
            Some(table) if table.is_empty() => log::warn!("Series share no periods"),
            Some(table) => log::info!("Combined table: {} shared periods", table.len()),
            None => log::info!("{NO_DATA_MESSAGE}"),
        }
        self.refilter();
    }

    /// Set the date pickers and re-apply the filter.
    pub fn set_range(&mut self, range: DateRange) {
        self.range = Some(range);
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = self.combined.as_ref().map(|table| match &self.range {
            Some(range) => filter_range(table, range),
            None => table.clone(),
        });
    }

    /// Chart of the filtered table, `None` while there is no combined data.
    pub fn chart(&self) -> Option<Chart> {
        let table = self.filtered.as_ref()?;
        Some(build_chart(
            table,
            [self.cpi.indicator_code(), self.pgi.indicator_code()],
        ))
    }

    // -- Surprise button --

    /// Start summarizing the filtered table in the background.
    pub fn start_surprise(&mut self) {
        let Some(table) = &self.filtered else {
            return;
        };
        let prompt = analysis_prompt(table);
        log::info!("Requesting summary from {}", self.summarizer.endpoint());
        self.surprise = Surprise::Pending(SummaryJob::spawn(self.summarizer.clone(), prompt));
    }

    /// Collect a finished summary, if any.
    pub fn poll_surprise(&mut self) {
        if let Surprise::Pending(job) = &self.surprise {
            if let Some(result) = job.poll() {
                self.surprise = match result {
                    Ok(summary) => Surprise::Done(summary),
                    Err(e) => {
                        log::error!("Summarization failed: {e}");
                        Surprise::Failed(e.to_string())
                    }
                };
            }
        }
    }

    pub fn cancel_surprise(&mut self) {
        if self.surprise.is_pending() {
            log::info!("Summary cancelled");
            self.surprise = Surprise::Hidden;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use chrono::NaiveDate;
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state_for(server: &MockServer) -> AppState {
        let client = DbnomicsClient::new(server.base_url(), Duration::from_secs(5)).unwrap();
        let summarizer =
            Summarizer::new(&server.base_url(), "facebook/bart-large-cnn", None, Duration::from_secs(5))
                .unwrap();
        AppState::new(client, summarizer)
    }

    fn mock_metadata(server: &MockServer, family: &str, indicators: serde_json::Value) {
        server.mock(|when, then| {
            when.method(GET)
                .path(format!("/series/IMF/{family}"))
                .query_param("facets", "1");
            then.status(200).json_body(json!({
                "dataset": {
                    "code": family,
                    "dimensions_values_labels": {
                        "FREQ": { "A": "Annual", "Q": "Quarterly" },
                        "REF_AREA": { "US": "United States", "FR": "France" },
                        "INDICATOR": indicators
                    }
                }
            }));
        });
    }

    fn mock_series(server: &MockServer, key: &str, years: &[i32], values: &[f64]) {
        let periods: Vec<String> = years.iter().map(|y| y.to_string()).collect();
        let days: Vec<String> = years.iter().map(|y| format!("{y}-01-01")).collect();
        server.mock(|when, then| {
            when.method(GET).path(format!("/series/{key}"));
            then.status(200).json_body(json!({
                "series": {
                    "num_found": 1,
                    "docs": [{ "period": periods, "period_start_day": days, "value": values }]
                }
            }));
        });
    }

    fn default_backend(server: &MockServer) {
        mock_metadata(server, "CPI", json!({ "PCPIA_IX": "Consumer Price Index" }));
        mock_metadata(server, "PGI", json!({ "AIPMA_IX": "Producer Price Index" }));
        mock_series(server, "IMF/CPI/A.US.PCPIA_IX", &[2020, 2021, 2022], &[258.8, 270.9, 292.6]);
        mock_series(server, "IMF/PGI/A.US.AIPMA_IX", &[2021, 2022, 2023], &[112.3, 130.0, 128.4]);
    }

    #[test]
    fn test_end_to_end_defaults() {
        let server = MockServer::start();
        default_backend(&server);

        let mut state = state_for(&server);
        state.load_metadata();

        assert_eq!(state.cpi.fetched_key.as_ref().unwrap().as_str(), "IMF/CPI/A.US.PCPIA_IX");
        assert_eq!(state.pgi.fetched_key.as_ref().unwrap().as_str(), "IMF/PGI/A.US.AIPMA_IX");
        assert_eq!(
            state.cpi.fetch_note,
            Some(Note::ok("CPI Data fetched successfully".into()))
        );

        let filtered = state.filtered.as_ref().unwrap();
        assert_eq!(filtered.periods(), vec![ymd(2021, 1, 1), ymd(2022, 1, 1)]);
        assert_eq!(
            state.range,
            Some(DateRange { start: ymd(2021, 1, 1), end: ymd(2022, 1, 1) })
        );

        let chart = state.chart().unwrap();
        assert_eq!(chart.layers.len(), 2);
        assert_eq!(chart.layers[0].title, "Data for PCPIA_IX from CPI");
        assert_eq!(chart.layers[1].title, "Data for AIPMA_IX from PGI");
        assert_eq!(chart.layers[0].points.len(), 2);
    }

    #[test]
    fn test_metadata_failure_degrades_to_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/series/IMF/CPI");
            then.status(500);
        });
        mock_metadata(&server, "PGI", json!({ "AIPMA_IX": "Producer Price Index" }));
        mock_series(&server, "IMF/PGI/A.US.AIPMA_IX", &[2021], &[1.0]);

        let mut state = state_for(&server);
        state.load_metadata();

        assert!(state.cpi.metadata.is_empty());
        let note = state.cpi.metadata_note.as_ref().unwrap();
        assert!(!note.ok);
        assert_eq!(note.text, "Failed to retrieve data for CPI: 500 Internal Server Error");
        assert!(state.cpi.fetched_key.is_none());
        assert!(state.cpi.series.is_none());
        assert!(state.pgi.series.is_some());
        assert!(state.combined.is_none());
        assert!(state.chart().is_none());
    }

    #[test]
    fn test_empty_series_skips_join() {
        let server = MockServer::start();
        mock_metadata(&server, "CPI", json!({ "PCPIA_IX": "Consumer Price Index" }));
        mock_metadata(&server, "PGI", json!({ "AIPMA_IX": "Producer Price Index" }));
        mock_series(&server, "IMF/CPI/A.US.PCPIA_IX", &[2021], &[1.0]);
        mock_series(&server, "IMF/PGI/A.US.AIPMA_IX", &[], &[]);

        let mut state = state_for(&server);
        state.load_metadata();

        assert!(state.cpi.series.is_some());
        assert!(state.pgi.series.is_none());
        assert_eq!(
            state.pgi.fetch_note,
            Some(Note::problem("PGI Data fetched but the table is empty or not valid".into()))
        );
        assert!(state.combined.is_none());
        assert!(state.filtered.is_none());
        assert!(state.range.is_none());
    }

    #[test]
    fn test_range_excluding_all_rows_renders_empty_chart() {
        let server = MockServer::start();
        default_backend(&server);

        let mut state = state_for(&server);
        state.load_metadata();
        state.set_range(DateRange { start: ymd(1990, 1, 1), end: ymd(1991, 1, 1) });

        assert!(state.filtered.as_ref().unwrap().is_empty());
        assert_eq!(state.combined.as_ref().unwrap().len(), 2);
        let chart = state.chart().unwrap();
        assert_eq!(chart.layers.len(), 2);
        assert!(chart.is_empty());
    }

    #[test]
    fn test_selection_change_refetches_only_that_family() {
        let server = MockServer::start();
        default_backend(&server);
        mock_series(&server, "IMF/CPI/A.FR.PCPIA_IX", &[2022, 2023], &[110.0, 115.0]);

        let mut state = state_for(&server);
        state.load_metadata();
        let pgi_before = state.pgi.series.clone();

        state.select(Family::Cpi, Dimension::RefArea, "FR: France".to_string());

        assert_eq!(state.cpi.fetched_key.as_ref().unwrap().as_str(), "IMF/CPI/A.FR.PCPIA_IX");
        assert_eq!(state.pgi.series, pgi_before);
        assert_eq!(state.filtered.as_ref().unwrap().periods(), vec![ymd(2022, 1, 1), ymd(2023, 1, 1)]);
        assert_eq!(state.range.unwrap().start, ymd(2022, 1, 1));
    }

    #[test]
    fn test_failed_series_is_retried_on_refresh() {
        let server = MockServer::start();
        mock_metadata(&server, "CPI", json!({ "PCPIA_IX": "Consumer Price Index" }));
        mock_metadata(&server, "PGI", json!({ "AIPMA_IX": "Producer Price Index" }));
        mock_series(&server, "IMF/PGI/A.US.AIPMA_IX", &[2021, 2022, 2023], &[112.3, 130.0, 128.4]);
        let mut unavailable = server.mock(|when, then| {
            when.method(GET).path("/series/IMF/CPI/A.US.PCPIA_IX");
            then.status(503);
        });

        let mut state = state_for(&server);
        state.load_metadata();
        assert!(state.cpi.series.is_none());
        assert!(state.combined.is_none());

        unavailable.delete();
        mock_series(&server, "IMF/CPI/A.US.PCPIA_IX", &[2020, 2021, 2022], &[258.8, 270.9, 292.6]);
        state.refresh();

        assert_eq!(state.cpi.series.as_ref().map(SeriesTable::len), Some(3));
        assert_eq!(
            state.cpi.fetch_note,
            Some(Note::ok("CPI Data fetched successfully".into()))
        );
        assert_eq!(state.filtered.as_ref().unwrap().periods(), vec![ymd(2021, 1, 1), ymd(2022, 1, 1)]);
    }

    #[test]
    fn test_refresh_does_not_refetch_a_loaded_series() {
        let server = MockServer::start();
        mock_metadata(&server, "CPI", json!({ "PCPIA_IX": "Consumer Price Index" }));
        mock_metadata(&server, "PGI", json!({ "AIPMA_IX": "Producer Price Index" }));
        mock_series(&server, "IMF/PGI/A.US.AIPMA_IX", &[2021], &[1.0]);
        let cpi = server.mock(|when, then| {
            when.method(GET).path("/series/IMF/CPI/A.US.PCPIA_IX");
            then.status(200).json_body(json!({
                "series": { "docs": [{ "period": ["2021"], "value": [2.0] }] }
            }));
        });

        let mut state = state_for(&server);
        state.load_metadata();
        state.refresh();
        state.refresh();

        cpi.assert_calls(1);
    }

    #[test]
    fn test_reload_recovers_from_metadata_failure() {
        let server = MockServer::start();
        let mut unavailable = server.mock(|when, then| {
            when.method(GET).path("/series/IMF/CPI");
            then.status(500);
        });
        mock_metadata(&server, "PGI", json!({ "AIPMA_IX": "Producer Price Index" }));
        mock_series(&server, "IMF/CPI/A.US.PCPIA_IX", &[2020, 2021, 2022], &[258.8, 270.9, 292.6]);
        mock_series(&server, "IMF/PGI/A.US.AIPMA_IX", &[2021, 2022, 2023], &[112.3, 130.0, 128.4]);

        let mut state = state_for(&server);
        state.load_metadata();
        assert!(state.cpi.metadata.is_empty());
        assert!(state.combined.is_none());

        unavailable.delete();
        mock_metadata(&server, "CPI", json!({ "PCPIA_IX": "Consumer Price Index" }));
        state.reload();

        assert!(state.cpi.metadata_note.is_none());
        assert_eq!(state.cpi.indicator_code(), "PCPIA_IX");
        assert_eq!(state.combined.as_ref().map(CombinedTable::len), Some(2));
    }

    #[test]
    fn test_surprise_summarizes_filtered_table() {
        let server = MockServer::start();
        default_backend(&server);
        let model = server.mock(|when, then| {
            when.method(POST)
                .path("/models/facebook/bart-large-cnn")
                .body_includes("Analyze the following data trends:");
            then.status(200)
                .json_body(json!([{ "summary_text": "Both indices rose between 2021 and 2022." }]));
        });

        let mut state = state_for(&server);
        state.load_metadata();
        state.start_surprise();
        assert!(state.surprise.is_pending());

        let deadline = Instant::now() + Duration::from_secs(5);
        while state.surprise.is_pending() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
            state.poll_surprise();
        }

        model.assert();
        match &state.surprise {
            Surprise::Done(text) => assert_eq!(text, "Both indices rose between 2021 and 2022."),
            _ => panic!("summary did not complete"),
        }
    }

    #[test]
    fn test_surprise_unreachable_without_data() {
        let server = MockServer::start();
        let mut state = state_for(&server);
        state.start_surprise();
        assert!(!state.surprise.is_pending());

        state.cancel_surprise();
        assert!(matches!(state.surprise, Surprise::Hidden));
    }
}
