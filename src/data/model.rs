use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Family / Dimension – what the user can pick from
// ---------------------------------------------------------------------------

/// One of the two supported IMF indicator families on DBnomics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    Cpi,
    Pgi,
}

impl Family {
    pub const ALL: [Family; 2] = [Family::Cpi, Family::Pgi];

    /// Short upper-case name, also the dataset code on DBnomics.
    pub fn code(self) -> &'static str {
        match self {
            Family::Cpi => "CPI",
            Family::Pgi => "PGI",
        }
    }

    /// Provider/dataset path used in both metadata and series URLs.
    pub fn dataset_path(self) -> &'static str {
        match self {
            Family::Cpi => "IMF/CPI",
            Family::Pgi => "IMF/PGI",
        }
    }

    /// Column suffix in the combined table (`value_cpi`, `value_pgi`).
    pub fn suffix(self) -> &'static str {
        match self {
            Family::Cpi => "cpi",
            Family::Pgi => "pgi",
        }
    }

    /// Code pre-selected in the dropdown for `dimension`.
    pub fn default_code(self, dimension: Dimension) -> &'static str {
        match (self, dimension) {
            (_, Dimension::Frequency) => "A",
            (_, Dimension::RefArea) => "US",
            (Family::Cpi, Dimension::Indicator) => "PCPIA_IX",
            (Family::Pgi, Dimension::Indicator) => "AIPMA_IX",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The three series dimensions exposed as dropdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Frequency,
    RefArea,
    Indicator,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Frequency, Dimension::RefArea, Dimension::Indicator];

    /// Human label for the dropdown.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Frequency => "Frequency",
            Dimension::RefArea => "Reference Area",
            Dimension::Indicator => "Indicator",
        }
    }
}

// ---------------------------------------------------------------------------
// Label dictionaries
// ---------------------------------------------------------------------------

/// Code → human-readable label for one dimension.
pub type LabelDictionary = BTreeMap<String, String>;

/// The three label dictionaries of one indicator family.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyMetadata {
    pub frequencies: LabelDictionary,
    pub ref_areas: LabelDictionary,
    pub indicators: LabelDictionary,
}

impl FamilyMetadata {
    pub fn labels(&self, dimension: Dimension) -> &LabelDictionary {
        match dimension {
            Dimension::Frequency => &self.frequencies,
            Dimension::RefArea => &self.ref_areas,
            Dimension::Indicator => &self.indicators,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty() && self.ref_areas.is_empty() && self.indicators.is_empty()
    }
}

// ---------------------------------------------------------------------------
// QueryKey
// ---------------------------------------------------------------------------

/// `<PROVIDER>/<DATASET>/<FREQ>.<REGION>.<INDICATOR>`, always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(family: Family, frequency: &str, ref_area: &str, indicator: &str) -> Self {
        let key = format!(
            "{}/{}.{}.{}",
            family.dataset_path(),
            frequency,
            ref_area,
            indicator
        );
        QueryKey(key.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// SeriesTable – one fetched indicator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub period: NaiveDate,
    pub value: f64,
}

/// Observations of one series, in the order the provider returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    pub key: QueryKey,
    pub rows: Vec<Observation>,
}

impl SeriesTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows, for the preview table.
    pub fn head(&self, n: usize) -> &[Observation] {
        &self.rows[..self.rows.len().min(n)]
    }
}

// ---------------------------------------------------------------------------
// CombinedTable – the two series joined on period
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedRow {
    pub period: NaiveDate,
    pub value_cpi: f64,
    pub value_pgi: f64,
}

impl CombinedRow {
    pub fn value(&self, family: Family) -> f64 {
        match family {
            Family::Cpi => self.value_cpi,
            Family::Pgi => self.value_pgi,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedTable {
    pub rows: Vec<CombinedRow>,
}

impl CombinedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[cfg(test)]
    pub fn periods(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.period).collect()
    }

    /// Observed (min, max) period, `None` for an empty table.
    pub fn period_bounds(&self) -> Option<DateRange> {
        let start = self.rows.iter().map(|r| r.period).min()?;
        let end = self.rows.iter().map(|r| r.period).max()?;
        Some(DateRange { start, end })
    }

    /// Plain-text rendering of `period`, `value_cpi`, `value_pgi`: right
    /// aligned columns, no index, one row per line.
    pub fn to_text(&self) -> String {
        let headers = [
            "period".to_string(),
            format!("value_{}", Family::Cpi.suffix()),
            format!("value_{}", Family::Pgi.suffix()),
        ];
        let cpi_decimals = shared_decimals(self.rows.iter().map(|r| r.value_cpi));
        let pgi_decimals = shared_decimals(self.rows.iter().map(|r| r.value_pgi));

        let cells: Vec<[String; 3]> = self
            .rows
            .iter()
            .map(|r| {
                [
                    r.period.format("%Y-%m-%d").to_string(),
                    format!("{:.*}", cpi_decimals, r.value_cpi),
                    format!("{:.*}", pgi_decimals, r.value_pgi),
                ]
            })
            .collect();

        let mut widths = headers.clone().map(|h| h.len());
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }

        let mut lines = Vec::with_capacity(cells.len() + 1);
        lines.push(format_line(&headers, &widths));
        for row in &cells {
            lines.push(format_line(row, &widths));
        }
        lines.join("\n")
    }
}

fn format_line(cells: &[String; 3], widths: &[usize; 3]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(c, &w)| format!("{c:>w$}"))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Smallest number of decimals (max 6) that shows every value exactly at
/// that precision, so a column lines up on the decimal point.
fn shared_decimals(values: impl Iterator<Item = f64>) -> usize {
    values
        .map(|v| {
            let s = format!("{v:.6}");
            let trimmed = s.trim_end_matches('0');
            trimmed.len() - trimmed.find('.').map_or(trimmed.len(), |dot| dot + 1)
        })
        .max()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// Inclusive (start, end) bounds chosen with the date pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
