use super::model::{Dimension, Family, FamilyMetadata, LabelDictionary, QueryKey};

// ---------------------------------------------------------------------------
// Dropdown options
// ---------------------------------------------------------------------------

/// `"<code>: <label>"`, the text shown in a dropdown.
pub fn option_text(code: &str, label: &str) -> String {
    format!("{code}: {label}")
}

/// All dropdown options of one dimension.
pub fn options(labels: &LabelDictionary) -> Vec<String> {
    labels
        .iter()
        .map(|(code, label)| option_text(code, label))
        .collect()
}

/// The code part of an option: text before the first colon, trimmed.
pub fn code_of(option: &str) -> &str {
    option.split(':').next().unwrap_or(option).trim()
}

/// Resolve the pre-selected option for `default_code`.
///
/// Falls back to the first available code when the default is missing from
/// the dictionary; `None` only when the dictionary is empty.
pub fn default_option(labels: &LabelDictionary, default_code: &str) -> Option<String> {
    if let Some(label) = labels.get(default_code) {
        return Some(option_text(default_code, label));
    }
    let (code, label) = labels.iter().next()?;
    log::warn!("Default code {default_code:?} not offered, falling back to {code:?}");
    Some(option_text(code, label))
}

// ---------------------------------------------------------------------------
// FamilySelection – the three dropdown values of one family
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilySelection {
    pub frequency: Option<String>,
    pub ref_area: Option<String>,
    pub indicator: Option<String>,
}

impl FamilySelection {
    /// Pre-select each dimension's default code.
    pub fn with_defaults(family: Family, metadata: &FamilyMetadata) -> Self {
        let pick = |dim: Dimension| default_option(metadata.labels(dim), family.default_code(dim));
        FamilySelection {
            frequency: pick(Dimension::Frequency),
            ref_area: pick(Dimension::RefArea),
            indicator: pick(Dimension::Indicator),
        }
    }

    pub fn get(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Frequency => self.frequency.as_deref(),
            Dimension::RefArea => self.ref_area.as_deref(),
            Dimension::Indicator => self.indicator.as_deref(),
        }
    }

    pub fn set(&mut self, dimension: Dimension, option: String) {
        let slot = match dimension {
            Dimension::Frequency => &mut self.frequency,
            Dimension::RefArea => &mut self.ref_area,
            Dimension::Indicator => &mut self.indicator,
        };
        *slot = Some(option);
    }

    /// Selected code of one dimension.
    pub fn code(&self, dimension: Dimension) -> Option<&str> {
        self.get(dimension).map(code_of)
    }

    /// Compose the query key, or `None` while any dimension is unselected.
    pub fn query_key(&self, family: Family) -> Option<QueryKey> {
        Some(QueryKey::new(
            family,
            self.code(Dimension::Frequency)?,
            self.code(Dimension::RefArea)?,
            self.code(Dimension::Indicator)?,
        ))
    }
}
