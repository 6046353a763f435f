use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{CombinedRow, CombinedTable, SeriesTable};

/// Build the combined table, or `None` unless both series are present and
/// non-empty. The join is not attempted otherwise.
pub fn combine(cpi: Option<&SeriesTable>, pgi: Option<&SeriesTable>) -> Option<CombinedTable> {
    let cpi = cpi.filter(|t| !t.is_empty())?;
    let pgi = pgi.filter(|t| !t.is_empty())?;
    Some(inner_join(cpi, pgi))
}

/// Inner join on period.
///
/// Periods missing from either side are dropped. A period repeated on
/// both sides yields every pairing. Output is sorted by period; ties keep
/// CPI order, then PGI order.
pub fn inner_join(cpi: &SeriesTable, pgi: &SeriesTable) -> CombinedTable {
    let mut pgi_by_period: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for obs in &pgi.rows {
        pgi_by_period.entry(obs.period).or_default().push(obs.value);
    }

    let mut rows: Vec<CombinedRow> = cpi
        .rows
        .iter()
        .flat_map(|left| {
            pgi_by_period
                .get(&left.period)
                .into_iter()
                .flatten()
                .map(move |&value_pgi| CombinedRow {
                    period: left.period,
                    value_cpi: left.value,
                    value_pgi,
                })
        })
        .collect();
    rows.sort_by_key(|r| r.period);

    CombinedTable { rows }
}
