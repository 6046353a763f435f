use super::model::{CombinedTable, DateRange};

/// Keep the rows whose period lies in `range` (both bounds inclusive).
///
/// A reversed range (start after end) selects nothing.
pub fn filter_range(table: &CombinedTable, range: &DateRange) -> CombinedTable {
    CombinedTable {
        rows: table
            .rows
            .iter()
            .filter(|row| range.contains(row.period))
            .copied()
            .collect(),
    }
}
