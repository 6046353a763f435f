use std::path::Path;

use anyhow::{Context, Result};

use super::model::CombinedTable;

/// Write the combined table as `period,value_cpi,value_pgi` CSV. Missing
/// (NaN) values are written as empty fields.
pub fn write_csv(path: &Path, table: &CombinedTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer
        .write_record(["period", "value_cpi", "value_pgi"])
        .context("writing CSV header")?;
    for (i, row) in table.rows.iter().enumerate() {
        writer
            .write_record([
                row.period.format("%Y-%m-%d").to_string(),
                csv_value(row.value_cpi),
                csv_value(row.value_pgi),
            ])
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn csv_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}
