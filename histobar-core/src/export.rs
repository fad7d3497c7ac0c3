use std::io::Write;
use std::path::Path;

use histobar_common::{HistobarError, Result};

use crate::histogram::Histogram;

pub fn histogram_json(histogram: &Histogram) -> serde_json::Value {
    serde_json::json!({
        "min": histogram.min(),
        "max": histogram.max(),
        "highest": histogram.highest_index(),
        "total": histogram.total_count(),
        "categories": histogram.categories(),
    })
}

pub fn write_json<W: Write>(writer: &mut W, histogram: &Histogram) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &histogram_json(histogram))
        .map_err(|e| HistobarError::Other(e.to_string()))?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_csv<W: Write>(writer: &mut W, histogram: &Histogram) -> Result<()> {
    writeln!(writer, "from,to,count")?;
    for category in histogram.categories() {
        writeln!(writer, "{},{},{}", category.from(), category.to(), category.count())?;
    }
    Ok(())
}

pub fn export_json(output_path: &Path, histogram: &Histogram) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    write_json(&mut file, histogram)
}

pub fn export_csv(output_path: &Path, histogram: &Histogram) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    write_csv(&mut file, histogram)
}
