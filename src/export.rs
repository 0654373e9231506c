// src/export.rs
//! Writes sample sets for plotting tools.

use std::io::Write;

use serde::Serialize;

use crate::error::CalcError;
use crate::motion::trajectory::Sample;

/// Output format for sample export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// Writes one CSV row per sample with a header row.
pub fn write_csv<W: Write>(samples: &[Sample], writer: W) -> Result<(), CalcError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for sample in samples {
        wtr.serialize(sample)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes any serialisable value as pretty JSON.
pub fn write_json<W: Write, T: Serialize + ?Sized>(value: &T, writer: W) -> Result<(), CalcError> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

pub fn write_samples<W: Write>(
    samples: &[Sample],
    format: ExportFormat,
    writer: W,
) -> Result<(), CalcError> {
    tracing::debug!("Exporting {} samples as {:?}", samples.len(), format);
    match format {
        ExportFormat::Csv => write_csv(samples, writer),
        ExportFormat::Json => write_json(samples, writer),
    }
}
