//! CSV report with savings relative to the uncompressed baseline.
//!
//! One row per (size, compressor). Each operation contributes four columns:
//! time, payload bytes, saved time and saved-time percentage, where savings
//! compare against the `none` compressor at the same size and operation.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::compressor::Compressor;
use crate::error::{BenchError, Result};
use crate::harness::{MeasurementTable, Operation, OPERATION_COUNT};

/// Time saved relative to the baseline (negative when slower).
pub fn saved_time(baseline: f64, current: f64) -> f64 {
    baseline - current
}

/// Saved time as a percentage of the baseline.
///
/// A zero baseline yields 0 rather than NaN or infinity.
pub fn saved_percentage(baseline: f64, current: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    let pct = saved_time(baseline, current) / baseline * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// Derived metrics for one operation in one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationReport {
    /// Column prefix (`Insert`, `Query1`, ...).
    pub name: String,
    pub time_secs: f64,
    pub bytes: u64,
    pub saved_time_secs: f64,
    pub saved_time_percentage: f64,
}

/// One (size, compressor) row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub size: usize,
    pub compressor: Compressor,
    /// Insert followed by queries 1..=9.
    pub operations: Vec<OperationReport>,
    pub total_saved_time_percentage: f64,
}

impl ReportRow {
    /// The insert measurement.
    pub fn insert(&self) -> &OperationReport {
        &self.operations[0]
    }

    /// Mean time across the nine queries.
    pub fn mean_query_secs(&self) -> f64 {
        let queries = &self.operations[1..];
        queries.iter().map(|op| op.time_secs).sum::<f64>() / queries.len() as f64
    }

    fn to_record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(2 + OPERATION_COUNT * 4 + 1);
        record.push(self.size.to_string());
        record.push(self.compressor.to_string());
        for op in &self.operations {
            record.push(op.time_secs.to_string());
            record.push(op.bytes.to_string());
            record.push(op.saved_time_secs.to_string());
            record.push(format!("{:.2}", op.saved_time_percentage));
        }
        record.push(format!("{:.2}", self.total_saved_time_percentage));
        record
    }
}

/// The full report, rows ordered by size then compressor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    rows: Vec<ReportRow>,
}

impl Report {
    /// Compute derived metrics from a complete measurement table.
    pub fn build(
        table: &MeasurementTable,
        sizes: &[usize],
        compressors: &[Compressor],
    ) -> Result<Self> {
        if table.sizes() != sizes.len() || table.compressors() != compressors.len() {
            return Err(BenchError::InvalidConfig(format!(
                "table is {}x{} but {} sizes and {} compressors were given",
                table.sizes(),
                table.compressors(),
                sizes.len(),
                compressors.len()
            )));
        }
        let baseline = compressors
            .iter()
            .position(Compressor::is_baseline)
            .ok_or_else(|| {
                BenchError::InvalidConfig("no baseline 'none' compressor to compare against".into())
            })?;

        let cell = |s: usize, c: usize, op: Operation| {
            table
                .get(s, c, op)
                .copied()
                .ok_or(BenchError::MissingMeasurement {
                    size: sizes[s],
                    compressor: compressors[c],
                    operation: op,
                })
        };

        let mut rows = Vec::with_capacity(sizes.len() * compressors.len());
        for (s, &size) in sizes.iter().enumerate() {
            for (c, &compressor) in compressors.iter().enumerate() {
                let mut operations = Vec::with_capacity(OPERATION_COUNT);
                let mut total_baseline = 0.0;
                let mut total_current = 0.0;

                for op in Operation::all() {
                    let base = cell(s, baseline, op)?.secs();
                    let current = cell(s, c, op)?;
                    let time = current.secs();

                    total_baseline += base;
                    total_current += time;
                    operations.push(OperationReport {
                        name: op.column_prefix(),
                        time_secs: time,
                        bytes: current.bytes,
                        saved_time_secs: saved_time(base, time),
                        saved_time_percentage: saved_percentage(base, time),
                    });
                }

                rows.push(ReportRow {
                    size,
                    compressor,
                    operations,
                    total_saved_time_percentage: saved_percentage(total_baseline, total_current),
                });
            }
        }

        Ok(Self { rows })
    }

    /// Report rows.
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// CSV header.
    pub fn header() -> Vec<String> {
        let mut header = vec!["Size".to_string(), "Compression".to_string()];
        for op in Operation::all() {
            let prefix = op.column_prefix();
            header.push(format!("{}Time", prefix));
            header.push(format!("{}Size", prefix));
            header.push(format!("{}SavedTime", prefix));
            header.push(format!("{}SavedTimePercentage", prefix));
        }
        header.push("TotalSavedTimePercentage".to_string());
        header
    }

    /// Write the header and all rows as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(Self::header())?;
        for row in &self.rows {
            wtr.write_record(row.to_record())?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the CSV to `path`.
    ///
    /// The file is staged next to the destination and renamed into place, so
    /// a failed write never leaves a partial report behind.
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        self.write_csv(staged.as_file_mut())?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| e.error)?;

        tracing::info!(path = %path.display(), rows = self.rows.len(), "report written");
        Ok(())
    }
}
