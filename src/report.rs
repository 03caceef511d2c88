//! CSV export of driver listings and plain-text batch summaries.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::batch::{BatchReport, ItemOutcome};
use crate::record::{Column, DriverRecord};

/// Quote a CSV field if it contains a comma, quote or newline.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn catalog_csv(records: &[DriverRecord]) -> String {
    let mut csv_content = String::new();

    let header: Vec<_> = Column::ALL.iter().map(|c| c.title()).collect();
    csv_content.push_str(&header.join(","));
    csv_content.push('\n');

    for record in records {
        let row: Vec<_> = Column::ALL
            .iter()
            .map(|column| escape_csv(record.column_text(*column)))
            .collect();
        csv_content.push_str(&row.join(","));
        csv_content.push('\n');
    }

    csv_content
}

/// Write the given records, in the given order, as a CSV file.
pub fn write_catalog_csv(path: &Path, records: &[DriverRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, catalog_csv(records))
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    info!("Wrote {} driver packages to {}", records.len(), path.display());
    Ok(())
}

fn push_item(summary: &mut String, index: usize, item: &ItemOutcome) {
    summary.push_str(&format!(
        "{}. {} (exit code {})\n",
        index + 1,
        item.published_name,
        item.exit_code
    ));
    if !item.stdout.trim().is_empty() {
        summary.push_str(&format!("   stdout: {}\n", item.stdout.trim()));
    }
    if !item.stderr.trim().is_empty() {
        summary.push_str(&format!("   stderr: {}\n", item.stderr.trim()));
    }
    if let Some(hint) = item.hint() {
        summary.push_str(&format!("   Hint: {hint}\n"));
    }
}

pub fn batch_summary(report: &BatchReport) -> String {
    let estimated_size = report.total() * 300 + 500;
    let mut summary = String::with_capacity(estimated_size);

    summary.push_str("Driver Store Batch Summary\n");
    summary.push_str(&format!(
        "Generated: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    summary.push_str(&format!("Operation: {}\n", report.operation.verb()));
    summary.push_str(&format!(
        "Started: {}\nFinished: {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    summary.push_str(&format!(
        "Total: {}  Succeeded: {}  Failed: {}\n\n",
        report.total(),
        report.succeeded.len(),
        report.failed.len()
    ));

    summary.push_str(&format!("=== Succeeded ({}) ===\n\n", report.succeeded.len()));
    for (index, item) in report.succeeded.iter().enumerate() {
        push_item(&mut summary, index, item);
    }
    summary.push('\n');

    summary.push_str(&format!("=== Failed ({}) ===\n\n", report.failed.len()));
    for (index, item) in report.failed.iter().enumerate() {
        push_item(&mut summary, index, item);
    }

    if let Some(error) = &report.refresh_error {
        summary.push_str(&format!("\nDriver list refresh failed: {error}\n"));
    }

    summary
}

/// Write a timestamped summary file into `dir` and return its path.
pub fn write_batch_summary(dir: &Path, report: &BatchReport) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let timestamp = report.finished_at.format("%Y%m%d_%H%M%S");
    let summary_path = dir.join(format!(
        "driver_{}_{}.txt",
        report.operation.verb(),
        timestamp
    ));

    fs::write(&summary_path, batch_summary(report))
        .with_context(|| format!("Failed to write summary file: {}", summary_path.display()))?;

    info!("Created summary file: {}", summary_path.display());
    Ok(summary_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchOperation;
    use tempfile::TempDir;

    #[test]
    fn csv_quotes_fields_that_need_it() {
        let records = vec![DriverRecord {
            published_name: "oem1.inf".into(),
            original_name: "acme.inf".into(),
            provider: "Acme, Inc.".into(),
            class: "Say \"hi\"".into(),
            driver_version: "1.0".into(),
        }];
        let csv = catalog_csv(&records);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Published Name,Original Name,Provider,Driver Version,Class")
        );
        assert_eq!(
            lines.next(),
            Some("oem1.inf,acme.inf,\"Acme, Inc.\",1.0,\"Say \"\"hi\"\"\"")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_file_is_written_in_given_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("drivers.csv");
        let records = vec![DriverRecord::new("oem2.inf"), DriverRecord::new("oem1.inf")];

        write_catalog_csv(&path, &records).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let rows: Vec<_> = contents.lines().skip(1).collect();
        assert_eq!(rows, vec!["oem2.inf,,,,", "oem1.inf,,,,"]);
    }

    #[test]
    fn summary_lists_failures_with_output() {
        let dir = TempDir::new().unwrap();
        let report = BatchReport {
            operation: BatchOperation::Delete { force: false },
            started_at: Utc::now(),
            finished_at: Utc::now(),
            succeeded: Vec::new(),
            failed: vec![ItemOutcome {
                published_name: "oem3.inf".into(),
                success: false,
                stdout: "Failed to delete driver package: Access is denied.".into(),
                stderr: String::new(),
                exit_code: 5,
            }],
            refresh_error: None,
        };

        let path = write_batch_summary(dir.path(), &report).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("driver_delete_"));
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("=== Failed (1) ==="));
        assert!(contents.contains("1. oem3.inf (exit code 5)"));
        assert!(contents.contains("Access is denied."));
        assert!(contents.contains("Hint: This might be a permissions issue"));
    }
}
