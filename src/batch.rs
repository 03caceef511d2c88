//! Runs one driver store operation per selected package and gathers every
//! outcome into a single [`BatchReport`].

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::store::{DriverStore, ToolOutput};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchOperation {
    /// Remove packages from the store, uninstalling them from devices.
    Delete { force: bool },
    /// Copy packages into a directory.
    Export { destination: PathBuf },
}

impl BatchOperation {
    /// Whether the operation changes what the store enumerates afterwards.
    pub fn mutates_store(&self) -> bool {
        matches!(self, BatchOperation::Delete { .. })
    }

    pub fn verb(&self) -> &'static str {
        match self {
            BatchOperation::Delete { .. } => "delete",
            BatchOperation::Export { .. } => "export",
        }
    }
}

/// Result of the operation for one package.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub published_name: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ItemOutcome {
    fn from_output(published_name: &str, output: ToolOutput) -> Self {
        Self {
            published_name: published_name.to_string(),
            success: output.success(),
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.exit_code,
        }
    }

    fn spawn_failure(published_name: &str, error: &anyhow::Error) -> Self {
        Self {
            published_name: published_name.to_string(),
            success: false,
            stdout: String::new(),
            stderr: format!("{error:#}"),
            exit_code: -1,
        }
    }

    /// Likely cause of a failure, guessed from the tool's output.
    pub fn hint(&self) -> Option<&'static str> {
        if self.success {
            return None;
        }
        let stderr = self.stderr.to_lowercase();
        let stdout = self.stdout.to_lowercase();
        let output = format!("{stdout}\n{stderr}");

        if (output.contains("access") && output.contains("denied")) || self.exit_code == 5 {
            Some("This might be a permissions issue. Try running as Administrator.")
        } else if output.contains("presently installed") || output.contains("in use") {
            Some("The package is still used by a device. Retry with force enabled.")
        } else if output.contains("not found") || output.contains("cannot find") {
            Some("Driver package might be corrupted or already removed.")
        } else if output.contains("the data is invalid") || self.exit_code == 13 {
            Some("This driver may be protected or corrupted.")
        } else if self.exit_code == -1 {
            Some("Make sure pnputil is in your PATH and you have administrative privileges.")
        } else {
            None
        }
    }
}

/// Aggregated outcome of a batch, split by success.
#[derive(Serialize, Debug, Clone)]
pub struct BatchReport {
    pub operation: BatchOperation,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub succeeded: Vec<ItemOutcome>,
    pub failed: Vec<ItemOutcome>,
    /// Set when the catalog could not be rebuilt after a mutating batch.
    pub refresh_error: Option<String>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Human-readable summary, one line per package.
    pub fn render(&self) -> String {
        let mut text = String::new();
        let verb = self.operation.verb();
        text.push_str(&format!(
            "{} of {} driver packages: {} succeeded, {} failed\n",
            capitalize(verb),
            self.total(),
            self.succeeded.len(),
            self.failed.len()
        ));
        for item in &self.succeeded {
            text.push_str(&format!("  ✓ {}\n", item.published_name));
        }
        for item in &self.failed {
            text.push_str(&format!(
                "  ✗ {} (exit code {})\n",
                item.published_name, item.exit_code
            ));
            if !item.stdout.trim().is_empty() {
                text.push_str(&format!("    stdout: {}\n", item.stdout.trim()));
            }
            if !item.stderr.trim().is_empty() {
                text.push_str(&format!("    stderr: {}\n", item.stderr.trim()));
            }
            if let Some(hint) = item.hint() {
                text.push_str(&format!("    → {hint}\n"));
            }
        }
        if let Some(error) = &self.refresh_error {
            text.push_str(&format!("Driver list could not be refreshed: {error}\n"));
        }
        text
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Apply `operation` to each package in order, one invocation at a time.
///
/// A failure never stops the batch; every name is attempted exactly once.
pub async fn run_batch<S>(
    store: &S,
    published_names: &[String],
    operation: &BatchOperation,
) -> BatchReport
where
    S: DriverStore + ?Sized,
{
    let started_at = Utc::now();
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();

    for name in published_names {
        let result = match operation {
            BatchOperation::Delete { force } => store.delete(name, *force).await,
            BatchOperation::Export { destination } => store.export(name, destination).await,
        };

        let outcome = match result {
            Ok(output) => ItemOutcome::from_output(name, output),
            Err(error) => {
                warn!("Failed to {} {}: {:#}", operation.verb(), name, error);
                ItemOutcome::spawn_failure(name, &error)
            }
        };

        if outcome.success {
            info!("{} {}: ok", operation.verb(), name);
            succeeded.push(outcome);
        } else {
            warn!(
                "{} {}: exit code {}",
                operation.verb(),
                name,
                outcome.exit_code
            );
            failed.push(outcome);
        }
    }

    BatchReport {
        operation: operation.clone(),
        started_at,
        finished_at: Utc::now(),
        succeeded,
        failed,
        refresh_error: None,
    }
}
