//! Boundary to the driver store: `pnputil` on Windows, or anything else that
//! speaks the same enumerate/delete/export contract.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one tool invocation.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Operations the manager needs from the driver store.
///
/// Every call runs to completion before returning; callers never overlap
/// invocations.
#[async_trait]
pub trait DriverStore: Send + Sync {
    /// List installed driver packages.
    async fn enumerate(&self) -> Result<ToolOutput>;

    /// Remove one package, uninstalling it from devices that use it.
    async fn delete(&self, published_name: &str, force: bool) -> Result<ToolOutput>;

    /// Copy one package into `destination`.
    async fn export(&self, published_name: &str, destination: &Path) -> Result<ToolOutput>;
}

/// `pnputil.exe` driver store backend.
#[derive(Debug, Clone)]
pub struct PnpUtil {
    program: PathBuf,
}

impl PnpUtil {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&OsStr]) -> Result<ToolOutput> {
        debug!("Running {} {:?}", self.program.display(), args);
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .with_context(|| {
                format!(
                    "Failed to execute {}. Make sure it is in your PATH.",
                    self.program.display()
                )
            })?;

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

impl Default for PnpUtil {
    fn default() -> Self {
        Self::new("pnputil")
    }
}

#[async_trait]
impl DriverStore for PnpUtil {
    async fn enumerate(&self) -> Result<ToolOutput> {
        self.run(&[OsStr::new("/enum-drivers")]).await
    }

    async fn delete(&self, published_name: &str, force: bool) -> Result<ToolOutput> {
        let mut args: Vec<&OsStr> = vec![
            OsStr::new("/delete-driver"),
            OsStr::new(published_name),
            OsStr::new("/uninstall"),
        ];
        if force {
            args.push(OsStr::new("/force"));
        }
        self.run(&args).await
    }

    async fn export(&self, published_name: &str, destination: &Path) -> Result<ToolOutput> {
        self.run(&[
            OsStr::new("/export-driver"),
            OsStr::new(published_name),
            destination.as_os_str(),
        ])
        .await
    }
}
