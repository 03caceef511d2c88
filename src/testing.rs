//! In-memory driver store for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::store::{DriverStore, ToolOutput};

/// Replays canned enumerate output and records every call it receives.
pub struct ScriptedStore {
    listings: Mutex<VecDeque<ToolOutput>>,
    delete_failures: HashMap<String, i32>,
    unreachable: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedStore {
    pub fn new(listing: &str) -> Self {
        Self {
            listings: Mutex::new(VecDeque::from([listed(listing)])),
            delete_failures: HashMap::new(),
            unreachable: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Output for the next enumerate after the current one.
    pub fn then_list(self, listing: &str) -> Self {
        self.then_enumerate(listed(listing))
    }

    pub fn then_enumerate(self, output: ToolOutput) -> Self {
        self.listings.lock().unwrap().push_back(output);
        self
    }

    pub fn fail_delete(mut self, published_name: &str, exit_code: i32) -> Self {
        self.delete_failures
            .insert(published_name.to_string(), exit_code);
        self
    }

    pub fn unreachable_for(mut self, published_name: &str) -> Self {
        self.unreachable.insert(published_name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn listed(stdout: &str) -> ToolOutput {
    ToolOutput {
        stdout: stdout.to_string(),
        ..ToolOutput::default()
    }
}

#[async_trait]
impl DriverStore for ScriptedStore {
    async fn enumerate(&self) -> Result<ToolOutput> {
        self.record("enumerate".to_string());
        let mut listings = self.listings.lock().unwrap();
        let output = if listings.len() > 1 {
            listings.pop_front()
        } else {
            listings.front().cloned()
        };
        Ok(output.unwrap_or_default())
    }

    async fn delete(&self, published_name: &str, force: bool) -> Result<ToolOutput> {
        let suffix = if force { " force" } else { "" };
        self.record(format!("delete {published_name}{suffix}"));
        if self.unreachable.contains(published_name) {
            bail!("pnputil could not be started");
        }
        let exit_code = self
            .delete_failures
            .get(published_name)
            .copied()
            .unwrap_or(0);
        Ok(ToolOutput {
            stdout: format!("Deleting driver package {published_name}"),
            stderr: String::new(),
            exit_code,
        })
    }

    async fn export(&self, published_name: &str, destination: &Path) -> Result<ToolOutput> {
        self.record(format!("export {published_name} {}", destination.display()));
        if self.unreachable.contains(published_name) {
            bail!("pnputil could not be started");
        }
        Ok(listed("Exported driver package"))
    }
}
