#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use driver_store_manager::{DriverStore, ToolOutput};

/// Driver store that keeps its packages in memory and removes them on a
/// successful delete, so every enumerate reflects earlier operations.
pub struct MemoryStore {
    packages: Mutex<Vec<(String, String)>>,
    locked: HashMap<String, i32>,
    pub log: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new(packages: &[(&str, &str)]) -> Self {
        Self {
            packages: Mutex::new(
                packages
                    .iter()
                    .map(|(name, provider)| (name.to_string(), provider.to_string()))
                    .collect(),
            ),
            locked: HashMap::new(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Deleting `name` fails with `exit_code` and leaves it in place.
    pub fn locked(mut self, name: &str, exit_code: i32) -> Self {
        self.locked.insert(name.to_string(), exit_code);
        self
    }

    pub fn listing(&self) -> String {
        let packages = self.packages.lock().unwrap();
        let mut text = String::from("Microsoft PnP Utility\r\n\r\n");
        for (name, provider) in packages.iter() {
            text.push_str(&format!(
                "Published Name:     {name}\r\nOriginal Name:      {name}.orig\r\nProvider Name:      {provider}\r\nClass Name:         System\r\nDriver Version:     01/01/2024 1.0.0.0\r\n\r\n"
            ));
        }
        text
    }
}

#[async_trait]
impl DriverStore for MemoryStore {
    async fn enumerate(&self) -> Result<ToolOutput> {
        self.log.lock().unwrap().push("enumerate".into());
        Ok(ToolOutput {
            stdout: self.listing(),
            ..ToolOutput::default()
        })
    }

    async fn delete(&self, published_name: &str, _force: bool) -> Result<ToolOutput> {
        self.log.lock().unwrap().push(format!("delete {published_name}"));
        if let Some(code) = self.locked.get(published_name) {
            return Ok(ToolOutput {
                stdout: "One or more devices are presently installed using the specified INF.".into(),
                stderr: String::new(),
                exit_code: *code,
            });
        }
        let mut packages = self.packages.lock().unwrap();
        let before = packages.len();
        packages.retain(|(name, _)| name != published_name);
        let exit_code = if packages.len() < before { 0 } else { 2 };
        Ok(ToolOutput {
            stdout: format!("Driver package {published_name}"),
            stderr: String::new(),
            exit_code,
        })
    }

    async fn export(&self, published_name: &str, destination: &Path) -> Result<ToolOutput> {
        self.log
            .lock()
            .unwrap()
            .push(format!("export {published_name} {}", destination.display()));
        Ok(ToolOutput::default())
    }
}
