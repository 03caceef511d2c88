//! Top-level coordinator: owns the catalog and the view state, and is the
//! only place that writes the catalog.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::batch::{run_batch, BatchOperation, BatchReport};
use crate::catalog::Catalog;
use crate::error::{CatalogError, ManagerError};
use crate::parser::parse_driver_records;
use crate::query::{apply_filter, sort_records, ProviderQuery, SortState};
use crate::record::{Column, DriverRecord};
use crate::store::DriverStore;

pub struct DriverManager<S> {
    store: S,
    catalog: Catalog,
    query: ProviderQuery,
    sort: SortState,
}

impl<S: DriverStore> DriverManager<S> {
    pub fn new(store: S, search_placeholder: impl Into<String>) -> Self {
        Self {
            store,
            catalog: Catalog::new(),
            query: ProviderQuery::new(search_placeholder),
            sort: SortState::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Re-enumerate the driver store and replace the catalog.
    ///
    /// On any failure the previous catalog stays in place. A successful
    /// refresh resets sorting to provider ascending; the search text is kept.
    pub async fn refresh(&mut self) -> Result<usize, ManagerError> {
        let output = self.store.enumerate().await.map_err(ManagerError::Tool)?;
        if !output.success() {
            return Err(ManagerError::EnumerateFailed {
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let records = parse_driver_records(&output.stdout)?;
        let count = records.len();
        self.catalog.replace(records);
        self.sort = SortState::default();
        info!("Loaded {} driver packages", count);
        Ok(count)
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.query.set_text(text);
    }

    pub fn query(&self) -> &ProviderQuery {
        &self.query
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    pub fn click_column(&mut self, column: Column) {
        self.sort.click(column);
    }

    /// Catalog records after the current search and sort.
    pub fn view(&self) -> Result<Vec<DriverRecord>, CatalogError> {
        let records = self.catalog.records()?;
        Ok(sort_records(apply_filter(records, &self.query), self.sort))
    }

    /// Delete packages one by one, then rebuild the catalog whatever the
    /// outcome.
    pub async fn uninstall(&mut self, published_names: &[String], force: bool) -> BatchReport {
        self.run(published_names, BatchOperation::Delete { force })
            .await
    }

    pub async fn export(&mut self, published_names: &[String], destination: PathBuf) -> BatchReport {
        self.run(published_names, BatchOperation::Export { destination })
            .await
    }

    async fn run(&mut self, published_names: &[String], operation: BatchOperation) -> BatchReport {
        info!(
            "Starting {} of {} driver packages",
            operation.verb(),
            published_names.len()
        );
        let mut report = run_batch(&self.store, published_names, &operation).await;

        if operation.mutates_store() {
            if let Err(error) = self.refresh().await {
                warn!("Failed to refresh driver list after {}: {}", operation.verb(), error);
                report.refresh_error = Some(error.to_string());
            }
        }
        report
    }
}
