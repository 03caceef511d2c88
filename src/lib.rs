//! Browse, search and clean up the Windows driver store through `pnputil`.
//!
//! [`manager::DriverManager`] ties the pieces together: it enumerates the
//! store, parses the listing into a [`catalog::Catalog`], serves filtered and
//! sorted views of it, and runs batch deletes/exports that rebuild the
//! catalog afterwards.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod labels;
pub mod logging;
pub mod manager;
pub mod parser;
pub mod query;
pub mod record;
pub mod report;
pub mod shell;
pub mod store;

#[cfg(test)]
mod testing;

pub use batch::{BatchOperation, BatchReport, ItemOutcome};
pub use catalog::Catalog;
pub use config::Config;
pub use error::{CatalogError, ManagerError, ParseError};
pub use manager::DriverManager;
pub use parser::parse_driver_records;
pub use query::{apply_filter, sort_records, ProviderQuery, SortOrder, SortState};
pub use record::{Column, DriverRecord};
pub use store::{DriverStore, PnpUtil, ToolOutput};
