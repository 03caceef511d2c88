use chrono::{DateTime, Utc};

use crate::error::CatalogError;
use crate::record::DriverRecord;

/// The most recently enumerated driver packages.
///
/// Only [`Catalog::replace`] writes to it; every refresh swaps in a whole new
/// sequence and the old one is dropped.
#[derive(Debug, Default)]
pub struct Catalog {
    snapshot: Option<Snapshot>,
}

#[derive(Debug)]
struct Snapshot {
    records: Vec<DriverRecord>,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, records: Vec<DriverRecord>) {
        self.snapshot = Some(Snapshot {
            records,
            loaded_at: Utc::now(),
        });
    }

    /// Records of the last successful enumerate.
    ///
    /// An enumerate that found zero packages is still a loaded catalog; only
    /// a catalog that was never loaded reports [`CatalogError::Empty`].
    pub fn records(&self) -> Result<&[DriverRecord], CatalogError> {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.records.as_slice())
            .ok_or(CatalogError::Empty)
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.as_ref().map(|snapshot| snapshot.loaded_at)
    }

    pub fn len(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |snapshot| snapshot.records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unloaded_catalog_reports_empty() {
        let catalog = Catalog::new();
        assert_eq!(catalog.records(), Err(CatalogError::Empty));
        assert!(catalog.loaded_at().is_none());
    }

    #[test]
    fn replace_discards_previous_records() {
        let mut catalog = Catalog::new();
        catalog.replace(vec![DriverRecord::new("oem1.inf"), DriverRecord::new("oem2.inf")]);
        catalog.replace(vec![DriverRecord::new("oem3.inf")]);
        assert_eq!(catalog.records().unwrap(), &[DriverRecord::new("oem3.inf")]);
    }

    #[test]
    fn zero_records_is_still_loaded() {
        let mut catalog = Catalog::new();
        catalog.replace(Vec::new());
        assert!(catalog.loaded_at().is_some());
        assert!(catalog.records().unwrap().is_empty());
    }
}
