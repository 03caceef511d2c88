use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::labels::FieldKey;

/// One driver package from the driver store.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverRecord {
    /// Store-assigned name (`oem12.inf`); used to address the package.
    pub published_name: String,
    pub original_name: String,
    pub provider: String,
    pub class: String,
    pub driver_version: String,
}

impl DriverRecord {
    pub fn new(published_name: impl Into<String>) -> Self {
        Self {
            published_name: published_name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn set_field(&mut self, key: FieldKey, value: &str) {
        let slot = match key {
            FieldKey::PublishedName => &mut self.published_name,
            FieldKey::OriginalName => &mut self.original_name,
            FieldKey::Provider => &mut self.provider,
            FieldKey::Class => &mut self.class,
            FieldKey::DriverVersion => &mut self.driver_version,
        };
        *slot = value.to_string();
    }

    /// Text shown in the given display column.
    pub fn column_text(&self, column: Column) -> &str {
        match column {
            Column::PublishedName => &self.published_name,
            Column::OriginalName => &self.original_name,
            Column::Provider => &self.provider,
            Column::DriverVersion => &self.driver_version,
            Column::Class => &self.class,
        }
    }
}

/// Display columns, in on-screen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Column {
    PublishedName,
    OriginalName,
    Provider,
    DriverVersion,
    Class,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::PublishedName,
        Column::OriginalName,
        Column::Provider,
        Column::DriverVersion,
        Column::Class,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            Column::PublishedName => "Published Name",
            Column::OriginalName => "Original Name",
            Column::Provider => "Provider",
            Column::DriverVersion => "Driver Version",
            Column::Class => "Class",
        }
    }

    /// Accepts a column index (`2`) or a name (`provider`, `driver-version`).
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(index) = input.parse::<usize>() {
            return Self::from_index(index);
        }
        <Self as ValueEnum>::from_str(input, true).ok()
    }
}
