//! Provider search and column sorting over the catalog.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::{Column, DriverRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Column,
    pub order: SortOrder,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: Column::Provider,
            order: SortOrder::Ascending,
        }
    }
}

impl SortState {
    /// Column header click: same column flips direction, a new column starts
    /// ascending.
    pub fn click(&mut self, column: Column) {
        if column == self.column {
            self.order = match self.order {
                SortOrder::Ascending => SortOrder::Descending,
                SortOrder::Descending | SortOrder::None => SortOrder::Ascending,
            };
        } else {
            self.column = column;
            self.order = SortOrder::Ascending;
        }
    }
}

/// Search text as typed plus the placeholder the search box shows when idle.
#[derive(Debug, Clone, Default)]
pub struct ProviderQuery {
    text: String,
    placeholder: String,
}

impl ProviderQuery {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            placeholder: placeholder.into(),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Blank text and the untouched placeholder both match everything.
    pub fn is_empty(&self) -> bool {
        let text = self.text.trim();
        text.is_empty() || text == self.placeholder.trim()
    }

    pub fn matches(&self, record: &DriverRecord) -> bool {
        if self.is_empty() {
            return true;
        }
        !record.provider.is_empty() && contains_ignore_case(&record.provider, self.text.trim())
    }
}

/// Records whose provider contains the query, in catalog order.
pub fn apply_filter(records: &[DriverRecord], query: &ProviderQuery) -> Vec<DriverRecord> {
    records
        .iter()
        .filter(|record| query.matches(record))
        .cloned()
        .collect()
}

/// Stable sort by the text of one column.
pub fn sort_records(mut records: Vec<DriverRecord>, state: SortState) -> Vec<DriverRecord> {
    let column = state.column;
    match state.order {
        SortOrder::None => {}
        SortOrder::Ascending => records.sort_by(|a, b| {
            compare_ignore_case(a.column_text(column), b.column_text(column))
        }),
        SortOrder::Descending => records.sort_by(|a, b| {
            compare_ignore_case(a.column_text(column), b.column_text(column)).reverse()
        }),
    }
    records
}

/// Upper-case one char to exactly one char; expansions like `ß` → `SS`
/// leave the char as is.
fn fold_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

fn fold(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().map(fold_char)
}

/// Ordinal comparison after per-char upper-casing; no locale collation.
pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    fold(a).cmp(fold(b))
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let haystack: String = fold(haystack).collect();
    let needle: String = fold(needle).collect();
    haystack.contains(&needle)
}
