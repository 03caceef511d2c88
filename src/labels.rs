//! Field labels pnputil prints in front of each value, per display language.
//!
//! Every label is tested on every line regardless of the system locale, so a
//! new language only needs new entries here.

/// Canonical fields of an enumerated driver package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    PublishedName,
    OriginalName,
    Provider,
    Class,
    DriverVersion,
}

impl FieldKey {
    /// Property fields in the order they are tested against a line.
    pub const PROPERTIES: [FieldKey; 4] = [
        FieldKey::OriginalName,
        FieldKey::Provider,
        FieldKey::Class,
        FieldKey::DriverVersion,
    ];

    /// Recognized labels for this field: English, German, Simplified Chinese.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            FieldKey::PublishedName => &["Published Name", "Veröffentlichter Name", "发布名称"],
            FieldKey::OriginalName => &["Original Name", "Ursprünglicher Name", "原始名称"],
            FieldKey::Provider => &["Provider Name", "Anbietername", "提供程序名称"],
            FieldKey::Class => &["Class Name", "Klassenname", "类名"],
            FieldKey::DriverVersion => &["Driver Version", "Treiberversion", "驱动程序版本"],
        }
    }

    /// True when the (trimmed) line starts with one of this field's labels.
    pub fn starts_line(self, line: &str) -> bool {
        let line = line.trim_start().to_lowercase();
        self.labels()
            .iter()
            .any(|label| line.starts_with(&label.to_lowercase()))
    }

    /// True when one of this field's labels occurs anywhere in the line.
    pub fn appears_in(self, line: &str) -> bool {
        let line = line.to_lowercase();
        self.labels()
            .iter()
            .any(|label| line.contains(&label.to_lowercase()))
    }
}

/// Split a labelled line at its first separator and return the trimmed value.
///
/// Values keep any later separators verbatim (`Driver Version: 1.0:2.0`
/// yields `1.0:2.0`). Returns `None` when the line has no separator.
pub fn value_after_separator(line: &str) -> Option<&str> {
    line.find([':', '：'])
        .map(|idx| {
            let sep_len = line[idx..].chars().next().map_or(1, char::len_utf8);
            line[idx + sep_len..].trim()
        })
}
