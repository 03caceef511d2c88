//! Turns `pnputil /enum-drivers` output into [`DriverRecord`]s.
//!
//! Output is one block per package: a `Published Name:` line opens a record,
//! following labelled lines fill in its properties. Anything else is dropped.

use tracing::{debug, trace};

use crate::error::ParseError;
use crate::labels::{value_after_separator, FieldKey};
use crate::record::DriverRecord;

/// Parse enumerate output into records, in output order.
pub fn parse_driver_records(text: &str) -> Result<Vec<DriverRecord>, ParseError> {
    let mut records = Vec::new();
    let mut current: Option<DriverRecord> = None;

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        if FieldKey::PublishedName.starts_line(line) {
            let published_name = match value_after_separator(line) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    return Err(ParseError::MalformedBoundary {
                        line_number: index + 1,
                        line: line.to_string(),
                    })
                }
            };
            records.extend(current.replace(DriverRecord::new(published_name)));
            continue;
        }

        let Some(record) = current.as_mut() else {
            trace!("Ignoring line outside any driver package: {}", line);
            continue;
        };

        let matched = FieldKey::PROPERTIES
            .into_iter()
            .find(|key| key.appears_in(line))
            .zip(value_after_separator(line));
        match matched {
            Some((key, value)) => record.set_field(key, value),
            None => trace!("Ignoring unrecognized line: {}", line),
        }
    }

    records.extend(current);
    debug!("Parsed {} driver packages", records.len());
    Ok(records)
}
