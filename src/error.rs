use thiserror::Error;

/// Failure while turning enumerate output into driver records.
///
/// Parsing fails closed: a single bad boundary line rejects the whole
/// invocation so no record without an identifier reaches the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed published name on line {line_number}: {line:?}")]
    MalformedBoundary { line_number: usize, line: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("No driver packages loaded yet; refresh the driver list first")]
    Empty,
}

/// Errors surfaced by [`crate::manager::DriverManager`].
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Driver enumeration exited with code {exit_code}: {stderr}")]
    EnumerateFailed { exit_code: i32, stderr: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Failed to run driver store tool: {0:#}")]
    Tool(anyhow::Error),
}
