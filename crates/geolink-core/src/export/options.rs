//! Export options for the textual notation

use crate::constants::DEFAULT_PACKAGE_NAME;

/// Export options for notation generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Name of the enclosing package
    pub package_name: String,
    /// Spaces per nesting level
    pub indent: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            indent: 4,
        }
    }
}

impl ExportOptions {
    pub fn with_package(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            ..Self::default()
        }
    }
}
