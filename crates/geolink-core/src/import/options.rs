//! Import options for component trees

use crate::constants::COMPONENT_DEFINITION;

/// Import options for notation documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Part definition whose usages are components even without a `typeID`
    pub component_definition: String,
    /// Type tag for components that do not declare one
    pub default_type_id: i64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            component_definition: COMPONENT_DEFINITION.to_string(),
            default_type_id: 0,
        }
    }
}
