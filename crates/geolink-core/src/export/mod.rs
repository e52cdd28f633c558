//! Textual notation export

mod options;
mod textual;

use crate::component::ComponentTree;

pub use options::ExportOptions;
pub use textual::{quote_name, quote_text};

use textual::generate_notation_string;

/// Serialize the subtree under `root_name` as a notation package
pub fn export_text(
    tree: &ComponentTree,
    root_name: &str,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    if !tree.contains(root_name) {
        return Err(ExportError::RootNotFound(root_name.to_string()));
    }
    let text = generate_notation_string(tree, root_name, options);
    tracing::debug!(
        root = root_name,
        components = tree.subtree(root_name).len(),
        "exported component tree"
    );
    Ok(text)
}

/// Export-related errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("Root component not found: {0}")]
    RootNotFound(String),
}
