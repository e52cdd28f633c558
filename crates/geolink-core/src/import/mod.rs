//! Component tree import from document trees
//!
//! Rebuilds a [`ComponentTree`] from any [`DocumentNode`] tree, typically one
//! produced by [`crate::document::parse`] from exported notation text.

mod options;

use crate::component::{Component, ComponentError, ComponentTree};
use crate::constants::SOURCE_URL_ATTRIBUTE;
use crate::document::{self, DocumentNode, EvaluationError, ParseError};
use crate::pose::read_local_pose;
use crate::search::is_part_definition_named;

pub use options::ImportOptions;

/// Errors that can occur during component import
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to parse document: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to evaluate attribute: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Component(#[from] ComponentError),

    /// `parent` is the enclosing component, `None` at the top level
    #[error("Component part under {} has no name", describe_parent(.parent))]
    UnnamedComponent { parent: Option<String> },

    #[error("Document contains no components")]
    NoComponents,
}

fn describe_parent(parent: &Option<String>) -> String {
    match parent {
        Some(name) => format!("'{name}'"),
        None => "the document root".to_string(),
    }
}

/// Result of an import: the first root and the rebuilt tree
#[derive(Debug, Clone)]
pub struct ImportedTree {
    pub root: String,
    pub tree: ComponentTree,
}

/// Import every component part below `root`
///
/// A part usage becomes a component when it carries a numeric `typeID` or is
/// typed by the component definition. Its parent is the nearest ancestor that
/// was itself imported; wrapper nodes in between are skipped.
pub fn import_components<N: DocumentNode>(
    root: &N,
    options: &ImportOptions,
) -> Result<ImportedTree, ImportError> {
    let mut tree = ComponentTree::new();
    import_recursive(root, None, &mut tree, options)?;

    let root = tree
        .roots()
        .first()
        .cloned()
        .ok_or(ImportError::NoComponents)?;
    if tree.roots().len() > 1 {
        tracing::warn!(
            roots = tree.roots().len(),
            root = %root,
            "multiple root components found, using the first"
        );
    }
    tracing::debug!(root = %root, components = tree.len(), "imported component tree");
    Ok(ImportedTree { root, tree })
}

/// Parse notation text and import its components
pub fn import_text(text: &str, options: &ImportOptions) -> Result<ImportedTree, ImportError> {
    let document = document::parse(text)?;
    import_components(&document, options)
}

fn import_recursive<N: DocumentNode>(
    node: &N,
    parent: Option<&str>,
    tree: &mut ComponentTree,
    options: &ImportOptions,
) -> Result<(), ImportError> {
    // The definition body only declares the attribute set
    if is_part_definition_named(node, &options.component_definition) {
        return Ok(());
    }

    let imported = match component_from_node(node, parent, options)? {
        Some(component) => {
            let name = component.name.clone();
            tree.insert(component, parent)?;
            Some(name)
        }
        None => None,
    };

    let parent = imported.as_deref().or(parent);
    for child in node.owned_elements() {
        import_recursive(child, parent, tree, options)?;
    }
    Ok(())
}

fn component_from_node<N: DocumentNode>(
    node: &N,
    parent: Option<&str>,
    options: &ImportOptions,
) -> Result<Option<Component>, ImportError> {
    let Some(part) = node.as_part() else {
        return Ok(None);
    };
    let type_id = document::type_id(node)?;
    if type_id.is_none() && !part.is_defined_by(&options.component_definition) {
        return Ok(None);
    }

    let name = node.name().ok_or_else(|| ImportError::UnnamedComponent {
        parent: parent.map(str::to_string),
    })?;
    let pose = read_local_pose(node)?;
    let mut component = Component::new(name, type_id.unwrap_or(options.default_type_id))
        .with_pose(pose.translation, pose.rotation);
    component.source = document::attribute_text(node, SOURCE_URL_ATTRIBUTE)?;
    Ok(Some(component))
}
