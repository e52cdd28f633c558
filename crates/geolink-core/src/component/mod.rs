//! Component tree (registry of named components)

mod queries;
mod transforms;
mod types;

use std::collections::HashMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

pub use types::Component;

/// Serialized form: components in creation order with their parent names
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeData {
    components: Vec<ComponentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ComponentEntry {
    component: Component,
    parent: Option<String>,
}

/// Explicitly owned component registry
///
/// Parents own their children; a component's position in its parent's children
/// list is its creation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "TreeData", try_from = "TreeData")]
pub struct ComponentTree {
    /// All components keyed by name
    components: HashMap<String, Component>,
    /// Children mapping: parent -> [child] in creation order
    children: HashMap<String, Vec<String>>,
    /// Parent mapping: child -> parent
    parent: HashMap<String, String>,
    /// Components without a parent, in creation order
    roots: Vec<String>,
    /// Every component name in creation order
    order: Vec<String>,
}

impl From<ComponentTree> for TreeData {
    fn from(mut tree: ComponentTree) -> Self {
        let components = tree
            .order
            .iter()
            .filter_map(|name| {
                let component = tree.components.remove(name)?;
                Some(ComponentEntry {
                    component,
                    parent: tree.parent.get(name).cloned(),
                })
            })
            .collect();
        Self { components }
    }
}

impl TryFrom<TreeData> for ComponentTree {
    type Error = ComponentError;

    fn try_from(data: TreeData) -> Result<Self, Self::Error> {
        let mut tree = Self::new();
        for entry in data.components {
            tree.insert(entry.component, entry.parent.as_deref())?;
        }
        Ok(tree)
    }
}

impl ComponentTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a component and attach it to `parent` (or register it as a root)
    pub fn create(
        &mut self,
        name: impl Into<String>,
        type_id: i64,
        translation: DVec3,
        rotation: DVec3,
        parent: Option<&str>,
    ) -> Result<&Component, ComponentError> {
        let component = Component::new(name, type_id).with_pose(translation, rotation);
        self.insert(component, parent)
    }

    /// Insert a pre-built component. The tree is unchanged on error.
    pub fn insert(
        &mut self,
        component: Component,
        parent: Option<&str>,
    ) -> Result<&Component, ComponentError> {
        if self.components.contains_key(&component.name) {
            return Err(ComponentError::DuplicateName(component.name));
        }
        if let Some(parent_name) = parent
            && !self.components.contains_key(parent_name)
        {
            return Err(ComponentError::ParentNotFound(parent_name.to_string()));
        }

        let name = component.name.clone();
        match parent {
            Some(parent_name) => {
                self.children
                    .entry(parent_name.to_string())
                    .or_default()
                    .push(name.clone());
                self.parent.insert(name.clone(), parent_name.to_string());
            }
            None => self.roots.push(name.clone()),
        }
        self.order.push(name.clone());
        tracing::trace!(component = %name, parent = ?parent, "created component");

        Ok(self.components.entry(name).or_insert(component))
    }

    /// Remove every component. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.components.clear();
        self.children.clear();
        self.parent.clear();
        self.roots.clear();
        self.order.clear();
    }
}

/// Component tree errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    #[error("Component with name '{0}' already exists")]
    DuplicateName(String),
    #[error("Parent component '{0}' not found")]
    ParentNotFound(String),
    #[error("Component '{0}' not found")]
    NotFound(String),
}
