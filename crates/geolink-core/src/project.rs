//! Project file serialization

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::component::ComponentTree;
use crate::export::{ExportError, ExportOptions, export_text};

/// Newest project file format this build reads and writes
pub const PROJECT_VERSION: u32 = 1;

/// Project file holding a component tree and its package name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// File format version
    pub version: u32,
    /// Package name used for textual export
    pub name: String,
    pub tree: ComponentTree,
}

impl Default for Project {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_PACKAGE_NAME)
    }
}

impl Project {
    /// Create a new empty project
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_tree(name, ComponentTree::new())
    }

    pub fn with_tree(name: impl Into<String>, tree: ComponentTree) -> Self {
        Self {
            version: PROJECT_VERSION,
            name: name.into(),
            tree,
        }
    }

    /// Write the project as pretty RON, replacing any existing file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()?)
            .map_err(|e| ProjectError::Io(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), components = self.tree.len(), "saved project");
        Ok(())
    }

    /// Pretty RON text of the project, as written by [`Project::save`]
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProjectError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map(String::into_bytes)
            .map_err(|e| ProjectError::Serialize(e.to_string()))
    }

    /// Read a project file; the component tree is validated while decoding
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let data =
            std::fs::read(path).map_err(|e| ProjectError::Io(format!("{}: {e}", path.display())))?;
        let project = Self::load_from_bytes(&data)?;
        tracing::debug!(path = %path.display(), name = %project.name, "loaded project");
        Ok(project)
    }

    /// Decode project RON held in memory
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, ProjectError> {
        let text =
            std::str::from_utf8(data).map_err(|e| ProjectError::Deserialize(e.to_string()))?;
        let project: Project =
            ron::from_str(text).map_err(|e| ProjectError::Deserialize(e.to_string()))?;
        if project.version > PROJECT_VERSION {
            return Err(ProjectError::UnsupportedVersion(project.version));
        }
        Ok(project)
    }

    /// Export the subtree under `root` using the project name as package name
    pub fn to_text(&self, root: &str) -> Result<String, ExportError> {
        export_text(&self.tree, root, &ExportOptions::with_package(&self.name))
    }
}

/// Project-related errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Project file version {0} is newer than this build supports")]
    UnsupportedVersion(u32),
}
