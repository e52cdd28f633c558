//! Component type for the component tree

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::transform::Pose;

/// A named component with a local (parent-relative) pose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    /// Integer classification tag
    pub type_id: i64,
    /// Translation relative to the parent frame
    pub translation: DVec3,
    /// Euler angles relative to the parent frame
    pub rotation: DVec3,
    /// External source reference (e.g. a CAD element URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Component {
    /// Create a component at the parent origin
    pub fn new(name: impl Into<String>, type_id: i64) -> Self {
        Self {
            name: name.into(),
            type_id,
            translation: DVec3::ZERO,
            rotation: DVec3::ZERO,
            source: None,
        }
    }

    pub fn with_pose(mut self, translation: DVec3, rotation: DVec3) -> Self {
        self.translation = translation;
        self.rotation = rotation;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Local pose as a single value
    pub fn local_pose(&self) -> Pose {
        Pose::new(self.translation, self.rotation)
    }
}
