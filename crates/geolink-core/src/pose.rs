//! World-pose accumulation over document trees
//!
//! Walks a document tree depth-first, composing every node's local transform with
//! its parent's absolute transform. Nodes carrying a numeric `typeID` attribute emit
//! a [`PoseRecord`]; all other nodes are still frames of reference for their
//! descendants.

use glam::DMat4;
use serde::{Deserialize, Serialize};

use crate::constants::{POSE_ATTRIBUTES, SOURCE_URL_ATTRIBUTE};
use crate::document::{self, DocumentNode, EvaluationError};
use crate::transform::{AngleUnit, EulerOrder, Pose, compose};

/// Options for pose accumulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseOptions {
    /// Unit of rotation attributes on input and of absolute rotations on output
    pub angle_unit: AngleUnit,
    /// Euler convention used both to build and to decompose transforms
    pub order: EulerOrder,
}

impl PoseOptions {
    pub fn new(angle_unit: AngleUnit, order: EulerOrder) -> Self {
        Self { angle_unit, order }
    }
}

/// Absolute pose of one emitting node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    pub name: String,
    pub type_id: i64,
    /// Pose relative to the enclosing frame, as read
    pub local: Pose,
    /// Pose relative to the traversal root
    pub absolute: Pose,
    /// Nearest ancestor that emitted a record
    pub parent_name: Option<String>,
    pub parent_type_id: Option<i64>,
    /// External source reference, if the node declares one
    pub source_url: Option<String>,
}

impl PoseRecord {
    /// Rebuild the absolute transform from the recorded absolute pose
    pub fn absolute_transform(&self, options: &PoseOptions) -> DMat4 {
        self.absolute.to_mat4(options.order, options.angle_unit)
    }
}

/// Traversal state handed to each child by value
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame<'a> {
    pub transform: DMat4,
    /// Nearest emitting ancestor (name, type id)
    pub ancestor: Option<(&'a str, i64)>,
}

impl<'a> Frame<'a> {
    pub(crate) const ROOT: Self = Self {
        transform: DMat4::IDENTITY,
        ancestor: None,
    };

    /// Absolute transform of a node whose local pose is `local`
    pub(crate) fn absolute(&self, local: &Pose, options: &PoseOptions) -> DMat4 {
        compose(
            &self.transform,
            &local.to_mat4(options.order, options.angle_unit),
        )
    }

    pub(crate) fn record(
        &self,
        name: &str,
        type_id: i64,
        local: Pose,
        absolute: &DMat4,
        source_url: Option<String>,
        options: &PoseOptions,
    ) -> PoseRecord {
        PoseRecord {
            name: name.to_string(),
            type_id,
            local,
            absolute: Pose::from_mat4(absolute, options.order, options.angle_unit),
            parent_name: self.ancestor.map(|(name, _)| name.to_string()),
            parent_type_id: self.ancestor.map(|(_, type_id)| type_id),
            source_url,
        }
    }
}

/// Compute absolute poses for every node with a numeric `typeID` below `root`
///
/// Records come out in depth-first document order. Attribute evaluation failures
/// abort the traversal.
pub fn accumulate_poses<N: DocumentNode>(
    root: &N,
    options: &PoseOptions,
) -> Result<Vec<PoseRecord>, EvaluationError> {
    let mut records = Vec::new();
    visit(root, Frame::ROOT, options, &mut records)?;
    Ok(records)
}

fn visit<'a, N: DocumentNode>(
    node: &'a N,
    frame: Frame<'a>,
    options: &PoseOptions,
    records: &mut Vec<PoseRecord>,
) -> Result<(), EvaluationError> {
    let local = read_local_pose(node)?;
    let absolute = frame.absolute(&local, options);

    let mut child_frame = Frame {
        transform: absolute,
        ancestor: frame.ancestor,
    };

    if let Some(type_id) = document::type_id(node)? {
        let name = node.name().unwrap_or_default();
        let source_url = document::attribute_text(node, SOURCE_URL_ATTRIBUTE)?;
        let record = frame.record(name, type_id, local, &absolute, source_url, options);
        tracing::debug!(
            component = %record.name,
            parent = ?record.parent_name,
            "emitted pose record"
        );
        records.push(record);
        child_frame.ancestor = Some((name, type_id));
    } else {
        tracing::trace!(node = ?node.name(), "frame without type tag");
    }

    for child in node.owned_elements() {
        visit(child, child_frame, options, records)?;
    }
    Ok(())
}

/// Read `tx..rz`, missing attributes default to zero
pub(crate) fn read_local_pose<N: DocumentNode>(node: &N) -> Result<Pose, EvaluationError> {
    let mut values = [0.0; 6];
    for (value, name) in values.iter_mut().zip(POSE_ATTRIBUTES) {
        *value = document::attribute_number(node, name)?.unwrap_or(0.0);
    }
    let [tx, ty, tz, rx, ry, rz] = values;
    Ok(Pose::new(
        glam::DVec3::new(tx, ty, tz),
        glam::DVec3::new(rx, ry, rz),
    ))
}
