//! Assembly definition payloads

use glam::{DMat4, DVec3};
use serde::Deserialize;

use geolink_core::{EulerOrder, euler_from_matrix, translation_of};

use crate::reference::{DocumentRef, WorkspaceKind};
use crate::service::InsertedInstance;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssemblyDefinition {
    pub root_assembly: RootAssembly,
    #[serde(default)]
    pub sub_assemblies: Vec<SubAssembly>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RootAssembly {
    #[serde(default)]
    pub instances: Vec<Instance>,
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubAssembly {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Instance {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Occurrence {
    pub path: Vec<String>,
    /// Row-major 4x4
    pub transform: Vec<f64>,
    #[serde(default)]
    pub child_occurrences: Vec<Occurrence>,
}

/// Element info returned when a tab is created
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedElement {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl CreatedElement {
    /// Reference to the new element in the workspace it was created in
    pub fn reference(self, document_id: &str, workspace_id: &str) -> DocumentRef {
        DocumentRef {
            document_id: document_id.to_string(),
            kind: WorkspaceKind::Workspace,
            workspace_id: workspace_id.to_string(),
            element_id: self.id,
        }
    }
}

/// World pose of one occurrence in a target assembly
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct OccurrencePose {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub path: Vec<String>,
    pub translation: DVec3,
    /// Radians
    pub rotation: DVec3,
}

/// Row-major 16 values to a matrix; `None` unless exactly 16 values
pub(crate) fn matrix_from_row_major(values: &[f64]) -> Option<DMat4> {
    let values: &[f64; 16] = values.try_into().ok()?;
    Some(DMat4::from_cols_array(values).transpose())
}

pub(crate) fn row_major(matrix: &DMat4) -> [f64; 16] {
    matrix.transpose().to_cols_array()
}

impl AssemblyDefinition {
    fn all_instances(&self) -> impl Iterator<Item = &Instance> {
        self.root_assembly
            .instances
            .iter()
            .chain(self.sub_assemblies.iter().flat_map(|sub| &sub.instances))
    }

    /// The most recently inserted top-level instance
    pub fn last_root_instance(&self) -> Option<InsertedInstance> {
        self.root_assembly
            .instances
            .last()
            .map(|instance| InsertedInstance {
                id: instance.id.clone(),
                name: instance.name.clone(),
            })
    }

    /// Occurrence path of the part, or else the assembly, named `name`
    pub fn occurrence_path(&self, name: &str) -> Option<Vec<String>> {
        ["Part", "Assembly"].into_iter().find_map(|kind| {
            self.root_assembly
                .occurrences
                .iter()
                .find(|occurrence| {
                    occurrence
                        .path
                        .last()
                        .and_then(|id| self.instance(id))
                        .is_some_and(|instance| instance.kind == kind && instance.name == name)
                })
                .map(|occurrence| occurrence.path.clone())
        })
    }

    fn instance(&self, id: &str) -> Option<&Instance> {
        self.all_instances().find(|instance| instance.id == id)
    }

    /// World poses of every occurrence, composing nested child occurrences
    pub fn occurrence_poses(&self, order: EulerOrder) -> Vec<OccurrencePose> {
        let mut poses = Vec::new();
        self.collect_poses(&self.root_assembly.occurrences, DMat4::IDENTITY, order, &mut poses);
        poses
    }

    fn collect_poses(
        &self,
        occurrences: &[Occurrence],
        parent: DMat4,
        order: EulerOrder,
        poses: &mut Vec<OccurrencePose>,
    ) {
        for occurrence in occurrences {
            let Some(local) = matrix_from_row_major(&occurrence.transform) else {
                tracing::warn!(path = ?occurrence.path, "skipping occurrence with malformed transform");
                continue;
            };
            let world = parent * local;
            if let Some(instance) = occurrence.path.last().and_then(|id| self.instance(id)) {
                poses.push(OccurrencePose {
                    id: instance.id.clone(),
                    name: instance.name.clone(),
                    kind: instance.kind.clone(),
                    path: occurrence.path.clone(),
                    translation: translation_of(&world),
                    rotation: euler_from_matrix(&world, order),
                });
            }
            self.collect_poses(&occurrence.child_occurrences, world, order, poses);
        }
    }
}
