//! Remote assembly service abstraction

use glam::DMat4;

use crate::reference::DocumentRef;

/// Instance created by an insert call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedInstance {
    pub id: String,
    pub name: String,
}

/// Assembly operations used by the exporter
///
/// Calls are synchronous; failures are returned, never retried.
pub trait AssemblyService {
    /// Insert the element at `source` into the assembly at `target`
    fn insert_instance(
        &mut self,
        target: &DocumentRef,
        source: &DocumentRef,
    ) -> Result<InsertedInstance, ServiceError>;

    /// Apply `transform` to the occurrence named `name`
    ///
    /// With `relative` the transform is composed with the current placement,
    /// otherwise it replaces it.
    fn transform_occurrence(
        &mut self,
        target: &DocumentRef,
        name: &str,
        transform: &DMat4,
        relative: bool,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("Service returned status {0}")]
    Status(u16),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("No part or assembly named '{0}' in the target assembly")]
    InstanceNotFound(String),
    #[error("Target assembly has no instances after insert")]
    NoInstances,
}
