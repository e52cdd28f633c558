//! Batch export of pose records into an Onshape assembly

use geolink_core::{PoseOptions, PoseRecord};

use crate::reference::{DocumentRef, ReferenceError};
use crate::service::{AssemblyService, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Units and axis order the records were computed with
    pub pose: PoseOptions,
    /// Apply transforms relative to the inserted placement
    pub relative: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            pose: PoseOptions::default(),
            relative: true,
        }
    }
}

/// One record that was inserted and placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedComponent {
    pub name: String,
    pub source_url: String,
    pub inserted_name: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("Component '{component}' has an invalid source URL: {source}")]
    InvalidSource {
        component: String,
        source: ReferenceError,
    },
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Insert and place every record below the root
///
/// The root record (no parent) is the target assembly itself and is skipped, as
/// are records without a source URL. The first service failure aborts the batch.
pub fn export_records<S: AssemblyService + ?Sized>(
    service: &mut S,
    target: &DocumentRef,
    records: &[PoseRecord],
    options: &ExportOptions,
) -> Result<Vec<ExportedComponent>, ExportError> {
    let mut exported = Vec::new();

    for record in records.iter().filter(|r| r.parent_name.is_some()) {
        let Some(source_url) = record.source_url.as_deref() else {
            tracing::warn!(component = %record.name, "no source URL configured, skipping");
            continue;
        };
        let source = DocumentRef::parse(source_url).map_err(|source| ExportError::InvalidSource {
            component: record.name.clone(),
            source,
        })?;

        let placement = service.insert_instance(target, &source)?;
        let transform = record.absolute_transform(&options.pose);
        service.transform_occurrence(target, &placement.name, &transform, options.relative)?;

        tracing::info!(
            component = %record.name,
            inserted = %placement.name,
            "exported component"
        );
        exported.push(ExportedComponent {
            name: record.name.clone(),
            source_url: source_url.to_string(),
            inserted_name: placement.name,
        });
    }

    Ok(exported)
}
