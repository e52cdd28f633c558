//! Onshape assembly service for geolink
//!
//! - Reference: document/workspace/element identifiers parsed from URLs
//! - Credentials: API keys from the environment or `.env` files
//! - Service: the assembly operations the exporter needs
//! - Client: blocking REST client for the Onshape API
//! - Export: batch insertion of pose records into a target assembly
//! - Notation: an assembly's occurrence tree written back as notation text

pub mod client;
pub mod credentials;
mod definition;
pub mod export;
pub mod notation;
pub mod reference;
pub mod service;

pub use client::OnshapeClient;
pub use credentials::{Credentials, CredentialsError};
pub use definition::OccurrencePose;
pub use export::{ExportError, ExportOptions, ExportedComponent, export_records};
pub use notation::occurrence_notation;
pub use reference::{DocumentRef, ReferenceError, WorkspaceKind};
pub use service::{AssemblyService, InsertedInstance, ServiceError};
