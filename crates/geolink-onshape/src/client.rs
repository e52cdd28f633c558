//! Blocking REST client for the Onshape assembly API

use glam::DMat4;
use serde::de::DeserializeOwned;
use serde_json::json;

use geolink_core::EulerOrder;

use crate::credentials::Credentials;
use crate::definition::{AssemblyDefinition, CreatedElement, OccurrencePose, row_major};
use crate::reference::{DocumentRef, WorkspaceKind};
use crate::service::{AssemblyService, InsertedInstance, ServiceError};

pub const DEFAULT_BASE_URL: &str = "https://cad.onshape.com/api/v11";

const ACCEPT: &str = "application/json;charset=UTF-8; qs=0.09";

/// Onshape client authenticated with API keys (HTTP Basic)
#[derive(Debug, Clone)]
pub struct OnshapeClient {
    base_url: String,
    credentials: Credentials,
}

impl OnshapeClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
        }
    }

    /// Client using credentials from the environment or `.env` files
    pub fn from_env() -> Result<Self, crate::credentials::CredentialsError> {
        Credentials::from_env().map(Self::new)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn assembly_url(&self, target: &DocumentRef) -> String {
        format!("{}/assemblies/{}", self.base_url, target.api_path())
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ServiceError> {
        tracing::debug!(url, "GET");
        let response = ureq::get(url)
            .header("Authorization", self.credentials.authorization_header())
            .header("Accept", ACCEPT)
            .query("includeMateFeatures", "true")
            .query("includeMateConnectors", "true")
            .query("includeNonSolids", "true")
            .call()
            .map_err(request_error)?;
        response
            .into_body()
            .read_json()
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<ureq::http::Response<ureq::Body>, ServiceError> {
        tracing::debug!(url, "POST");
        ureq::post(url)
            .header("Authorization", self.credentials.authorization_header())
            .header("Accept", ACCEPT)
            .send_json(body)
            .map_err(request_error)
    }

    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<(), ServiceError> {
        self.post(url, body)?;
        Ok(())
    }

    fn assembly_definition(&self, target: &DocumentRef) -> Result<AssemblyDefinition, ServiceError> {
        self.get_json(&self.assembly_url(target))
    }

    /// Create an empty assembly tab named `name` in a document workspace
    pub fn create_assembly(
        &self,
        document_id: &str,
        workspace_id: &str,
        name: &str,
    ) -> Result<DocumentRef, ServiceError> {
        let url = format!("{}/assemblies/d/{document_id}/w/{workspace_id}", self.base_url);
        let created: CreatedElement = self
            .post(&url, &json!({ "name": name }))?
            .into_body()
            .read_json()
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        tracing::info!(name = %created.name, element = %created.id, "created assembly");
        Ok(created.reference(document_id, workspace_id))
    }

    /// World poses of every occurrence in the target assembly
    pub fn list_occurrences(
        &self,
        target: &DocumentRef,
        order: EulerOrder,
    ) -> Result<Vec<OccurrencePose>, ServiceError> {
        Ok(self.assembly_definition(target)?.occurrence_poses(order))
    }
}

impl AssemblyService for OnshapeClient {
    fn insert_instance(
        &mut self,
        target: &DocumentRef,
        source: &DocumentRef,
    ) -> Result<InsertedInstance, ServiceError> {
        let mut body = json!({
            "documentId": source.document_id,
            "elementId": source.element_id,
            "isAssembly": true,
        });
        match source.kind {
            WorkspaceKind::Version => body["versionId"] = json!(source.workspace_id),
            WorkspaceKind::Microversion => body["microversionId"] = json!(source.workspace_id),
            WorkspaceKind::Workspace => {}
        }
        self.post_json(&format!("{}/instances", self.assembly_url(target)), &body)?;

        // The insert response does not identify the new instance
        let inserted = self
            .assembly_definition(target)?
            .last_root_instance()
            .ok_or(ServiceError::NoInstances)?;
        tracing::debug!(name = %inserted.name, source = %source, "inserted instance");
        Ok(inserted)
    }

    fn transform_occurrence(
        &mut self,
        target: &DocumentRef,
        name: &str,
        transform: &DMat4,
        relative: bool,
    ) -> Result<(), ServiceError> {
        let path = self
            .assembly_definition(target)?
            .occurrence_path(name)
            .ok_or_else(|| ServiceError::InstanceNotFound(name.to_string()))?;

        let body = json!({
            "isRelative": relative,
            "occurrences": [{ "path": path }],
            "transform": row_major(transform),
        });
        self.post_json(
            &format!("{}/occurrencetransforms", self.assembly_url(target)),
            &body,
        )
    }
}

fn request_error(error: ureq::Error) -> ServiceError {
    match error {
        ureq::Error::StatusCode(code) => ServiceError::Status(code),
        other => ServiceError::Http(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = OnshapeClient::new(Credentials::new("a", "s"))
            .with_base_url("http://localhost:8080/api/v11/");
        let target = DocumentRef::parse("https://cad.onshape.com/documents/d/w/w1/e/e1").unwrap();
        assert_eq!(
            client.assembly_url(&target),
            "http://localhost:8080/api/v11/assemblies/d/d/w/w1/e/e1"
        );
    }

    #[test]
    fn test_create_assembly_unreachable_host() {
        let client = OnshapeClient::new(Credentials::new("a", "s"))
            .with_base_url("http://127.0.0.1:9/api/v11");
        let result = client.create_assembly("d", "w", "Generated");
        assert!(matches!(result, Err(ServiceError::Http(_))));
    }

    #[test]
    fn test_unreachable_host_is_http_error() {
        let mut client = OnshapeClient::new(Credentials::new("a", "s"))
            .with_base_url("http://127.0.0.1:9/api/v11");
        let target = DocumentRef::parse("https://cad.onshape.com/documents/d/w/w1/e/e1").unwrap();
        let result = client.transform_occurrence(&target, "x", &DMat4::IDENTITY, true);
        assert!(matches!(result, Err(ServiceError::Http(_))));
    }
}
