//! Onshape document references

use std::fmt;
use std::str::FromStr;

use regex::Regex;

const DOCUMENT_PATTERN: &str = r"/documents/([^/]+)/([wvm])/([^/]+)/e/([^/?#]+)";

const BASE_URL: &str = "https://cad.onshape.com";

/// Which kind of document state an identifier addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceKind {
    Workspace,
    Version,
    Microversion,
}

impl WorkspaceKind {
    /// Single-letter path segment (`w`, `v` or `m`)
    pub fn segment(self) -> &'static str {
        match self {
            WorkspaceKind::Workspace => "w",
            WorkspaceKind::Version => "v",
            WorkspaceKind::Microversion => "m",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "w" => Some(WorkspaceKind::Workspace),
            "v" => Some(WorkspaceKind::Version),
            "m" => Some(WorkspaceKind::Microversion),
            _ => None,
        }
    }
}

/// Document / workspace-or-version / element triple addressing an element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub document_id: String,
    pub kind: WorkspaceKind,
    pub workspace_id: String,
    pub element_id: String,
}

impl DocumentRef {
    /// Parse any URL containing `/documents/{d}/{w|v|m}/{id}/e/{e}`
    pub fn parse(url: &str) -> Result<Self, ReferenceError> {
        let pattern = Regex::new(DOCUMENT_PATTERN)?;
        let captures = pattern
            .captures(url)
            .ok_or_else(|| ReferenceError::Malformed(url.to_string()))?;

        let group = |i: usize| captures.get(i).map(|m| m.as_str()).unwrap_or_default();
        let kind = WorkspaceKind::from_segment(group(2))
            .ok_or_else(|| ReferenceError::Malformed(url.to_string()))?;

        Ok(Self {
            document_id: group(1).to_string(),
            kind,
            workspace_id: group(3).to_string(),
            element_id: group(4).to_string(),
        })
    }

    /// `d/{did}/{wvm}/{wvmid}/e/{eid}`, the path shared by the element endpoints
    pub fn api_path(&self) -> String {
        format!(
            "d/{}/{}/{}/e/{}",
            self.document_id,
            self.kind.segment(),
            self.workspace_id,
            self.element_id
        )
    }
}

impl FromStr for DocumentRef {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{BASE_URL}/documents/{}/{}/{}/e/{}",
            self.document_id,
            self.kind.segment(),
            self.workspace_id,
            self.element_id
        )
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReferenceError {
    #[error("Not an Onshape element URL: {0}")]
    Malformed(String),
    #[error("Invalid reference pattern: {0}")]
    Pattern(#[from] regex::Error),
}
