//! Onshape API key loading
//!
//! Keys come from `ACCESS_KEY` / `SECRET_KEY`. Missing keys are filled from
//! `.env` files: `ONSHAPE_DOTENV` first, then the working directory and each of
//! its parents. Values already found are never overwritten.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use base64::prelude::*;

pub const ACCESS_KEY_VAR: &str = "ACCESS_KEY";
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const DOTENV_OVERRIDE_VAR: &str = "ONSHAPE_DOTENV";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Load keys from the process environment and `.env` files
    pub fn from_env() -> Result<Self, CredentialsError> {
        let mut candidates = Vec::new();
        if let Some(path) = std::env::var_os(DOTENV_OVERRIDE_VAR) {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(cwd) = std::env::current_dir() {
            candidates.extend(cwd.ancestors().map(|dir| dir.join(".env")));
        }
        Self::from_sources(|key| std::env::var(key).ok(), candidates)
    }

    /// Resolve keys from `lookup`, then from the candidate `.env` files in order
    pub fn from_sources(
        lookup: impl Fn(&str) -> Option<String>,
        candidates: impl IntoIterator<Item = PathBuf>,
    ) -> Result<Self, CredentialsError> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        let mut access_key = non_empty(lookup(ACCESS_KEY_VAR));
        let mut secret_key = non_empty(lookup(SECRET_KEY_VAR));

        let mut seen = HashSet::new();
        for candidate in candidates {
            if access_key.is_some() && secret_key.is_some() {
                break;
            }
            let Ok(resolved) = candidate.canonicalize() else {
                continue;
            };
            if !seen.insert(resolved.clone()) {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&resolved) else {
                continue;
            };
            tracing::debug!(path = %resolved.display(), "reading credentials file");
            for (key, value) in parse_env_file(&content) {
                match key {
                    ACCESS_KEY_VAR if access_key.is_none() => access_key = non_empty(Some(value)),
                    SECRET_KEY_VAR if secret_key.is_none() => secret_key = non_empty(Some(value)),
                    _ => {}
                }
            }
        }

        match (access_key, secret_key) {
            (Some(access_key), Some(secret_key)) => Ok(Self::new(access_key, secret_key)),
            _ => Err(CredentialsError::Missing),
        }
    }

    /// Value of the `Authorization` header (HTTP Basic)
    pub fn authorization_header(&self) -> String {
        let token = BASE64_STANDARD.encode(format!("{}:{}", self.access_key, self.secret_key));
        format!("Basic {token}")
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }
}

/// `KEY=value` lines; blank lines and `#` comments are skipped, quotes trimmed
fn parse_env_file(content: &str) -> impl Iterator<Item = (&str, String)> {
    content.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        Some((key.trim(), value.to_string()))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsError {
    #[error("Missing Onshape credentials. Configure ACCESS_KEY and SECRET_KEY via environment or .env")]
    Missing,
}
