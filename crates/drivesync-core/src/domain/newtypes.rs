//! Domain newtypes with validation
//!
//! This module provides the strongly-typed logical path shared by both sides
//! of a reconciliation. It is validated at construction time.

use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// A logical path shared by both sides of a reconciliation (must start with /)
///
/// Local entries are mapped to the same form relative to the sync root,
/// e.g. `<root>/Documents/file.txt` becomes "/Documents/file.txt".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath(String);

impl RemotePath {
    /// Create a new RemotePath
    ///
    /// # Errors
    /// Returns error if path doesn't start with /, or contains `//` or `..`
    pub fn new(path: String) -> Result<Self, DomainError> {
        if !path.starts_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path must start with '/': {path}"
            )));
        }

        if path.len() > 1 && path.contains("//") {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains invalid double slashes: {path}"
            )));
        }

        if path.split('/').any(|segment| segment == "..") {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains invalid traversal: {path}"
            )));
        }

        // Trailing slashes are not significant
        if path.len() > 1 && path.ends_with('/') {
            return Ok(Self(path.trim_end_matches('/').to_string()));
        }

        Ok(Self(path))
    }

    /// Create the root path "/"
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Build a logical path from a path relative to the sync root
    ///
    /// # Errors
    /// Returns error if the relative path contains non-UTF-8 or parent components
    pub fn from_relative(relative: &Path) -> Result<Self, DomainError> {
        let mut result = Self::root();
        for component in relative.components() {
            match component {
                Component::Normal(c) => {
                    let segment = c.to_str().ok_or_else(|| {
                        DomainError::InvalidRemotePath(format!(
                            "Non UTF-8 path component in {}",
                            relative.display()
                        ))
                    })?;
                    result = result.join(segment)?;
                }
                Component::CurDir => {}
                _ => {
                    return Err(DomainError::InvalidRemotePath(format!(
                        "Path must be relative without traversal: {}",
                        relative.display()
                    )))
                }
            }
        }
        Ok(result)
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the root path
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Join a path component
    ///
    /// # Errors
    /// Returns error if component is invalid
    pub fn join(&self, component: &str) -> Result<Self, DomainError> {
        if component.is_empty() || component.contains('/') || component == ".." {
            return Err(DomainError::InvalidRemotePath(format!(
                "Invalid path component: {component}"
            )));
        }

        let new_path = if self.is_root() {
            format!("/{component}")
        } else {
            format!("{}/{component}", self.0)
        };

        Self::new(new_path)
    }

    /// Get the parent path
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }

        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Get the file name component
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }

        self.0.rsplit('/').next()
    }
}

impl Display for RemotePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemotePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemotePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.0
    }
}
