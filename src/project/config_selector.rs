use serde::{Deserialize, Serialize};

use crate::project::ProjectError;

/// Holds the active configuration name for an import pass
///
/// Single-value accessors on [`ProjectModel`](crate::project::ProjectModel)
/// read through a selector passed by reference, so each workspace (and each
/// test) owns its own selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSelector {
    active: String,
    available: Vec<String>,
}

impl ConfigSelector {
    /// Create a selector defaulting to the first configuration, or `""`
    pub fn new(configurations: &[String]) -> Self {
        Self {
            active: configurations.first().cloned().unwrap_or_default(),
            available: configurations.to_vec(),
        }
    }

    /// Selector pinned to a configuration, without validation
    pub fn fixed(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            available: vec![name.clone()],
            active: name,
        }
    }

    /// The active configuration name
    pub fn active(&self) -> &str {
        &self.active
    }

    /// All configuration names the selector was created with
    pub fn available(&self) -> &[String] {
        &self.available
    }

    /// Switch the active configuration
    pub fn select(&mut self, name: &str) -> Result<(), ProjectError> {
        if !self.available.iter().any(|c| c == name) {
            return Err(ProjectError::UnknownConfiguration {
                name: name.to_string(),
            });
        }
        self.active = name.to_string();
        Ok(())
    }
}
