//! Message template catalog.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::HeraldError;

/// A named message body with `{placeholder}` tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: u32,
    pub name: String,
    #[serde(alias = "message")]
    pub body: String,
}

/// Templates loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// Load templates from a JSON array file.
    ///
    /// A missing file yields an empty catalog.
    pub fn load(path: &str) -> Result<Self, HeraldError> {
        let path = Path::new(path);
        if !path.exists() {
            warn!("templates file not found at {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let templates: Vec<Template> = serde_json::from_str(&content).map_err(|e| {
            HeraldError::Store(format!("failed to parse {}: {e}", path.display()))
        })?;
        info!("loaded {} templates from {}", templates.len(), path.display());
        Ok(Self { templates })
    }

    pub fn get(&self, id: u32) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
