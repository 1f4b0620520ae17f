//! Role knowledge base
//!
//! A JSON object mapping a role (or persona name) to the keywords that role
//! bids on and a short description of its focus:
//!
//! ```json
//! { "CTO": { "keywords": ["deploy", "rollback"], "focus": "Technical strategy" } }
//! ```

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::{Config, PathsConfig};

const BUILTIN_KNOWLEDGE_BASE: &str = include_str!("../../data/knowledge_base.json");

/// What one role knows about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleKnowledge {
    pub keywords: Vec<String>,
    pub focus: String,
}

/// Knowledge for every role, loaded once at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    roles: HashMap<String, RoleKnowledge>,
}

impl KnowledgeBase {
    /// The knowledge base compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_KNOWLEDGE_BASE).context("Failed to parse built-in knowledge base")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let kb: Self = serde_json::from_str(content).context("Invalid knowledge base JSON")?;
        Ok(kb)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge base: {}", path.display()))?;
        let kb = Self::from_json(&content)
            .with_context(|| format!("Failed to parse knowledge base: {}", path.display()))?;
        log::info!("Loaded knowledge base from: {} ({} roles)", path.display(), kb.roles.len());
        Ok(kb)
    }

    /// Use the configured file if there is one, otherwise the built-in data
    pub fn resolve(paths: &PathsConfig) -> Result<Self> {
        match paths.knowledge_base {
            Some(ref path) => Self::load(&Config::expand_path(path)),
            None => {
                log::info!("Using built-in knowledge base");
                Self::builtin()
            }
        }
    }

    /// Knowledge for a persona, looked up by role first and then by name.
    /// Unknown personas get an empty record.
    pub fn for_persona(&self, role: &str, name: &str) -> RoleKnowledge {
        self.roles
            .get(role)
            .or_else(|| self.roles.get(name))
            .cloned()
            .unwrap_or_else(|| {
                log::warn!("No knowledge base entry for {} ({})", name, role);
                RoleKnowledge::default()
            })
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
