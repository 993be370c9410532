//! Site lookup and the in-memory site registry.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{DemandError, DemandResult, Site};

/// Resolves a configured site by its string identifier.
pub trait SiteLookup: Send + Sync {
    /// Fails with [`DemandError::SiteNotFound`] for unknown identifiers.
    fn site_by_identifier(&self, identifier: &str) -> DemandResult<Arc<Site>>;
}

/// On-disk site configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfiguration {
    #[serde(default)]
    pub sites: Vec<Site>,
}

/// All configured sites, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: Vec<Arc<Site>>,
}

impl SiteRegistry {
    /// Build a registry, rejecting duplicate identifiers and language IDs.
    pub fn new(sites: Vec<Site>) -> DemandResult<Self> {
        let mut identifiers = HashSet::new();
        for site in &sites {
            if site.identifier.trim().is_empty() {
                return Err(DemandError::Config(
                    "Site identifier must not be empty".to_string(),
                ));
            }
            if !identifiers.insert(site.identifier.as_str()) {
                return Err(DemandError::Config(format!(
                    "Duplicate site identifier: {}",
                    site.identifier
                )));
            }

            let mut language_ids = HashSet::new();
            for language in &site.languages {
                if !language_ids.insert(language.language_id) {
                    return Err(DemandError::Config(format!(
                        "Duplicate language id {} in site {}",
                        language.language_id, site.identifier
                    )));
                }
            }
        }

        Ok(Self {
            sites: sites.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse a registry from a JSON site configuration.
    pub fn from_json_str(json: &str) -> DemandResult<Self> {
        let config: SiteConfiguration = serde_json::from_str(json)?;
        Self::new(config.sites)
    }

    /// Load a registry from a JSON site configuration file.
    pub fn from_file(path: &Path) -> DemandResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let registry = Self::from_json_str(&json)?;
        tracing::debug!(
            "Loaded {} site(s) from {}",
            registry.count(),
            path.display()
        );
        Ok(registry)
    }

    /// Get a site by identifier.
    pub fn get(&self, identifier: &str) -> Option<&Arc<Site>> {
        self.sites.iter().find(|s| s.identifier == identifier)
    }

    pub fn sites(&self) -> &[Arc<Site>] {
        &self.sites
    }

    /// Return the number of configured sites.
    pub fn count(&self) -> usize {
        self.sites.len()
    }
}

impl SiteLookup for SiteRegistry {
    fn site_by_identifier(&self, identifier: &str) -> DemandResult<Arc<Site>> {
        self.get(identifier)
            .cloned()
            .ok_or_else(|| DemandError::SiteNotFound(identifier.to_string()))
    }
}
