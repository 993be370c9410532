//! Core data types for sites, site languages, and demand errors.

use serde::{Deserialize, Serialize};

/// A configured content-delivery root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub identifier: String,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub root_page_id: u64,
    #[serde(default)]
    pub languages: Vec<SiteLanguage>,
}

/// One language variant of a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteLanguage {
    pub language_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub base: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Site {
    /// Create a site with no languages.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            base: String::new(),
            root_page_id: 0,
            languages: Vec::new(),
        }
    }

    /// Builder: append a language.
    pub fn with_language(mut self, language: SiteLanguage) -> Self {
        self.languages.push(language);
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Enabled languages in configured order.
    pub fn languages(&self) -> Vec<&SiteLanguage> {
        self.languages.iter().filter(|l| l.enabled).collect()
    }

    /// Every configured language, enabled or not.
    pub fn all_languages(&self) -> &[SiteLanguage] {
        &self.languages
    }

    /// Get an enabled language by ID.
    pub fn language_by_id(&self, language_id: i64) -> Option<&SiteLanguage> {
        self.languages
            .iter()
            .find(|l| l.enabled && l.language_id == language_id)
    }
}

impl SiteLanguage {
    /// Create an enabled language with only an ID set.
    pub fn new(language_id: i64) -> Self {
        Self {
            language_id,
            title: String::new(),
            locale: String::new(),
            base: String::new(),
            enabled: true,
        }
    }

    pub fn language_id(&self) -> i64 {
        self.language_id
    }
}

/// Errors that can occur while resolving a demand.
#[derive(thiserror::Error, Debug)]
pub enum DemandError {
    #[error("Site not found: {0}")]
    SiteNotFound(String),

    #[error("No site language resolved for this demand")]
    NoLanguageResolved,

    #[error("Demand is not initialized: no site was resolved")]
    NotInitialized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type DemandResult<T> = Result<T, DemandError>;
