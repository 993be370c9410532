//! Configuration loading and resolution.

use std::path::PathBuf;

use headless_demand::{DemandResult, SiteRegistry};

/// Environment variable naming the site configuration file.
pub const SITES_ENV: &str = "HEADLESS_SITES";

/// Resolve the site configuration path.
pub fn resolve_sites_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(SITES_ENV) {
        return PathBuf::from(env_path);
    }

    let cwd_sites = PathBuf::from(".headless/sites.json");
    if cwd_sites.exists() {
        return cwd_sites;
    }

    resolve_default_sites_path()
}

fn resolve_default_sites_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    PathBuf::from(format!("{home}/.headless/sites.json"))
}

/// Load the site registry from the resolved configuration path.
pub fn load_registry(explicit: Option<&str>) -> DemandResult<SiteRegistry> {
    let path = resolve_sites_path(explicit);
    tracing::info!("Sites: {}", path.display());
    SiteRegistry::from_file(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        assert_eq!(
            resolve_sites_path(Some("/etc/headless/sites.json")),
            PathBuf::from("/etc/headless/sites.json")
        );
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.json");
        std::fs::write(&path, r#"{"sites":[{"identifier":"main"}]}"#).unwrap();

        let registry = load_registry(path.to_str()).unwrap();
        assert_eq!(registry.count(), 1);
    }
}
