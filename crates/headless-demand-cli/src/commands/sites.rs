//! Command: sites — summarize the configured sites.

use serde_json::{json, Value};

use headless_demand::{Site, SiteRegistry};

/// Configured sites and their languages as JSON.
pub fn describe_sites(registry: &SiteRegistry) -> Value {
    let sites: Vec<Value> = registry.sites().iter().map(|s| describe_site(s)).collect();

    json!({
        "sites": sites,
        "site_count": registry.count(),
    })
}

fn describe_site(site: &Site) -> Value {
    let languages: Vec<Value> = site
        .all_languages()
        .iter()
        .map(|l| {
            json!({
                "languageId": l.language_id,
                "title": l.title,
                "locale": l.locale,
                "enabled": l.enabled,
            })
        })
        .collect();

    json!({
        "identifier": site.identifier(),
        "base": site.base,
        "rootPageId": site.root_page_id,
        "languages": languages,
    })
}
