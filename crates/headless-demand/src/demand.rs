//! Demand resolution: the rendering parameters of one request.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::arguments::{cast_string, ActionArguments};
use crate::request::ServerRequest;
use crate::site::SiteLookup;
use crate::types::{DemandError, DemandResult, Site, SiteLanguage};

const DEFAULT_PAGE_TYPE_MODE: &str = "default";

/// Read-only view of a resolved demand, for code that renders or links.
pub trait JsonViewDemand {
    fn page_id(&self) -> u64;
    fn site(&self) -> Option<&Arc<Site>>;
    fn site_language(&self) -> DemandResult<&SiteLanguage>;
    fn fe_group(&self) -> i64;
    fn is_hidden_content_visible(&self) -> bool;
    fn page_type_mode(&self) -> &str;
    fn language_id(&self) -> DemandResult<i64>;
    fn plugin_namespace(&self) -> &str;
    fn to_argument_map(&self) -> DemandResult<Map<String, Value>>;
    fn is_initialized(&self) -> bool;
}

/// The resolved rendering parameters of one request. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Demand {
    page_id: u64,
    site: Option<Arc<Site>>,
    site_language: Option<SiteLanguage>,
    fe_group: i64,
    hidden_content_visible: bool,
    page_type_mode: String,
    plugin_namespace: String,
}

impl Demand {
    /// A demand with every field at its default and no site.
    pub fn uninitialized(plugin_namespace: &str) -> Self {
        Self {
            page_id: 0,
            site: None,
            site_language: None,
            fe_group: 0,
            hidden_content_visible: true,
            page_type_mode: DEFAULT_PAGE_TYPE_MODE.to_string(),
            plugin_namespace: plugin_namespace.to_string(),
        }
    }

    /// Resolve the demand of `request`.
    ///
    /// The site attached to the request is used when present; otherwise a
    /// `site` argument is looked up through `sites`, and a lookup failure
    /// aborts resolution. Without any site the result is uninitialized.
    pub fn resolve(
        request: &ServerRequest,
        plugin_namespace: &str,
        sites: &dyn SiteLookup,
    ) -> DemandResult<Self> {
        let args = ActionArguments::new(request, plugin_namespace);

        let site = match request.attached_site() {
            Some(site) => Some(Arc::clone(site)),
            None => match args.get("site") {
                Some(value) => {
                    let identifier = cast_string(value).ok_or_else(|| {
                        DemandError::InvalidArgument(
                            "Argument 'site' must be a scalar identifier".to_string(),
                        )
                    })?;
                    tracing::debug!("Looking up site '{identifier}' from request arguments");
                    Some(sites.site_by_identifier(&identifier)?)
                }
                None => None,
            },
        };

        let Some(site) = site else {
            tracing::debug!("No site in request context; demand stays uninitialized");
            return Ok(Self::uninitialized(plugin_namespace));
        };

        let page_id = args.integer("id", 0);
        let page_id = u64::try_from(page_id).unwrap_or_else(|_| {
            tracing::debug!("Negative page id {page_id} clamped to 0");
            0
        });

        let site_language = match_language(&site, &args);

        Ok(Self {
            page_id,
            fe_group: args.integer("feGroup", 0),
            hidden_content_visible: args.boolean("hidden", true),
            page_type_mode: args.string("pageTypeMode", DEFAULT_PAGE_TYPE_MODE),
            plugin_namespace: plugin_namespace.to_string(),
            site_language,
            site: Some(site),
        })
    }

    pub fn page_id(&self) -> u64 {
        self.page_id
    }

    pub fn site(&self) -> Option<&Arc<Site>> {
        self.site.as_ref()
    }

    /// The matched language. Errors when no configured language matched.
    pub fn site_language(&self) -> DemandResult<&SiteLanguage> {
        self.site_language
            .as_ref()
            .ok_or(DemandError::NoLanguageResolved)
    }

    pub fn fe_group(&self) -> i64 {
        self.fe_group
    }

    pub fn is_hidden_content_visible(&self) -> bool {
        self.hidden_content_visible
    }

    pub fn page_type_mode(&self) -> &str {
        &self.page_type_mode
    }

    pub fn language_id(&self) -> DemandResult<i64> {
        self.site_language().map(SiteLanguage::language_id)
    }

    pub fn plugin_namespace(&self) -> &str {
        &self.plugin_namespace
    }

    /// True iff a site was resolved.
    pub fn is_initialized(&self) -> bool {
        self.site.is_some()
    }

    /// The demand as link arguments, in the order
    /// `pageType, lang, id, feGroup, site, hidden`.
    pub fn to_argument_map(&self) -> DemandResult<Map<String, Value>> {
        let site = self.site.as_ref().ok_or(DemandError::NotInitialized)?;
        let language_id = self.language_id()?;

        let mut map = Map::new();
        map.insert("pageType".to_string(), json!(self.page_type_mode));
        map.insert("lang".to_string(), json!(language_id));
        map.insert("id".to_string(), json!(self.page_id));
        map.insert("feGroup".to_string(), json!(self.fe_group));
        map.insert("site".to_string(), json!(site.identifier()));
        map.insert("hidden".to_string(), json!(self.hidden_content_visible));
        Ok(map)
    }
}

/// First enabled language whose ID equals the `lang` argument (default 0).
///
/// A site with no language of that ID leaves the demand without a language;
/// this includes sites lacking language 0 when no `lang` was sent.
fn match_language(site: &Site, args: &ActionArguments<'_>) -> Option<SiteLanguage> {
    if site.languages().is_empty() {
        return None;
    }

    let lang = args.integer("lang", 0);
    let matched = site.language_by_id(lang).cloned();
    if matched.is_none() {
        tracing::debug!(
            "Site '{}' has no language with id {lang}",
            site.identifier()
        );
    }
    matched
}

impl JsonViewDemand for Demand {
    fn page_id(&self) -> u64 {
        Demand::page_id(self)
    }

    fn site(&self) -> Option<&Arc<Site>> {
        Demand::site(self)
    }

    fn site_language(&self) -> DemandResult<&SiteLanguage> {
        Demand::site_language(self)
    }

    fn fe_group(&self) -> i64 {
        Demand::fe_group(self)
    }

    fn is_hidden_content_visible(&self) -> bool {
        Demand::is_hidden_content_visible(self)
    }

    fn page_type_mode(&self) -> &str {
        Demand::page_type_mode(self)
    }

    fn language_id(&self) -> DemandResult<i64> {
        Demand::language_id(self)
    }

    fn plugin_namespace(&self) -> &str {
        Demand::plugin_namespace(self)
    }

    fn to_argument_map(&self) -> DemandResult<Map<String, Value>> {
        Demand::to_argument_map(self)
    }

    fn is_initialized(&self) -> bool {
        Demand::is_initialized(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteRegistry;

    fn registry() -> SiteRegistry {
        let main = Site::new("main")
            .with_language(SiteLanguage::new(0))
            .with_language(SiteLanguage::new(1))
            .with_language(SiteLanguage::new(2));
        SiteRegistry::new(vec![main]).unwrap()
    }

    #[test]
    fn test_uninitialized_defaults() {
        let demand = Demand::resolve(&ServerRequest::new(), "tx_ns", &registry()).unwrap();
        assert!(!demand.is_initialized());
        assert_eq!(demand.page_id(), 0);
        assert_eq!(demand.fe_group(), 0);
        assert!(demand.is_hidden_content_visible());
        assert_eq!(demand.page_type_mode(), "default");
        assert_eq!(demand.plugin_namespace(), "tx_ns");
        assert!(demand.site().is_none());
        assert!(matches!(
            demand.site_language(),
            Err(DemandError::NoLanguageResolved)
        ));
        assert!(matches!(
            demand.to_argument_map(),
            Err(DemandError::NotInitialized)
        ));
    }

    #[test]
    fn test_negative_page_id_clamped() {
        let request = ServerRequest::new().with_query_string("site=main&id=-4");
        let demand = Demand::resolve(&request, "", &registry()).unwrap();
        assert_eq!(demand.page_id(), 0);
    }

    #[test]
    fn test_non_scalar_site_argument() {
        let request = ServerRequest::new().with_query_string("site[]=main");
        let err = Demand::resolve(&request, "", &registry()).unwrap_err();
        assert!(matches!(err, DemandError::InvalidArgument(_)));
    }

    #[test]
    fn test_trait_view_matches_concrete() {
        let request = ServerRequest::new().with_query_string("site=main&lang=2&feGroup=-1");
        let demand = Demand::resolve(&request, "", &registry()).unwrap();
        let view: &dyn JsonViewDemand = &demand;
        assert!(view.is_initialized());
        assert_eq!(view.language_id().unwrap(), 2);
        assert_eq!(view.fe_group(), -1);
        assert_eq!(
            view.to_argument_map().unwrap(),
            demand.to_argument_map().unwrap()
        );
    }
}
