//! Command: resolve — build a request from CLI input and resolve its demand.

use serde_json::{json, Value};

use headless_demand::{
    Demand, DemandError, DemandResult, ServerRequest, SiteLookup, SiteRegistry,
};

/// Request parts given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ResolveInput {
    /// Site already matched by routing, by identifier.
    pub attached_site: Option<String>,
    /// URL query string.
    pub query: Option<String>,
    /// JSON request body.
    pub body: Option<String>,
    /// Form-encoded request body.
    pub form: Option<String>,
    pub namespace: String,
}

/// Resolve the demand described by `input` and render it as JSON.
pub fn resolve_demand(registry: &SiteRegistry, input: &ResolveInput) -> DemandResult<Value> {
    let mut request = ServerRequest::new();

    if let Some(identifier) = &input.attached_site {
        request = request.with_site(registry.site_by_identifier(identifier)?);
    }
    if let Some(query) = &input.query {
        request = request.with_query_string(query);
    }
    request = match (&input.body, &input.form) {
        (Some(_), Some(_)) => {
            return Err(DemandError::InvalidArgument(
                "Pass either a JSON body or a form body, not both".to_string(),
            ))
        }
        (Some(body), None) => request.with_json_body(body)?,
        (None, Some(form)) => request.with_form_body(form),
        (None, None) => request,
    };

    let demand = Demand::resolve(&request, &input.namespace, registry)?;
    render(&demand)
}

fn render(demand: &Demand) -> DemandResult<Value> {
    let Some(site) = demand.site() else {
        return Ok(json!({ "initialized": false }));
    };

    match demand.to_argument_map() {
        Ok(arguments) => Ok(json!({
            "initialized": true,
            "languageResolved": true,
            "arguments": arguments,
        })),
        Err(DemandError::NoLanguageResolved) => Ok(json!({
            "initialized": true,
            "languageResolved": false,
            "site": site.identifier(),
            "id": demand.page_id(),
            "feGroup": demand.fe_group(),
            "hidden": demand.is_hidden_content_visible(),
            "pageType": demand.page_type_mode(),
        })),
        Err(e) => Err(e),
    }
}
