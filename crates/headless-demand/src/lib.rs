//! Headless demand — resolves the page, language, site and visibility parameters of a request.

pub mod arguments;
pub mod demand;
pub mod request;
pub mod site;
pub mod types;

pub use arguments::{ActionArguments, ArgumentSource};
pub use demand::{Demand, JsonViewDemand};
pub use request::{parse_query_string, ServerRequest};
pub use site::{SiteConfiguration, SiteLookup, SiteRegistry};
pub use types::*;
