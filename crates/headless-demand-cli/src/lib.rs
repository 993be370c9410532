//! Headless demand CLI — resolve request demands against a site configuration.

pub mod commands;
pub mod config;

pub use commands::{describe_sites, resolve_demand, ResolveInput};
pub use config::resolve_sites_path;
