//! Command implementations shared by the binary and its tests.

pub mod resolve;
pub mod sites;

pub use resolve::{resolve_demand, ResolveInput};
pub use sites::describe_sites;
