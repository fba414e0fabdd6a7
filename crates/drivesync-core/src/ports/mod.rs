//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that the reconciliation core depends on, but whose
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IFileLister`] - Produces the descriptors of one side (local disk or
//!   remote service), keyed by logical path

pub mod listing;

pub use listing::{IFileLister, Listing, Origin};
pub use crate::domain::descriptor::RemoteEntry;
