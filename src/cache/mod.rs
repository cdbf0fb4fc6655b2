//! Response caching shared by every list controller.
//!
//! Pages are keyed by query shape (resource kind, page, sorted non-blank
//! filters, see `catalog::build_key`) and served from memory until they
//! expire.

mod store;

pub use store::TtlCache;
