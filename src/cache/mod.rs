//! Versioned offline cache of static assets.
//!
//! This module provides the `AssetCache`: a fixed manifest of assets stored
//! under a named generation directory, seeded atomically on install and
//! pruned to the current generation on activation. Requests are served
//! cache-first.

pub mod manager;

pub use manager::{Asset, AssetCache, CacheError};
