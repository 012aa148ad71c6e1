//! Local persistent data store.
//!
//! The `Store` owns the lead, project and profile collections, loaded once at
//! startup and rewritten wholesale on every mutation. Backends implement the
//! `Storage` trait; file storage keeps one JSON blob per collection.

pub mod error;
pub mod storage;
pub mod store;

pub use error::StoreError;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{Store, KEY_LEADS, KEY_PROFILE, KEY_PROJECTS};
