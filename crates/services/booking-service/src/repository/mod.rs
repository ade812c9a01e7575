//! Repository layer for data access.

pub mod entities;
mod entity_store;

pub use entity_store::{EntityStore, SqlEntityStore};

#[cfg(any(test, feature = "test-utils"))]
pub use entity_store::MockEntityStore;
