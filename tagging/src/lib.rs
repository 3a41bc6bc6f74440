//! Generic tagging of heterogeneous entities.
//!
//! Tags are bound to entities through a structural `(EntityKind, entity_id)`
//! pair instead of a typed foreign key, so one tag table serves products,
//! orders, customers and any other registered kind. The [`EntityCatalog`]
//! turns such a pair back into a live entity.

pub mod catalog;
pub mod config;
pub mod memory;
pub mod storage;
pub mod store;
pub mod types;

pub use catalog::{
    CatalogError, CatalogResult, Entity, EntityCatalog, EntityCatalogBuilder, EntityResolver,
    ResolvedEntity, ResolverError,
};
pub use config::{DuplicatePolicy, TaggingConfig};
pub use memory::InMemoryTagStorage;
pub use storage::{StorageError, StorageResult, TagStorage};
pub use store::{TagError, TagResult, TagStore};
pub use types::{BindingFilter, EntityId, EntityKind, Tag, TagBinding, TagBindingId, TagId};

pub mod prelude {
    pub use crate::catalog::*;
    pub use crate::config::*;
    pub use crate::memory::*;
    pub use crate::storage::*;
    pub use crate::store::*;
    pub use crate::types::*;
}
