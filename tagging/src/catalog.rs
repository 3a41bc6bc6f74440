//! Entity catalog
//!
//! Maps concrete Rust types to their stable [`EntityKind`] and resolves
//! `(kind, id)` pairs back to live entities through a per-kind
//! [`EntityResolver`].
//!
//! The catalog is assembled once at startup with [`EntityCatalogBuilder`] and
//! is read-only afterwards. Share it as `Arc<EntityCatalog>`; lookups take no
//! locks.

use crate::types::{EntityId, EntityKind};
use async_trait::async_trait;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Type is not registered in the entity catalog: {type_name}")]
    UnregisteredType { type_name: &'static str },

    #[error("Unknown entity kind: {kind}")]
    UnknownKind { kind: EntityKind },

    #[error("Type registered twice: {type_name}")]
    DuplicateType { type_name: &'static str },

    #[error("Entity kind registered twice: {kind}")]
    DuplicateKind { kind: EntityKind },

    #[error("Invalid entity kind '{value}', expected <app_label>.<model>")]
    InvalidKind { value: String },

    #[error("Resolver for {kind} failed: {source}")]
    Resolver {
        kind: EntityKind,
        #[source]
        source: ResolverError,
    },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure reported by a kind-specific lookup.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ResolverError {
    pub message: String,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A persisted business object that tags can be attached to.
pub trait Entity: Any + Send + Sync + fmt::Debug {
    /// Primary key within the entity's own table
    fn id(&self) -> EntityId;

    /// Human-readable name used in listings
    fn label(&self) -> String;

    fn as_any(&self) -> &dyn Any;
}

/// Kind-specific lookup, e.g. "find Product by id".
///
/// A missing row is `Ok(None)`, never an error.
#[async_trait]
pub trait EntityResolver: Send + Sync {
    async fn find(&self, id: EntityId) -> Result<Option<Arc<dyn Entity>>, ResolverError>;
}

/// An entity looked up through the catalog, together with its kind.
#[derive(Debug, Clone)]
pub struct ResolvedEntity {
    pub kind: EntityKind,
    pub entity: Arc<dyn Entity>,
}

impl ResolvedEntity {
    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    pub fn label(&self) -> String {
        self.entity.label()
    }

    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.entity.as_any().downcast_ref::<T>()
    }
}

struct Registration {
    type_name: &'static str,
    resolver: Arc<dyn EntityResolver>,
}

#[derive(Default)]
pub struct EntityCatalogBuilder {
    by_type: HashMap<TypeId, EntityKind>,
    by_kind: HashMap<EntityKind, Registration>,
}

impl EntityCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `kind`, resolved by `resolver`.
    pub fn register<T: Entity>(
        mut self,
        kind: EntityKind,
        resolver: Arc<dyn EntityResolver>,
    ) -> CatalogResult<Self> {
        let type_id = TypeId::of::<T>();
        let type_name = type_name::<T>();

        if self.by_type.contains_key(&type_id) {
            return Err(CatalogError::DuplicateType { type_name });
        }
        if self.by_kind.contains_key(&kind) {
            return Err(CatalogError::DuplicateKind { kind });
        }

        debug!(%kind, type_name, "registering entity kind");
        self.by_type.insert(type_id, kind.clone());
        self.by_kind.insert(
            kind,
            Registration {
                type_name,
                resolver,
            },
        );
        Ok(self)
    }

    pub fn build(self) -> EntityCatalog {
        EntityCatalog {
            by_type: self.by_type,
            by_kind: self.by_kind,
        }
    }
}

pub struct EntityCatalog {
    by_type: HashMap<TypeId, EntityKind>,
    by_kind: HashMap<EntityKind, Registration>,
}

impl EntityCatalog {
    pub fn builder() -> EntityCatalogBuilder {
        EntityCatalogBuilder::new()
    }

    pub fn kind_of<T: Entity>(&self) -> CatalogResult<EntityKind> {
        self.by_type
            .get(&TypeId::of::<T>())
            .cloned()
            .ok_or(CatalogError::UnregisteredType {
                type_name: type_name::<T>(),
            })
    }

    /// Kind of a live entity value, looked up by its concrete type.
    pub fn kind_of_entity(&self, entity: &dyn Entity) -> CatalogResult<EntityKind> {
        self.by_type
            .get(&entity.as_any().type_id())
            .cloned()
            .ok_or(CatalogError::UnregisteredType {
                type_name: "<dyn Entity>",
            })
    }

    pub fn contains(&self, kind: &EntityKind) -> bool {
        self.by_kind.contains_key(kind)
    }

    pub fn ensure_known(&self, kind: &EntityKind) -> CatalogResult<()> {
        if self.contains(kind) {
            Ok(())
        } else {
            Err(CatalogError::UnknownKind { kind: kind.clone() })
        }
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&EntityKind> {
        let mut kinds: Vec<_> = self.by_kind.keys().collect();
        kinds.sort();
        kinds
    }

    pub fn type_name_of(&self, kind: &EntityKind) -> Option<&'static str> {
        self.by_kind.get(kind).map(|r| r.type_name)
    }

    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }

    /// Look up the entity behind `(kind, id)`.
    ///
    /// Returns `Ok(None)` when the row no longer exists; dangling bindings are
    /// a normal condition for callers.
    pub async fn resolve(
        &self,
        kind: &EntityKind,
        id: EntityId,
    ) -> CatalogResult<Option<ResolvedEntity>> {
        let registration = self
            .by_kind
            .get(kind)
            .ok_or_else(|| CatalogError::UnknownKind { kind: kind.clone() })?;

        let found = registration
            .resolver
            .find(id)
            .await
            .map_err(|source| CatalogError::Resolver {
                kind: kind.clone(),
                source,
            })?;

        if found.is_none() {
            debug!(%kind, entity_id = id, "entity not found");
        }

        Ok(found.map(|entity| ResolvedEntity {
            kind: kind.clone(),
            entity,
        }))
    }
}

impl fmt::Debug for EntityCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCatalog")
            .field("kinds", &self.kinds())
            .finish()
    }
}
