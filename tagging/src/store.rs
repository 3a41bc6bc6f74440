//! Tag store
//!
//! [`TagStore`] is the query facade over a [`TagStorage`] backend. It creates
//! and deletes tags, binds them to entities of any registered kind, and maps
//! bindings back to tags or to live entities through the [`EntityCatalog`].
//!
//! Two delete paths behave differently on purpose:
//!
//! - deleting a tag removes every binding that references it;
//! - deleting an entity in its own table leaves its bindings in place. Readers
//!   skip such dangling bindings instead of failing.

use crate::catalog::{CatalogError, Entity, EntityCatalog, ResolvedEntity};
use crate::config::{DuplicatePolicy, TaggingConfig};
use crate::storage::{StorageError, TagStorage};
use crate::types::{BindingFilter, EntityId, EntityKind, Tag, TagBinding, TagBindingId, TagId};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum TagError {
    #[error("Tag not found: {tag_id}")]
    TagNotFound { tag_id: TagId },

    #[error("Tag binding not found: {binding_id}")]
    BindingNotFound { binding_id: TagBindingId },

    #[error("Invalid tag label: {message}")]
    InvalidLabel { message: String },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type TagResult<T> = Result<T, TagError>;

pub struct TagStore {
    storage: Arc<dyn TagStorage>,
    catalog: Arc<EntityCatalog>,
    config: TaggingConfig,
}

impl TagStore {
    pub fn new(storage: Arc<dyn TagStorage>, catalog: Arc<EntityCatalog>) -> Self {
        Self::with_config(storage, catalog, TaggingConfig::default())
    }

    pub fn with_config(
        storage: Arc<dyn TagStorage>,
        catalog: Arc<EntityCatalog>,
        config: TaggingConfig,
    ) -> Self {
        Self {
            storage,
            catalog,
            config,
        }
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &TaggingConfig {
        &self.config
    }

    fn normalize_label(&self, label: &str) -> TagResult<String> {
        let label = label.trim();
        if label.is_empty() {
            return Err(TagError::InvalidLabel {
                message: "label cannot be empty".to_string(),
            });
        }

        let len = label.chars().count();
        if len > self.config.max_label_len {
            return Err(TagError::InvalidLabel {
                message: format!(
                    "label is {} characters, limit is {}",
                    len, self.config.max_label_len
                ),
            });
        }

        Ok(label.to_string())
    }

    pub async fn create_tag(&self, label: &str) -> TagResult<Tag> {
        let label = self.normalize_label(label)?;
        let tag = self.storage.insert_tag(&label).await?;
        info!(tag_id = %tag.id, label = %tag.label, "created tag");
        Ok(tag)
    }

    pub async fn tag(&self, tag_id: TagId) -> TagResult<Tag> {
        self.storage
            .get_tag(tag_id)
            .await?
            .ok_or(TagError::TagNotFound { tag_id })
    }

    pub async fn list_tags(&self) -> TagResult<Vec<Tag>> {
        Ok(self.storage.list_tags().await?)
    }

    /// Case-insensitive substring match on labels, for autocomplete lookups.
    pub async fn search_tags(&self, query: &str) -> TagResult<Vec<Tag>> {
        let needle = query.trim().to_lowercase();
        let tags = self.storage.list_tags().await?;
        Ok(tags
            .into_iter()
            .filter(|t| t.label.to_lowercase().contains(&needle))
            .collect())
    }

    pub async fn rename_tag(&self, tag_id: TagId, label: &str) -> TagResult<Tag> {
        let label = self.normalize_label(label)?;
        if !self.storage.update_tag_label(tag_id, &label).await? {
            return Err(TagError::TagNotFound { tag_id });
        }
        debug!(%tag_id, %label, "renamed tag");
        Ok(Tag { id: tag_id, label })
    }

    /// Delete a tag and every binding that references it, in one storage call.
    ///
    /// Returns the number of bindings removed. On a storage failure nothing is
    /// deleted and the call can be retried.
    pub async fn delete_tag(&self, tag_id: TagId) -> TagResult<usize> {
        let removed = self
            .storage
            .delete_tag(tag_id)
            .await?
            .ok_or(TagError::TagNotFound { tag_id })?;
        info!(%tag_id, bindings_removed = removed, "deleted tag");
        Ok(removed)
    }

    /// Bind a tag to the entity `(entity_kind, entity_id)`.
    ///
    /// The entity row is not checked; only the kind must be registered.
    pub async fn apply(
        &self,
        tag_id: TagId,
        entity_kind: EntityKind,
        entity_id: EntityId,
    ) -> TagResult<TagBindingId> {
        self.catalog.ensure_known(&entity_kind)?;

        if self.config.duplicate_policy == DuplicatePolicy::ReuseExisting {
            let filter = BindingFilter::new()
                .with_tag(tag_id)
                .with_entity(entity_kind.clone(), entity_id);
            if let Some(existing) = self.storage.select_bindings(&filter).await?.first() {
                debug!(binding_id = %existing.id, "reusing existing tag binding");
                return Ok(existing.id);
            }
        }

        let binding = self
            .storage
            .insert_binding(tag_id, entity_kind, entity_id)
            .await
            .map_err(|e| match e {
                StorageError::ForeignKey { tag_id } => TagError::TagNotFound { tag_id },
                other => TagError::Storage(other),
            })?;

        debug!(
            binding_id = %binding.id,
            %tag_id,
            entity_kind = %binding.entity_kind,
            entity_id,
            "applied tag"
        );
        Ok(binding.id)
    }

    /// Bind a tag to a live entity, looking its kind up in the catalog.
    pub async fn apply_to<T: Entity>(&self, tag_id: TagId, entity: &T) -> TagResult<TagBindingId> {
        let kind = self.catalog.kind_of::<T>()?;
        self.apply(tag_id, kind, entity.id()).await
    }

    pub async fn remove(&self, binding_id: TagBindingId) -> TagResult<()> {
        if !self.storage.delete_binding(binding_id).await? {
            return Err(TagError::BindingNotFound { binding_id });
        }
        debug!(%binding_id, "removed tag binding");
        Ok(())
    }

    /// Raw binding rows for one entity, in insertion order.
    pub async fn bindings_for(
        &self,
        entity_kind: &EntityKind,
        entity_id: EntityId,
    ) -> TagResult<Vec<TagBinding>> {
        self.catalog.ensure_known(entity_kind)?;
        let filter = BindingFilter::new().with_entity(entity_kind.clone(), entity_id);
        Ok(self.storage.select_bindings(&filter).await?)
    }

    /// Tags bound to one entity, one entry per binding, in insertion order.
    pub async fn tags_for(
        &self,
        entity_kind: &EntityKind,
        entity_id: EntityId,
    ) -> TagResult<Vec<Tag>> {
        self.catalog.ensure_known(entity_kind)?;
        Ok(self
            .storage
            .select_tags_for_entity(entity_kind, entity_id)
            .await?)
    }

    pub async fn tags_for_type<T: Entity>(&self, entity_id: EntityId) -> TagResult<Vec<Tag>> {
        let kind = self.catalog.kind_of::<T>()?;
        self.tags_for(&kind, entity_id).await
    }

    /// Entities of `entity_kind` carrying the tag.
    ///
    /// Fails with [`TagError::TagNotFound`] for an unknown tag. Bindings are
    /// selected up front; each entity is resolved only when the stream is
    /// polled. Bindings whose entity no longer exists are skipped, and an
    /// entity bound more than once is yielded once.
    pub async fn entities_for(
        &self,
        tag_id: TagId,
        entity_kind: &EntityKind,
    ) -> TagResult<BoxStream<'static, TagResult<ResolvedEntity>>> {
        self.catalog.ensure_known(entity_kind)?;
        self.tag(tag_id).await?;

        let filter = BindingFilter::new()
            .with_tag(tag_id)
            .with_kind(entity_kind.clone());
        let mut seen = HashSet::new();
        let bindings: Vec<TagBinding> = self
            .storage
            .select_bindings(&filter)
            .await?
            .into_iter()
            .filter(|b| seen.insert(b.entity_id))
            .collect();

        let catalog = Arc::clone(&self.catalog);
        let entities = stream::iter(bindings)
            .then(move |binding| {
                let catalog = Arc::clone(&catalog);
                async move {
                    let resolved = catalog
                        .resolve(&binding.entity_kind, binding.entity_id)
                        .await;
                    (binding, resolved)
                }
            })
            .filter_map(|(binding, resolved)| async move {
                match resolved {
                    Ok(Some(entity)) => Some(Ok(entity)),
                    Ok(None) => {
                        debug!(
                            binding_id = %binding.id,
                            entity_kind = %binding.entity_kind,
                            entity_id = binding.entity_id,
                            "skipping dangling tag binding"
                        );
                        None
                    }
                    Err(e) => Some(Err(TagError::Catalog(e))),
                }
            })
            .boxed();

        Ok(entities)
    }

    pub async fn entities_for_type<T: Entity>(
        &self,
        tag_id: TagId,
    ) -> TagResult<BoxStream<'static, TagResult<ResolvedEntity>>> {
        let kind = self.catalog.kind_of::<T>()?;
        self.entities_for(tag_id, &kind).await
    }
}
