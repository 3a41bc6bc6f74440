use crate::types::{BindingFilter, EntityId, EntityKind, Tag, TagBinding, TagBindingId, TagId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Foreign key violation: tag {tag_id} does not exist")]
    ForeignKey { tag_id: TagId },

    #[error("Storage backend error: {message}")]
    Backend { message: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Row-level persistence for tags and their bindings.
///
/// Every method runs as one atomic unit against the backend. No ordering or
/// isolation is promised across calls.
#[async_trait]
pub trait TagStorage: Send + Sync {
    async fn insert_tag(&self, label: &str) -> StorageResult<Tag>;

    async fn get_tag(&self, id: TagId) -> StorageResult<Option<Tag>>;

    /// Returns `false` when no row had that id.
    async fn update_tag_label(&self, id: TagId, label: &str) -> StorageResult<bool>;

    /// Removes the tag row and every binding referencing it as one unit.
    ///
    /// Returns the number of bindings removed, or `None` when no tag row had
    /// that id (nothing is touched then).
    async fn delete_tag(&self, id: TagId) -> StorageResult<Option<usize>>;

    /// All tags ordered by id.
    async fn list_tags(&self) -> StorageResult<Vec<Tag>>;

    /// Fails with [`StorageError::ForeignKey`] when the tag row is absent.
    async fn insert_binding(
        &self,
        tag_id: TagId,
        entity_kind: EntityKind,
        entity_id: EntityId,
    ) -> StorageResult<TagBinding>;

    /// Returns `false` when no row had that id.
    async fn delete_binding(&self, id: TagBindingId) -> StorageResult<bool>;

    /// Delete-by-foreign-key. Returns rows removed.
    async fn delete_bindings_for_tag(&self, tag_id: TagId) -> StorageResult<usize>;

    /// Matching bindings ordered by id, i.e. insertion order.
    async fn select_bindings(&self, filter: &BindingFilter) -> StorageResult<Vec<TagBinding>>;

    /// Tags joined through the entity's bindings, one entry per binding, in
    /// binding id order. Bindings whose tag row is absent are left out.
    async fn select_tags_for_entity(
        &self,
        entity_kind: &EntityKind,
        entity_id: EntityId,
    ) -> StorageResult<Vec<Tag>>;

    fn backend_name(&self) -> &'static str;
}
