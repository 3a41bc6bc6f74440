//! In-memory tag storage (for testing and development)

use crate::storage::{StorageError, StorageResult, TagStorage};
use crate::types::{BindingFilter, EntityId, EntityKind, Tag, TagBinding, TagBindingId, TagId};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    tags: BTreeMap<TagId, Tag>,
    bindings: BTreeMap<TagBindingId, TagBinding>,
    next_tag_id: u64,
    next_binding_id: u64,
}

impl Tables {
    fn delete_bindings_for_tag(&mut self, tag_id: TagId) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|_, b| b.tag_id != tag_id);
        before - self.bindings.len()
    }
}

/// Both tables live behind one mutex, so each call is atomic.
#[derive(Debug, Default)]
pub struct InMemoryTagStorage {
    tables: Mutex<Tables>,
}

impl InMemoryTagStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StorageResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StorageError::Backend {
            message: "in-memory tables poisoned".to_string(),
        })
    }
}

#[async_trait]
impl TagStorage for InMemoryTagStorage {
    async fn insert_tag(&self, label: &str) -> StorageResult<Tag> {
        let mut tables = self.tables()?;
        tables.next_tag_id += 1;
        let tag = Tag {
            id: TagId(tables.next_tag_id),
            label: label.to_string(),
        };
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn get_tag(&self, id: TagId) -> StorageResult<Option<Tag>> {
        Ok(self.tables()?.tags.get(&id).cloned())
    }

    async fn update_tag_label(&self, id: TagId, label: &str) -> StorageResult<bool> {
        let mut tables = self.tables()?;
        match tables.tags.get_mut(&id) {
            Some(tag) => {
                tag.label = label.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_tag(&self, id: TagId) -> StorageResult<Option<usize>> {
        let mut tables = self.tables()?;
        if tables.tags.remove(&id).is_none() {
            return Ok(None);
        }
        Ok(Some(tables.delete_bindings_for_tag(id)))
    }

    async fn list_tags(&self) -> StorageResult<Vec<Tag>> {
        Ok(self.tables()?.tags.values().cloned().collect())
    }

    async fn insert_binding(
        &self,
        tag_id: TagId,
        entity_kind: EntityKind,
        entity_id: EntityId,
    ) -> StorageResult<TagBinding> {
        let mut tables = self.tables()?;
        if !tables.tags.contains_key(&tag_id) {
            return Err(StorageError::ForeignKey { tag_id });
        }

        tables.next_binding_id += 1;
        let binding = TagBinding {
            id: TagBindingId(tables.next_binding_id),
            tag_id,
            entity_kind,
            entity_id,
        };
        tables.bindings.insert(binding.id, binding.clone());
        Ok(binding)
    }

    async fn delete_binding(&self, id: TagBindingId) -> StorageResult<bool> {
        Ok(self.tables()?.bindings.remove(&id).is_some())
    }

    async fn delete_bindings_for_tag(&self, tag_id: TagId) -> StorageResult<usize> {
        Ok(self.tables()?.delete_bindings_for_tag(tag_id))
    }

    async fn select_bindings(&self, filter: &BindingFilter) -> StorageResult<Vec<TagBinding>> {
        Ok(self
            .tables()?
            .bindings
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    async fn select_tags_for_entity(
        &self,
        entity_kind: &EntityKind,
        entity_id: EntityId,
    ) -> StorageResult<Vec<Tag>> {
        let tables = self.tables()?;
        Ok(tables
            .bindings
            .values()
            .filter(|b| b.targets(entity_kind, entity_id))
            .filter_map(|b| tables.tags.get(&b.tag_id).cloned())
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}
