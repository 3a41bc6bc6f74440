use crate::{StorefrontError, StorefrontResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tagging::{Entity, EntityId, EntityResolver, ResolverError};
use tracing::debug;

/// In-memory table of one entity type, keyed by id.
#[derive(Debug)]
pub struct Repository<T> {
    rows: Mutex<BTreeMap<EntityId, Arc<T>>>,
}

impl<T> Default for Repository<T> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> StorefrontResult<MutexGuard<'_, BTreeMap<EntityId, Arc<T>>>> {
        self.rows.lock().map_err(|_| StorefrontError::Poisoned {
            table: std::any::type_name::<T>(),
        })
    }

    pub fn insert(&self, entity: T) -> StorefrontResult<Arc<T>> {
        let mut rows = self.rows()?;
        let id = entity.id();
        if rows.contains_key(&id) {
            return Err(StorefrontError::AlreadyExists { id });
        }
        let entity = Arc::new(entity);
        rows.insert(id, Arc::clone(&entity));
        Ok(entity)
    }

    pub fn get(&self, id: EntityId) -> StorefrontResult<Option<Arc<T>>> {
        Ok(self.rows()?.get(&id).cloned())
    }

    /// Removes the row only; tag bindings pointing at it are left in place.
    pub fn delete(&self, id: EntityId) -> StorefrontResult<()> {
        if self.rows()?.remove(&id).is_none() {
            return Err(StorefrontError::NotFound { id });
        }
        debug!(entity_id = id, "deleted row");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<T: Entity> EntityResolver for Repository<T> {
    async fn find(&self, id: EntityId) -> Result<Option<Arc<dyn Entity>>, ResolverError> {
        let row = self
            .get(id)
            .map_err(|e| ResolverError::new(e.to_string()))?;
        Ok(row.map(|entity| entity as Arc<dyn Entity>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;

    #[test]
    fn test_insert_get_delete() {
        let repo = Repository::<Product>::new();
        repo.insert(Product::new(7, "Baguette", 1)).unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(7).unwrap().unwrap().title, "Baguette");

        assert!(matches!(
            repo.insert(Product::new(7, "Other", 1)),
            Err(StorefrontError::AlreadyExists { id: 7 })
        ));

        repo.delete(7).unwrap();
        assert!(repo.get(7).unwrap().is_none());
        assert!(matches!(
            repo.delete(7),
            Err(StorefrontError::NotFound { id: 7 })
        ));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_resolver_lookup() {
        let repo = Repository::<Product>::new();
        repo.insert(Product::new(1, "Baguette", 1)).unwrap();

        let found = repo.find(1).await.unwrap().unwrap();
        assert_eq!(found.label(), "Baguette");
        assert!(repo.find(2).await.unwrap().is_none());
    }
}
