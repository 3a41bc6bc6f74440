use crate::catalog::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primary key of a taggable entity within its own table.
pub type EntityId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub u64);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagBindingId(pub u64);

impl fmt::Display for TagBindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of one concrete entity type, written `<app_label>.<model>`.
///
/// The identifier is derived from names only, so it survives process restarts
/// and can be stored next to an entity id in a binding row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityKind(String);

impl EntityKind {
    pub fn new(app_label: &str, model: &str) -> CatalogResult<Self> {
        format!("{app_label}.{model}").parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn app_label(&self) -> &str {
        self.0.split_once('.').map_or(self.0.as_str(), |(app, _)| app)
    }

    pub fn model(&self) -> &str {
        self.0.split_once('.').map(|(_, model)| model).unwrap_or("")
    }
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl FromStr for EntityKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.split_once('.') {
            Some((app, model)) if valid_segment(app) && valid_segment(model) => {
                Ok(Self(normalized))
            }
            _ => Err(CatalogError::InvalidKind {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for EntityKind {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.0
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
}

/// One tag applied to one entity, addressed structurally by kind and id.
///
/// Nothing guarantees the referenced entity still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBinding {
    pub id: TagBindingId,
    pub tag_id: TagId,
    pub entity_kind: EntityKind,
    pub entity_id: EntityId,
}

impl TagBinding {
    pub fn targets(&self, entity_kind: &EntityKind, entity_id: EntityId) -> bool {
        &self.entity_kind == entity_kind && self.entity_id == entity_id
    }
}

/// Row predicate for selecting bindings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingFilter {
    pub tag_id: Option<TagId>,
    pub entity_kind: Option<EntityKind>,
    pub entity_id: Option<EntityId>,
}

impl BindingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag_id: TagId) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    pub fn with_kind(mut self, entity_kind: EntityKind) -> Self {
        self.entity_kind = Some(entity_kind);
        self
    }

    pub fn with_entity(mut self, entity_kind: EntityKind, entity_id: EntityId) -> Self {
        self.entity_kind = Some(entity_kind);
        self.entity_id = Some(entity_id);
        self
    }

    pub fn matches(&self, binding: &TagBinding) -> bool {
        self.tag_id.is_none_or(|id| binding.tag_id == id)
            && self
                .entity_kind
                .as_ref()
                .is_none_or(|kind| &binding.entity_kind == kind)
            && self.entity_id.is_none_or(|id| binding.entity_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(tag: u64, kind: &str, entity: EntityId) -> TagBinding {
        TagBinding {
            id: TagBindingId(1),
            tag_id: TagId(tag),
            entity_kind: kind.parse().unwrap(),
            entity_id: entity,
        }
    }

    #[test]
    fn test_entity_kind_parsing() {
        let kind: EntityKind = "store.product".parse().unwrap();
        assert_eq!(kind.app_label(), "store");
        assert_eq!(kind.model(), "product");
        assert_eq!(kind.to_string(), "store.product");

        let shouted: EntityKind = " Store.Product ".parse().unwrap();
        assert_eq!(shouted, kind);

        assert!("product".parse::<EntityKind>().is_err());
        assert!("store.".parse::<EntityKind>().is_err());
        assert!(".product".parse::<EntityKind>().is_err());
        assert!("store.order.item".parse::<EntityKind>().is_err());
        assert!("store.order-item".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_entity_kind_from_parts() {
        let kind = EntityKind::new("store", "order").unwrap();
        assert_eq!(kind.as_str(), "store.order");
        assert!(EntityKind::new("", "order").is_err());
    }

    #[test]
    fn test_entity_kind_serialization() {
        let kind = EntityKind::new("store", "cart").unwrap();
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"store.cart\"");

        let back: EntityKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
        assert!(serde_json::from_str::<EntityKind>("\"cart\"").is_err());
    }

    #[test]
    fn test_binding_filter() {
        let b = binding(1, "store.product", 7);

        assert!(BindingFilter::new().matches(&b));
        assert!(BindingFilter::new().with_tag(TagId(1)).matches(&b));
        assert!(!BindingFilter::new().with_tag(TagId(2)).matches(&b));

        let product: EntityKind = "store.product".parse().unwrap();
        let order: EntityKind = "store.order".parse().unwrap();
        assert!(BindingFilter::new()
            .with_entity(product.clone(), 7)
            .matches(&b));
        assert!(!BindingFilter::new().with_entity(product, 8).matches(&b));
        assert!(!BindingFilter::new().with_kind(order).matches(&b));
    }
}
