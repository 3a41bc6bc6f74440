//! Store entities that can carry tags

use serde::{Deserialize, Serialize};
use std::any::Any;
use tagging::{Entity, EntityId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: EntityId,
    pub title: String,
    pub featured_product_id: Option<EntityId>,
}

impl Collection {
    pub fn new(id: EntityId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            featured_product_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: EntityId,
    pub title: String,
    pub slug: String,
    pub unit_price_cents: u64,
    pub inventory: i64,
    pub collection_id: EntityId,
}

impl Product {
    pub fn new(id: EntityId, title: impl Into<String>, collection_id: EntityId) -> Self {
        let title = title.into();
        Self {
            id,
            slug: slugify(&title),
            title,
            unit_price_cents: 0,
            inventory: 0,
            collection_id,
        }
    }

    pub fn with_price_cents(mut self, unit_price_cents: u64) -> Self {
        self.unit_price_cents = unit_price_cents;
        self
    }

    pub fn with_inventory(mut self, inventory: i64) -> Self {
        self.inventory = inventory;
        self
    }
}

fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Membership {
    #[default]
    #[serde(rename = "B")]
    Bronze,
    #[serde(rename = "S")]
    Silver,
    #[serde(rename = "G")]
    Gold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub membership: Membership,
}

impl Customer {
    pub fn new(
        id: EntityId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            membership: Membership::default(),
        }
    }

    pub fn with_membership(mut self, membership: Membership) -> Self {
        self.membership = membership;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "P")]
    Pending,
    #[serde(rename = "C")]
    Complete,
    #[serde(rename = "F")]
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: EntityId,
    pub customer_id: EntityId,
    pub payment_status: PaymentStatus,
}

impl Order {
    pub fn new(id: EntityId, customer_id: EntityId) -> Self {
        Self {
            id,
            customer_id,
            payment_status: PaymentStatus::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: EntityId,
}

impl Entity for Collection {
    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        self.title.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Entity for Product {
    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        self.title.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Entity for Customer {
    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Entity for Order {
    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        format!("Order #{}", self.id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Entity for Cart {
    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        format!("Cart #{}", self.id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
