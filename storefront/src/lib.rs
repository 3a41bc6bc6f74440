//! Store entities for the tagging catalog
//!
//! Products, collections, customers, orders and carts, each kept in an
//! in-memory [`Repository`] that doubles as the catalog resolver for its kind.

pub mod models;
pub mod repository;

pub use models::{Cart, Collection, Customer, Membership, Order, PaymentStatus, Product};
pub use repository::Repository;

use std::sync::Arc;
use tagging::{CatalogResult, EntityCatalogBuilder, EntityId, EntityKind};
use thiserror::Error;

/// Errors raised by the storefront tables
#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Row already exists: {id}")]
    AlreadyExists { id: EntityId },

    #[error("Row not found: {id}")]
    NotFound { id: EntityId },

    #[error("Table lock poisoned: {table}")]
    Poisoned { table: &'static str },
}

pub type StorefrontResult<T> = Result<T, StorefrontError>;

pub const APP_LABEL: &str = "store";

/// Kind identifiers, `store.<model>`.
pub mod kinds {
    use super::APP_LABEL;
    use tagging::{CatalogResult, EntityKind};

    pub fn product() -> CatalogResult<EntityKind> {
        EntityKind::new(APP_LABEL, "product")
    }

    pub fn collection() -> CatalogResult<EntityKind> {
        EntityKind::new(APP_LABEL, "collection")
    }

    pub fn customer() -> CatalogResult<EntityKind> {
        EntityKind::new(APP_LABEL, "customer")
    }

    pub fn order() -> CatalogResult<EntityKind> {
        EntityKind::new(APP_LABEL, "order")
    }

    pub fn cart() -> CatalogResult<EntityKind> {
        EntityKind::new(APP_LABEL, "cart")
    }
}

/// One repository per taggable store entity.
#[derive(Debug, Default)]
pub struct Storefront {
    pub products: Arc<Repository<Product>>,
    pub collections: Arc<Repository<Collection>>,
    pub customers: Arc<Repository<Customer>>,
    pub orders: Arc<Repository<Order>>,
    pub carts: Arc<Repository<Cart>>,
}

impl Storefront {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every store kind, resolved by this storefront's repositories.
    pub fn register(&self, builder: EntityCatalogBuilder) -> CatalogResult<EntityCatalogBuilder> {
        builder
            .register::<Product>(kinds::product()?, self.products.clone())?
            .register::<Collection>(kinds::collection()?, self.collections.clone())?
            .register::<Customer>(kinds::customer()?, self.customers.clone())?
            .register::<Order>(kinds::order()?, self.orders.clone())?
            .register::<Cart>(kinds::cart()?, self.carts.clone())
    }

    /// Like [`Storefront::register`], leaving out `skip`.
    pub fn register_except(
        &self,
        builder: EntityCatalogBuilder,
        skip: &EntityKind,
    ) -> CatalogResult<EntityCatalogBuilder> {
        let mut builder = builder;
        if &kinds::product()? != skip {
            builder = builder.register::<Product>(kinds::product()?, self.products.clone())?;
        }
        if &kinds::collection()? != skip {
            builder =
                builder.register::<Collection>(kinds::collection()?, self.collections.clone())?;
        }
        if &kinds::customer()? != skip {
            builder = builder.register::<Customer>(kinds::customer()?, self.customers.clone())?;
        }
        if &kinds::order()? != skip {
            builder = builder.register::<Order>(kinds::order()?, self.orders.clone())?;
        }
        if &kinds::cart()? != skip {
            builder = builder.register::<Cart>(kinds::cart()?, self.carts.clone())?;
        }
        Ok(builder)
    }

    /// Small sample catalogue: two collections, three products, one customer
    /// with one order, one cart.
    pub fn seed(&self) -> StorefrontResult<()> {
        self.collections.insert(Collection::new(1, "Bakery"))?;
        self.collections.insert(Collection::new(3, "Beverages"))?;

        self.products.insert(
            Product::new(1, "Sourdough Loaf", 1)
                .with_price_cents(650)
                .with_inventory(12),
        )?;
        self.products.insert(
            Product::new(7, "Calabrese Baguette", 1)
                .with_price_cents(325)
                .with_inventory(4),
        )?;
        self.products.insert(
            Product::new(9, "Cold Brew Coffee", 3)
                .with_price_cents(499)
                .with_inventory(30),
        )?;

        self.customers.insert(
            Customer::new(1, "Tina", "Berger", "tina@example.com")
                .with_membership(Membership::Gold),
        )?;
        self.orders.insert(Order::new(1, 1))?;
        self.carts.insert(Cart { id: 1 })?;
        Ok(())
    }
}
