//! Scripted walkthrough of tagging against the sample storefront.

use futures::TryStreamExt;
use std::sync::Arc;
use storefront::{kinds, Order, Product, Storefront, StorefrontError};
use tagging::{
    CatalogError, EntityCatalog, InMemoryTagStorage, ResolvedEntity, TagError, TagStore,
    TaggingConfig,
};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error("Tagging failed: {0}")]
    Tag(#[from] TagError),

    #[error("Catalog setup failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Storefront failed: {0}")]
    Storefront(#[from] StorefrontError),

    #[error("Unexpected outcome: {message}")]
    Unexpected { message: String },
}

pub type DemoResult<T> = Result<T, DemoError>;

/// Build the catalog for a storefront with every store kind registered.
pub fn build_catalog(storefront: &Storefront) -> DemoResult<Arc<EntityCatalog>> {
    Ok(Arc::new(
        storefront.register(EntityCatalog::builder())?.build(),
    ))
}

fn label_list(tags: &[tagging::Tag]) -> String {
    let labels: Vec<_> = tags.iter().map(|t| format!("{:?}", t.label)).collect();
    format!("[{}]", labels.join(", "))
}

fn entity_list(entities: &[ResolvedEntity]) -> String {
    let labels: Vec<_> = entities
        .iter()
        .map(|e| format!("{}#{} {:?}", e.kind, e.id(), e.label()))
        .collect();
    format!("[{}]", labels.join(", "))
}

/// Run the walkthrough and return one line per step.
pub async fn run(config: TaggingConfig) -> DemoResult<Vec<String>> {
    let mut steps = Vec::new();

    let storefront = Storefront::new();
    storefront.seed()?;
    let catalog = build_catalog(&storefront)?;
    let store = TagStore::with_config(Arc::new(InMemoryTagStorage::new()), catalog, config);
    let product = kinds::product()?;

    let sale = store.create_tag("sale").await?;
    steps.push(format!("created tag {:?} (id={})", sale.label, sale.id));

    let binding = store.apply(sale.id, product.clone(), 7).await?;
    steps.push(format!("applied {:?} to {product}#7 (binding={binding})", sale.label));

    let tags = store.tags_for_type::<Product>(7).await?;
    steps.push(format!("tags_for({product}, 7) = {}", label_list(&tags)));

    storefront.products.delete(7)?;
    steps.push(format!("deleted {product}#7 from its own table"));

    let tags = store.tags_for(&product, 7).await?;
    steps.push(format!(
        "tags_for({product}, 7) = {} (dangling binding kept)",
        label_list(&tags)
    ));

    let entities: Vec<ResolvedEntity> = store
        .entities_for(sale.id, &product)
        .await?
        .try_collect()
        .await?;
    steps.push(format!(
        "entities_for({}, {product}) = {} (dangling binding skipped)",
        sale.id,
        entity_list(&entities)
    ));

    let removed = store.delete_tag(sale.id).await?;
    steps.push(format!(
        "deleted tag {:?}, cascade removed {removed} binding(s)",
        sale.label
    ));

    let without_orders = Storefront::new()
        .register_except(EntityCatalog::builder(), &kinds::order()?)?
        .build();
    match without_orders.kind_of::<Order>() {
        Err(e @ CatalogError::UnregisteredType { .. }) => {
            steps.push(format!("catalog without orders: kind_of(Order) -> {e}"));
        }
        other => {
            return Err(DemoError::Unexpected {
                message: format!("kind_of(Order) returned {other:?}"),
            });
        }
    }

    info!(steps = steps.len(), "demo finished");
    Ok(steps)
}
