//! End-to-end tagging over the store entities.

use futures::TryStreamExt;
use std::sync::Arc;
use storefront::{kinds, Customer, Order, Product, Storefront};
use tagging::{
    CatalogError, EntityCatalog, InMemoryTagStorage, ResolvedEntity, TagError, TagStore,
};

fn make_store(storefront: &Storefront) -> TagStore {
    let catalog = storefront
        .register(EntityCatalog::builder())
        .expect("catalog registration")
        .build();
    TagStore::new(Arc::new(InMemoryTagStorage::new()), Arc::new(catalog))
}

fn seeded() -> (Storefront, TagStore) {
    let storefront = Storefront::new();
    storefront.seed().expect("seed");
    let store = make_store(&storefront);
    (storefront, store)
}

async fn collect(
    store: &TagStore,
    tag: tagging::TagId,
    kind: &tagging::EntityKind,
) -> Vec<ResolvedEntity> {
    store
        .entities_for(tag, kind)
        .await
        .expect("entities_for")
        .try_collect()
        .await
        .expect("resolution")
}

#[tokio::test]
async fn test_deleted_product_keeps_dangling_tag() {
    let (storefront, store) = seeded();
    let product = kinds::product().unwrap();

    let sale = store.create_tag("sale").await.unwrap();
    assert_eq!(sale.id.0, 1);
    store.apply(sale.id, product.clone(), 7).await.unwrap();

    let labels: Vec<_> = store
        .tags_for(&product, 7)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.label)
        .collect();
    assert_eq!(labels, vec!["sale"]);

    storefront.products.delete(7).unwrap();

    let labels: Vec<_> = store
        .tags_for(&product, 7)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.label)
        .collect();
    assert_eq!(labels, vec!["sale"]);
    assert!(collect(&store, sale.id, &product).await.is_empty());
}

#[tokio::test]
async fn test_unregistered_order_kind() {
    let storefront = Storefront::new();
    let catalog = storefront
        .register_except(EntityCatalog::builder(), &kinds::order().unwrap())
        .unwrap()
        .build();

    let err = catalog.kind_of::<Order>().unwrap_err();
    assert!(matches!(err, CatalogError::UnregisteredType { .. }));

    let store = TagStore::new(Arc::new(InMemoryTagStorage::new()), Arc::new(catalog));
    let tag = store.create_tag("priority").await.unwrap();
    let err = store.apply_to(tag.id, &Order::new(1, 1)).await.unwrap_err();
    assert!(matches!(
        err,
        TagError::Catalog(CatalogError::UnregisteredType { .. })
    ));
}

#[tokio::test]
async fn test_apply_adds_exactly_one_occurrence() {
    let (_storefront, store) = seeded();
    let customer = kinds::customer().unwrap();
    let vip = store.create_tag("vip").await.unwrap();

    for expected in 1..=3 {
        store.apply(vip.id, customer.clone(), 1).await.unwrap();
        let count = store
            .tags_for(&customer, 1)
            .await
            .unwrap()
            .iter()
            .filter(|t| t.id == vip.id)
            .count();
        assert_eq!(count, expected);
    }
}

#[tokio::test]
async fn test_tag_delete_cascades_across_kinds() {
    let (_storefront, store) = seeded();
    let product = kinds::product().unwrap();
    let order = kinds::order().unwrap();
    let cart = kinds::cart().unwrap();

    let seasonal = store.create_tag("seasonal").await.unwrap();
    let keep = store.create_tag("keep").await.unwrap();
    store.apply(seasonal.id, product.clone(), 1).await.unwrap();
    store.apply(seasonal.id, product.clone(), 9).await.unwrap();
    store.apply(seasonal.id, order.clone(), 1).await.unwrap();
    store.apply(seasonal.id, cart.clone(), 1).await.unwrap();
    store.apply(keep.id, cart.clone(), 1).await.unwrap();

    assert_eq!(store.delete_tag(seasonal.id).await.unwrap(), 4);

    assert!(store.tags_for(&product, 1).await.unwrap().is_empty());
    assert!(store.tags_for(&product, 9).await.unwrap().is_empty());
    assert!(store.tags_for(&order, 1).await.unwrap().is_empty());
    let cart_tags = store.tags_for(&cart, 1).await.unwrap();
    assert_eq!(cart_tags.len(), 1);
    assert_eq!(cart_tags[0].id, keep.id);
}

#[tokio::test]
async fn test_entities_for_filters_by_kind_and_downcasts() {
    let (_storefront, store) = seeded();
    let product = kinds::product().unwrap();
    let customer = kinds::customer().unwrap();

    let featured = store.create_tag("featured").await.unwrap();
    store.apply(featured.id, product.clone(), 9).await.unwrap();
    store.apply(featured.id, customer.clone(), 1).await.unwrap();
    store.apply(featured.id, product.clone(), 1).await.unwrap();
    // Product 42 was never inserted.
    store.apply(featured.id, product.clone(), 42).await.unwrap();

    let products = collect(&store, featured.id, &product).await;
    let titles: Vec<_> = products
        .iter()
        .map(|e| e.downcast_ref::<Product>().unwrap().title.clone())
        .collect();
    assert_eq!(titles, vec!["Cold Brew Coffee", "Sourdough Loaf"]);

    let customers = collect(&store, featured.id, &customer).await;
    assert_eq!(customers.len(), 1);
    assert_eq!(
        customers[0].downcast_ref::<Customer>().unwrap().email,
        "tina@example.com"
    );
}

#[tokio::test]
async fn test_bindings_for_lists_inline_rows() {
    let (_storefront, store) = seeded();
    let product = kinds::product().unwrap();

    let sale = store.create_tag("sale").await.unwrap();
    let new = store.create_tag("new").await.unwrap();
    let first = store.apply(new.id, product.clone(), 1).await.unwrap();
    let second = store.apply(sale.id, product.clone(), 1).await.unwrap();

    let rows = store.bindings_for(&product, 1).await.unwrap();
    let ids: Vec<_> = rows.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![first, second]);
    assert!(rows.iter().all(|b| b.targets(&product, 1)));

    store.remove(first).await.unwrap();
    assert!(matches!(
        store.remove(first).await,
        Err(TagError::BindingNotFound { .. })
    ));
    assert_eq!(store.bindings_for(&product, 1).await.unwrap().len(), 1);
}
