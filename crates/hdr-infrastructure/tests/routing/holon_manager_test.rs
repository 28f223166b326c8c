//! Holon manager integration tests: failover reads, child loading and
//! replicated saves

use crate::test_utils::*;
use hdr_domain::entities::{Holon, HolonFilter, HolonKey, HolonType, MetadataQuery};
use hdr_domain::error::Error;
use hdr_domain::value_objects::{PlanType, ProviderType};
use hdr_infrastructure::LoadOptions;
use hdr_providers::InMemoryHolonProvider;
use std::sync::Arc;

/// parent -> two children -> one grandchild under the first child
fn three_levels() -> (Holon, Vec<Holon>) {
    let (parent, mut rest) = family(2);
    let grandchild = Holon::new("grandchild", HolonType::Quest).with_parent(rest[0].id);
    rest.push(grandchild);
    (parent, rest)
}

/// Test that a load maps metadata and snapshots the mapped holon
#[tokio::test]
async fn test_load_maps_metadata_into_baseline() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::MongoDb]);
    let holon = Holon::new("mapped", HolonType::Holon)
        .with_metadata("description", "from metadata");
    stores[0].insert(holon.clone());

    let outcome = context
        .holons()
        .load_holon(HolonKey::Id(holon.id), &LoadOptions::default())
        .await
        .expect("loaded");

    let loaded = outcome.value;
    assert_eq!(loaded.provider, ProviderType::MongoDb);
    assert_eq!(loaded.holon.description, "from metadata");
    assert_eq!(loaded.original.holon().description, "from metadata");
    assert!(!loaded.is_dirty());

    let mut edited = loaded.clone();
    edited.holon.name = "renamed".to_string();
    assert_eq!(edited.changed_fields(), vec!["name"]);
}

/// Test that children load recursively by default
#[tokio::test]
async fn test_children_loaded_recursively() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::MongoDb]);
    let (parent, descendants) = three_levels();
    stores[0].insert(parent.clone());
    for holon in descendants {
        stores[0].insert(holon);
    }

    let outcome = context
        .holons()
        .load_holon(HolonKey::Id(parent.id), &LoadOptions::default())
        .await
        .expect("loaded");

    assert!(!outcome.is_warning());
    let tree = &outcome.value.holon;
    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.descendant_count(), 3);
    assert_eq!(tree.children[0].children[0].name, "grandchild");
    assert!(outcome.value.original.holon().children.is_empty());
}

/// Test the depth limit and the non-recursive and child-free options
#[tokio::test]
async fn test_child_depth_options() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::MongoDb]);
    let (parent, descendants) = three_levels();
    stores[0].insert(parent.clone());
    for holon in descendants {
        stores[0].insert(holon);
    }
    let holons = context.holons();
    let key = HolonKey::Id(parent.id);

    let shallow = holons
        .load_holon(key.clone(), &LoadOptions::default().max_depth(1))
        .await
        .expect("loaded");
    assert_eq!(shallow.value.holon.descendant_count(), 2);

    let flat = LoadOptions {
        recursive: false,
        ..LoadOptions::default()
    };
    let direct = holons.load_holon(key.clone(), &flat).await.expect("loaded");
    assert_eq!(direct.value.holon.descendant_count(), 2);

    let bare = holons
        .load_holon(key, &LoadOptions::default().without_children())
        .await
        .expect("loaded");
    assert!(bare.value.holon.children.is_empty());
}

/// Test that a child load failure becomes a warning on the parent
#[tokio::test]
async fn test_child_failure_is_warning() {
    let context = create_test_context(test_config());
    let (parent, children) = family(2);
    let store = InMemoryHolonProvider::new(ProviderType::MongoDb)
        .with_holons(std::iter::once(parent.clone()).chain(children));
    context
        .router()
        .register_provider(STORAGE, Arc::new(ChildFailureProvider::new(store, [parent.id])))
        .expect("register");

    let outcome = context
        .holons()
        .load_holon(HolonKey::Id(parent.id), &LoadOptions::default())
        .await
        .expect("parent still returned");

    assert!(outcome.is_warning());
    assert_eq!(outcome.value.holon.id, parent.id);
    assert!(outcome.value.holon.children.is_empty());
}

/// Test that strict loads refuse to return a parent without its children
#[tokio::test]
async fn test_strict_child_failure_is_partial_load() {
    let context = create_test_context(test_config());
    let (parent, children) = family(1);
    let store = InMemoryHolonProvider::new(ProviderType::MongoDb)
        .with_holons(std::iter::once(parent.clone()).chain(children));
    context
        .router()
        .register_provider(STORAGE, Arc::new(ChildFailureProvider::new(store, [parent.id])))
        .expect("register");

    let err = context
        .holons()
        .load_holon(HolonKey::Id(parent.id), &LoadOptions::default().strict())
        .await
        .expect_err("strict");

    assert!(matches!(err, Error::PartialLoad { .. }));
}

/// Test that a holon appearing twice in the tree is skipped with a warning
#[tokio::test]
async fn test_cyclic_tree_terminates() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::MongoDb]);
    let mut first = Holon::new("first", HolonType::Holon);
    let second = Holon::new("second", HolonType::Holon).with_parent(first.id);
    first.parent_id = Some(second.id);
    stores[0].insert(first.clone());
    stores[0].insert(second);

    let outcome = context
        .holons()
        .load_holon(HolonKey::Id(first.id), &LoadOptions::default())
        .await
        .expect("loaded");

    assert_eq!(outcome.value.holon.descendant_count(), 1);
    assert!(outcome.warnings.iter().any(|w| w.contains("appears twice")));
}

/// Test that reads fail over from the current provider down the list
#[tokio::test]
async fn test_load_fails_over() {
    let mut config = test_config();
    config.routing.auto_failover_providers = vec![ProviderType::MongoDb, ProviderType::Ipfs];
    let context = create_test_context(config);
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ipfs]);
    let holon = Holon::new("elsewhere", HolonType::Holon);
    stores[1].insert(holon.clone());
    stores[0].set_available(false);

    let outcome = context
        .holons()
        .load_holon(HolonKey::Id(holon.id), &LoadOptions::default().without_children())
        .await
        .expect("served by the second provider");

    assert_eq!(outcome.value.provider, ProviderType::Ipfs);
    assert_eq!(context.registry().current(STORAGE), ProviderType::MongoDb);
}

/// Test that a read with nowhere left to go reports every provider tried
#[tokio::test]
async fn test_load_all_failed() {
    let mut config = test_config();
    config.routing.auto_failover_providers = vec![ProviderType::Ipfs];
    let context = create_test_context(config);
    register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ipfs]);

    let err = context
        .holons()
        .load_holon(HolonKey::Id(uuid::Uuid::new_v4()), &LoadOptions::default())
        .await
        .expect_err("missing everywhere");

    assert!(matches!(
        err,
        Error::AllProvidersFailed { ref attempted, .. }
            if attempted == &[ProviderType::MongoDb, ProviderType::Ipfs]
    ));
}

/// Test that reads never fail over to a provider the plan does not allow
#[tokio::test]
async fn test_load_skips_disallowed_failover() {
    let mut config = test_config();
    config.subscription.plan_type = PlanType::Free;
    config.routing.auto_failover_providers = vec![ProviderType::Ethereum];
    let context = create_test_context(config);
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ethereum]);
    let holon = Holon::new("on chain", HolonType::Holon);
    stores[1].insert(holon.clone());

    let err = context
        .holons()
        .load_holon(HolonKey::Id(holon.id), &LoadOptions::default().without_children())
        .await
        .expect_err("only a paid provider has it");

    assert!(matches!(
        err,
        Error::AllProvidersFailed { ref attempted, .. }
            if attempted == &[ProviderType::MongoDb]
    ));
    assert_eq!(stores[1].call_count(), 0);
}

/// Test that a read pinned to a disallowed provider never reaches it
#[tokio::test]
async fn test_load_from_disallowed_provider() {
    let mut config = test_config();
    config.subscription.plan_type = PlanType::Free;
    let context = create_test_context(config);
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ethereum]);
    let holon = Holon::new("on chain", HolonType::Holon);
    stores[1].insert(holon.clone());

    let options = LoadOptions::default().without_children().from_provider(ProviderType::Ethereum);
    let err = context
        .holons()
        .load_holon(HolonKey::Id(holon.id), &options)
        .await
        .expect_err("plan forbids the provider");

    assert!(matches!(
        err,
        Error::AllProvidersFailed { ref attempted, .. } if attempted.is_empty()
    ));
    assert_eq!(stores[1].call_count(), 0);
    assert_eq!(stores[0].call_count(), 0);
}

/// Test that a list load is held to the plan as well
#[tokio::test]
async fn test_list_load_skips_disallowed_failover() {
    let mut config = test_config();
    config.subscription.plan_type = PlanType::Free;
    config.routing.auto_failover_providers = vec![ProviderType::Ethereum, ProviderType::Ipfs];
    let context = create_test_context(config);
    let stores = register_memory(
        &context,
        &[ProviderType::MongoDb, ProviderType::Ethereum, ProviderType::Ipfs],
    );
    let (parent, children) = family(2);
    for child in &children {
        stores[1].insert(child.clone());
        stores[2].insert(child.clone());
    }
    stores[0].set_available(false);

    let outcome = context
        .holons()
        .load_holons_for_parent(
            HolonKey::Id(parent.id),
            HolonFilter::default(),
            &LoadOptions::default().without_children(),
        )
        .await
        .expect("served by the free provider");

    assert_eq!(outcome.value.len(), 2);
    assert!(outcome.value.iter().all(|h| h.provider == ProviderType::Ipfs));
    assert_eq!(stores[1].call_count(), 0);
}

/// Test list loads by parent and by metadata
#[tokio::test]
async fn test_list_loads() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::MongoDb]);
    let (parent, children) = family(3);
    stores[0].insert(parent.clone());
    for child in children {
        stores[0].insert(child.with_metadata("team", "routing"));
    }
    let holons = context.holons();

    let by_parent = holons
        .load_holons_for_parent(
            HolonKey::Id(parent.id),
            HolonFilter::default(),
            &LoadOptions::default(),
        )
        .await
        .expect("children");
    assert_eq!(by_parent.value.len(), 3);
    assert!(by_parent.value.iter().all(|h| h.provider == ProviderType::MongoDb));

    let by_metadata = holons
        .load_holons_by_metadata(
            MetadataQuery::single("team", "routing"),
            &LoadOptions::default().without_children(),
        )
        .await
        .expect("matches");
    assert_eq!(by_metadata.value.len(), 3);
}

/// Test that saves copy to the replication list and report replica failures
#[tokio::test]
async fn test_save_replicates_with_warnings() {
    let mut config = test_config();
    config.routing.auto_replication_enabled = true;
    config.routing.auto_replication_providers =
        vec![ProviderType::MongoDb, ProviderType::Ipfs, ProviderType::Holo];
    let context = create_test_context(config);
    let stores = register_memory(
        &context,
        &[ProviderType::MongoDb, ProviderType::Ipfs, ProviderType::Holo],
    );
    stores[2].set_available(false);
    let holon = Holon::new("saved", HolonType::Holon);

    let outcome = context
        .holons()
        .save_holon(holon.clone(), ProviderType::MongoDb)
        .await
        .expect("primary save");

    assert_eq!(outcome.value.id, holon.id);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("HoloOASIS"));
    assert_eq!(stores[0].len(), 1);
    assert_eq!(stores[1].len(), 1);
    assert!(stores[2].is_empty());
}

/// Test that a save without replication touches only the serving provider
#[tokio::test]
async fn test_save_without_replication() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ipfs]);

    let outcome = context
        .holons()
        .save_holon(Holon::new("single", HolonType::Holon), ProviderType::Ipfs)
        .await
        .expect("saved");

    assert!(!outcome.is_warning());
    assert!(stores[0].is_empty());
    assert_eq!(stores[1].len(), 1);
}
