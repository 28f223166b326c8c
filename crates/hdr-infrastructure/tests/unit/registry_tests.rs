//! Tests for the provider registry

use hdr_domain::error::Error;
use hdr_domain::ports::HolonProvider;
use hdr_domain::value_objects::{ProviderCategory, ProviderType};
use hdr_infrastructure::routing::{AutoList, ProviderInstance, ProviderRegistry};
use hdr_providers::InMemoryHolonProvider;
use std::sync::Arc;

const STORAGE: ProviderCategory = ProviderCategory::Storage;

fn instance(id: ProviderType) -> ProviderInstance {
    Arc::new(InMemoryHolonProvider::new(id))
}

fn registry_with(ids: &[ProviderType]) -> ProviderRegistry {
    let registry = ProviderRegistry::new();
    for id in ids {
        registry.register(STORAGE, *id, instance(*id));
    }
    registry
}

/// Test that registration keeps order and lookups resolve the instance
#[test]
fn test_register_and_get() {
    let registry = registry_with(&[ProviderType::MongoDb, ProviderType::Ipfs]);

    assert_eq!(
        registry.list_available(Some(STORAGE)),
        vec![ProviderType::MongoDb, ProviderType::Ipfs]
    );
    let ipfs = registry.get(STORAGE, ProviderType::Ipfs).expect("ipfs registered");
    assert_eq!(ipfs.provider_type(), ProviderType::Ipfs);
    assert!(matches!(
        registry.get(STORAGE, ProviderType::Neo4j),
        Err(Error::NotFound { .. })
    ));
}

/// Test that re-registering replaces the instance without moving it
#[test]
fn test_reregister_overwrites_in_place() {
    let registry = registry_with(&[ProviderType::MongoDb, ProviderType::Ipfs]);
    registry.register(STORAGE, ProviderType::MongoDb, instance(ProviderType::MongoDb));

    assert_eq!(
        registry.list_available(Some(STORAGE)),
        vec![ProviderType::MongoDb, ProviderType::Ipfs]
    );
}

/// Test that the Default placeholder can never be registered
#[test]
fn test_default_registration_ignored() {
    let registry = ProviderRegistry::new();
    registry.register(STORAGE, ProviderType::Default, instance(ProviderType::MongoDb));

    assert!(registry.list_available(None).is_empty());
    assert!(!registry.is_registered(ProviderType::Default, None));
}

/// Test that the all-categories view is a de-duplicated union
#[test]
fn test_list_available_union_across_categories() {
    let registry = registry_with(&[ProviderType::MongoDb, ProviderType::Ipfs]);
    registry.register(ProviderCategory::Network, ProviderType::Ipfs, instance(ProviderType::Ipfs));
    registry.register(ProviderCategory::Network, ProviderType::Holo, instance(ProviderType::Holo));

    assert_eq!(
        registry.list_available(None),
        vec![ProviderType::MongoDb, ProviderType::Ipfs, ProviderType::Holo]
    );
    assert!(registry.is_registered(ProviderType::Holo, None));
    assert!(!registry.is_registered(ProviderType::Holo, Some(STORAGE)));
    assert!(registry.list_available(Some(ProviderCategory::Search)).is_empty());
}

/// Test that a Default lookup resolves through the current pointer
#[test]
fn test_get_default_resolves_current() {
    let registry = registry_with(&[ProviderType::MongoDb, ProviderType::Ipfs]);
    assert!(registry.get(STORAGE, ProviderType::Default).is_err());

    let previous = registry
        .switch_current(STORAGE, ProviderType::Ipfs)
        .expect("switch");
    assert_eq!(previous, ProviderType::Default);

    let resolved = registry.get(STORAGE, ProviderType::Default).expect("resolved");
    assert_eq!(resolved.provider_type(), ProviderType::Ipfs);
}

/// Test that switching to an unregistered provider is rejected
#[test]
fn test_switch_current_requires_registration() {
    let registry = registry_with(&[ProviderType::MongoDb]);

    assert!(registry.switch_current(STORAGE, ProviderType::Neo4j).is_err());
    assert_eq!(registry.current(STORAGE), ProviderType::Default);
}

/// Test that removing the current provider resets the pointer
#[test]
fn test_unregister_resets_current() {
    let registry = registry_with(&[ProviderType::MongoDb, ProviderType::Ipfs]);
    registry
        .switch_current(STORAGE, ProviderType::MongoDb)
        .expect("switch");

    assert!(registry.unregister(STORAGE, ProviderType::MongoDb));
    assert!(!registry.unregister(STORAGE, ProviderType::MongoDb));
    assert_eq!(registry.current(STORAGE), ProviderType::Default);
    assert_eq!(registry.list_available(Some(STORAGE)), vec![ProviderType::Ipfs]);
}

/// Test that list replacement drops duplicates and Default but keeps order
#[test]
fn test_set_list_cleans_input() {
    let registry = ProviderRegistry::new();
    registry.set_auto_failover_list(
        STORAGE,
        &[
            ProviderType::Ipfs,
            ProviderType::Default,
            ProviderType::MongoDb,
            ProviderType::Ipfs,
        ],
    );

    assert_eq!(
        registry.list(STORAGE, AutoList::Failover),
        vec![ProviderType::Ipfs, ProviderType::MongoDb]
    );
    assert!(registry.list(STORAGE, AutoList::Replication).is_empty());
}

/// Test that add and remove report whether the list changed
#[test]
fn test_add_and_remove_list_entries() {
    let registry = ProviderRegistry::new();

    assert!(registry.add_to_list(STORAGE, AutoList::Replication, ProviderType::Holo));
    assert!(!registry.add_to_list(STORAGE, AutoList::Replication, ProviderType::Holo));
    assert!(!registry.add_to_list(STORAGE, AutoList::Replication, ProviderType::Default));
    assert!(registry.remove_from_list(STORAGE, AutoList::Replication, ProviderType::Holo));
    assert!(!registry.remove_from_list(STORAGE, AutoList::Replication, ProviderType::Holo));
}

/// Test the auto feature defaults and toggles
#[test]
fn test_feature_flags() {
    let registry = ProviderRegistry::new();
    assert!(registry.is_enabled(AutoList::Failover));
    assert!(registry.is_enabled(AutoList::LoadBalance));
    assert!(!registry.is_enabled(AutoList::Replication));

    registry.set_enabled(AutoList::Replication, true);
    registry.set_enabled(AutoList::Failover, false);
    assert!(registry.is_enabled(AutoList::Replication));
    assert!(!registry.is_enabled(AutoList::Failover));
}

/// Test that nested pins override lookups and unwind to the current pointer
#[test]
fn test_nested_pins_restore() {
    let registry = registry_with(&[ProviderType::MongoDb, ProviderType::Ipfs, ProviderType::Holo]);
    registry
        .switch_current(STORAGE, ProviderType::MongoDb)
        .expect("switch");

    {
        let outer = registry.pin(STORAGE, ProviderType::Ipfs);
        assert_eq!(outer.previous(), ProviderType::MongoDb);
        assert_eq!(registry.effective(STORAGE), ProviderType::Ipfs);
        assert_eq!(registry.current(STORAGE), ProviderType::MongoDb);
        {
            let inner = registry.pin(STORAGE, ProviderType::Holo);
            assert_eq!(inner.previous(), ProviderType::Ipfs);
            let resolved = registry.get(STORAGE, ProviderType::Default).expect("pinned");
            assert_eq!(resolved.provider_type(), ProviderType::Holo);
        }
        assert_eq!(registry.effective(STORAGE), ProviderType::Ipfs);
    }
    assert_eq!(registry.effective(STORAGE), ProviderType::MongoDb);
}

/// Test that pins released out of order each remove only themselves
#[test]
fn test_interleaved_pins_release_their_own() {
    let registry = registry_with(&[ProviderType::MongoDb, ProviderType::Ipfs, ProviderType::Holo]);
    registry
        .switch_current(STORAGE, ProviderType::MongoDb)
        .expect("switch");

    let first = registry.pin(STORAGE, ProviderType::Ipfs);
    let second = registry.pin(STORAGE, ProviderType::Holo);
    drop(first);
    assert_eq!(registry.effective(STORAGE), ProviderType::Holo);
    drop(second);

    assert_eq!(registry.effective(STORAGE), ProviderType::MongoDb);
    assert_eq!(registry.current(STORAGE), ProviderType::MongoDb);
}

/// Test that pinning Default leaves resolution untouched
#[test]
fn test_pin_default_is_noop() {
    let registry = registry_with(&[ProviderType::MongoDb]);
    registry
        .switch_current(STORAGE, ProviderType::MongoDb)
        .expect("switch");

    let _pin = registry.pin(STORAGE, ProviderType::Default);
    assert_eq!(registry.effective(STORAGE), ProviderType::MongoDb);
}

/// Test that readers never observe a torn table while writers mutate it
#[test]
fn test_reads_during_concurrent_writes() {
    let registry = registry_with(&[ProviderType::MongoDb]);
    let failover = [ProviderType::Ipfs, ProviderType::MongoDb];

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..200 {
                registry.register(STORAGE, ProviderType::Ipfs, instance(ProviderType::Ipfs));
                registry.set_auto_failover_list(STORAGE, &failover);
                registry.unregister(STORAGE, ProviderType::Ipfs);
            }
        });
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let available = registry.list_available(Some(STORAGE));
                    assert_eq!(available.first(), Some(&ProviderType::MongoDb));
                    assert!(available.len() <= 2);
                    assert!(registry.get(STORAGE, ProviderType::MongoDb).is_ok());
                }
            });
        }
    });

    assert_eq!(registry.list_available(Some(STORAGE)), vec![ProviderType::MongoDb]);
}

/// Test that the snapshot reflects pointers and lists
#[test]
fn test_snapshot() {
    let registry = registry_with(&[ProviderType::MongoDb, ProviderType::Ipfs]);
    registry
        .switch_current(STORAGE, ProviderType::Ipfs)
        .expect("switch");
    registry.set_auto_replication_list(STORAGE, &[ProviderType::MongoDb]);

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].category, STORAGE);
    assert_eq!(snapshot[0].current, ProviderType::Ipfs);
    assert_eq!(snapshot[0].registered.len(), 2);
    assert_eq!(snapshot[0].auto_replication, vec![ProviderType::MongoDb]);
}
