//! Composition root tests

use crate::test_utils::*;
use hdr_domain::error::Error;
use hdr_domain::value_objects::ProviderType;
use hdr_infrastructure::di::init_app;
use hdr_infrastructure::routing::AutoList;

#[test]
fn test_init_app_applies_routing_config() {
    let mut config = test_config();
    config.routing.auto_failover_providers = vec![ProviderType::Ipfs, ProviderType::MongoDb];
    config.routing.auto_replication_enabled = true;
    config.routing.auto_replication_providers = vec![ProviderType::Holo];

    let context = create_test_context(config);
    let registry = context.registry();

    assert_eq!(
        registry.list(STORAGE, AutoList::Failover),
        vec![ProviderType::Ipfs, ProviderType::MongoDb]
    );
    assert_eq!(registry.list(STORAGE, AutoList::Replication), vec![ProviderType::Holo]);
    assert!(registry.is_enabled(AutoList::Replication));
    assert!(registry.list_available(None).is_empty());
}

#[test]
fn test_init_app_rejects_invalid_config() {
    let mut config = test_config();
    config.optimization.jitter = 2.0;

    let err = init_app(config).expect_err("invalid jitter");
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_services_share_one_registry() {
    let context = create_test_context(test_config());
    register_memory(&context, &[ProviderType::MongoDb]);

    assert!(context.router().registry().is_registered(ProviderType::MongoDb, Some(STORAGE)));
    assert!(context.registry().is_registered(ProviderType::MongoDb, None));
    assert!(format!("{context:?}").contains("AppContext"));
}
