//! Router integration tests: selection, failover, quotas and replication

use crate::test_utils::*;
use futures::future::join_all;
use hdr_domain::entities::{Holon, HolonKey, HolonType};
use hdr_domain::error::Error;
use hdr_domain::ports::UsageTracker;
use hdr_domain::value_objects::{
    LoadBalancingStrategy, OperationClass, PlanType, ProviderType, RequestKind,
};
use hdr_infrastructure::di::init_app_with_usage;
use hdr_infrastructure::routing::{
    AutoList, HolonOperation, InMemoryUsageTracker, RoutingRequest,
};
use hdr_providers::InMemoryHolonProvider;
use std::sync::Arc;
use std::time::Duration;

fn stored_holon(stores: &[InMemoryHolonProvider]) -> Holon {
    let holon = Holon::new("shared", HolonType::Holon);
    for store in stores {
        store.insert(holon.clone());
    }
    holon
}

fn load(holon: &Holon) -> RoutingRequest {
    RoutingRequest::new(HolonOperation::Load(HolonKey::Id(holon.id))).in_category(STORAGE)
}

fn save(holon: &Holon) -> RoutingRequest {
    RoutingRequest::new(HolonOperation::Save(holon.clone())).in_category(STORAGE)
}

/// Test that a free plan never touches a paid provider, whatever the strategy
#[tokio::test]
async fn test_free_plan_never_routes_to_paid_provider() {
    let mut config = test_config();
    config.subscription.plan_type = PlanType::Free;
    let context = create_test_context(config);
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ethereum]);
    let holon = stored_holon(&stores);
    let router = context.router();

    for strategy in LoadBalancingStrategy::ALL {
        for _ in 0..3 {
            let request = load(&holon).prefer(ProviderType::Ethereum);
            let routed = router.route(request, strategy).await.expect("routed");
            assert_eq!(routed.provider, ProviderType::MongoDb, "{strategy}");
        }
    }
    assert_eq!(stores[1].call_count(), 0);
}

/// Test that a plan with no allowed provider reports no eligible provider
#[tokio::test]
async fn test_no_eligible_provider() {
    let mut config = test_config();
    config.subscription.plan_type = PlanType::Free;
    let context = create_test_context(config);
    let holon = Holon::new("nowhere", HolonType::Holon);

    let err = context
        .router()
        .route(load(&holon), LoadBalancingStrategy::Auto)
        .await
        .expect_err("nothing registered");
    assert!(matches!(err, Error::NoEligibleProvider { .. }));

    register_memory(&context, &[ProviderType::Ethereum]);
    let err = context
        .router()
        .route(load(&holon), LoadBalancingStrategy::Auto)
        .await
        .expect_err("only a paid provider");
    assert!(matches!(err, Error::NoEligibleProvider { .. }));
}

/// Test that the preferred provider is tried first when eligible
#[tokio::test]
async fn test_preferred_provider_served() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Holo]);
    let holon = stored_holon(&stores);

    let routed = context
        .router()
        .route(load(&holon).prefer(ProviderType::Holo), LoadBalancingStrategy::Performance)
        .await
        .expect("routed");

    assert_eq!(routed.provider, ProviderType::Holo);
    assert_eq!(routed.attempted, vec![ProviderType::Holo]);
    assert!(!routed.is_warning());
    assert_eq!(routed.value.into_holon().expect("single holon").id, holon.id);
}

/// Test that an unavailable provider fails over down the list
#[tokio::test]
async fn test_failover_to_next_provider() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ipfs]);
    let holon = stored_holon(&stores);
    context
        .router()
        .set_auto_failover_list(STORAGE, &[ProviderType::MongoDb, ProviderType::Ipfs]);
    stores[0].set_available(false);

    let routed = context
        .router()
        .route(load(&holon).prefer(ProviderType::MongoDb), LoadBalancingStrategy::Auto)
        .await
        .expect("failed over");

    assert_eq!(routed.provider, ProviderType::Ipfs);
    assert_eq!(routed.attempted, vec![ProviderType::MongoDb, ProviderType::Ipfs]);
    assert_eq!(context.quota().usage(OperationClass::Failovers), 1);
    let mongo = context.monitor().metrics(ProviderType::MongoDb).expect("tracked");
    assert_eq!(mongo.failed_requests, 1);
    assert_eq!(context.predictive().failure_history(ProviderType::MongoDb).len(), 1);
}

/// Test that failover tries every candidate once and reports them all
#[tokio::test]
async fn test_failover_visits_each_candidate_once() {
    let context = create_test_context(test_config());
    let stores = register_memory(
        &context,
        &[ProviderType::MongoDb, ProviderType::Holo, ProviderType::Ipfs],
    );
    let holon = stored_holon(&stores);
    context.router().set_auto_failover_list(
        STORAGE,
        &[ProviderType::Holo, ProviderType::MongoDb, ProviderType::Ipfs],
    );
    for store in &stores {
        store.set_available(false);
    }

    let err = context
        .router()
        .route(load(&holon).prefer(ProviderType::MongoDb), LoadBalancingStrategy::Auto)
        .await
        .expect_err("everything down");

    match err {
        Error::AllProvidersFailed { attempted, .. } => assert_eq!(
            attempted,
            vec![ProviderType::MongoDb, ProviderType::Holo, ProviderType::Ipfs]
        ),
        other => panic!("Expected AllProvidersFailed, got {other:?}"),
    }
}

/// Test that disabling failover stops after the first attempt
#[tokio::test]
async fn test_failover_disabled() {
    let mut config = test_config();
    config.routing.auto_failover_enabled = false;
    config.routing.auto_failover_providers = vec![ProviderType::MongoDb, ProviderType::Ipfs];
    let context = create_test_context(config);
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ipfs]);
    let holon = stored_holon(&stores);
    stores[0].set_available(false);

    let err = context
        .router()
        .route(load(&holon).prefer(ProviderType::MongoDb), LoadBalancingStrategy::Auto)
        .await
        .expect_err("no failover");

    assert!(matches!(
        err,
        Error::AllProvidersFailed { ref attempted, .. } if attempted == &[ProviderType::MongoDb]
    ));
    assert_eq!(stores[1].call_count(), 0);
}

/// Test that the explicit failover walk starts at the head of the list
#[tokio::test]
async fn test_explicit_failover_walk() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ipfs]);
    let holon = stored_holon(&stores);
    context
        .router()
        .set_auto_failover_list(STORAGE, &[ProviderType::Ipfs, ProviderType::MongoDb]);
    stores[1].set_available(false);

    let routed = context.router().failover(load(&holon)).await.expect("second entry");

    assert_eq!(routed.attempted, vec![ProviderType::Ipfs, ProviderType::MongoDb]);
    assert_eq!(context.quota().usage(OperationClass::Failovers), 1);
}

/// Test that an exhausted quota rejects the request before any provider call
#[tokio::test]
async fn test_quota_checked_before_selection() {
    let mut config = test_config();
    config.subscription.max_replications_per_month = 0;
    let context = create_test_context(config);
    let stores = register_memory(&context, &[ProviderType::MongoDb]);
    let holon = Holon::new("blocked", HolonType::Holon);

    let err = context
        .router()
        .route(save(&holon), LoadBalancingStrategy::Auto)
        .await
        .expect_err("quota");

    assert!(matches!(
        err,
        Error::QuotaExceeded {
            class: OperationClass::Replications,
            ..
        }
    ));
    assert_eq!(stores[0].call_count(), 0);
    assert_eq!(context.router().stats()["quota_rejections"], 1);
}

/// Test that the failover allowance is enforced when a failover is needed
#[tokio::test]
async fn test_failover_quota_exhausted() {
    let mut config = test_config();
    config.subscription.max_failovers_per_month = 0;
    config.routing.auto_failover_providers = vec![ProviderType::MongoDb, ProviderType::Ipfs];
    let context = create_test_context(config);
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ipfs]);
    let holon = stored_holon(&stores);
    stores[0].set_available(false);

    let err = context
        .router()
        .route(load(&holon).prefer(ProviderType::MongoDb), LoadBalancingStrategy::Auto)
        .await
        .expect_err("no failovers left");

    assert!(matches!(
        err,
        Error::QuotaExceeded {
            class: OperationClass::Failovers,
            ..
        }
    ));
    assert_eq!(stores[1].call_count(), 0);
}

/// Test that a slow provider times out and the request fails over
#[tokio::test(start_paused = true)]
async fn test_slow_provider_times_out() {
    let mut config = test_config();
    config.routing.auto_failover_providers = vec![ProviderType::MongoDb, ProviderType::Ipfs];
    let context = create_test_context(config);
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ipfs]);
    let holon = stored_holon(&stores);
    stores[0].set_latency(Duration::from_secs(5));

    let routed = context
        .router()
        .route(load(&holon).prefer(ProviderType::MongoDb), LoadBalancingStrategy::Auto)
        .await
        .expect("failed over");

    assert_eq!(routed.provider, ProviderType::Ipfs);
    assert!(
        context
            .predictive()
            .risk_factor_weight(ProviderType::MongoDb, "Timeout_deadline_exceeded")
            > 0.0
    );
}

/// Test that round robin cycles through eligible providers in order
#[tokio::test]
async fn test_round_robin_cycles() {
    let context = create_test_context(test_config());
    let stores = register_memory(
        &context,
        &[ProviderType::MongoDb, ProviderType::Ipfs, ProviderType::Holo],
    );
    let holon = stored_holon(&stores);

    let mut served = Vec::new();
    for _ in 0..6 {
        let routed = context
            .router()
            .route(load(&holon), LoadBalancingStrategy::RoundRobin)
            .await
            .expect("routed");
        served.push(routed.provider);
    }

    assert_eq!(
        served,
        vec![
            ProviderType::MongoDb,
            ProviderType::Ipfs,
            ProviderType::Holo,
            ProviderType::MongoDb,
            ProviderType::Ipfs,
            ProviderType::Holo,
        ]
    );
}

/// Test that load balancing draws only from the load-balance list
#[tokio::test]
async fn test_load_balance_pool() {
    let mut config = test_config();
    config.routing.auto_load_balance_providers = vec![ProviderType::Holo];
    let context = create_test_context(config);
    let stores = register_memory(
        &context,
        &[ProviderType::MongoDb, ProviderType::Ipfs, ProviderType::Holo],
    );
    let holon = stored_holon(&stores);

    for _ in 0..4 {
        let routed = context
            .router()
            .load_balance(load(&holon), LoadBalancingStrategy::RoundRobin)
            .await
            .expect("routed");
        assert_eq!(routed.provider, ProviderType::Holo);
    }
}

/// Test that cost-based routing on a basic plan prefers free providers
#[tokio::test]
async fn test_cost_based_prefers_free_provider() {
    let mut config = test_config();
    config.subscription.plan_type = PlanType::Basic;
    let context = create_test_context(config);
    let stores = register_memory(&context, &[ProviderType::SqliteDb, ProviderType::Ipfs]);
    let holon = stored_holon(&stores);

    let routed = context
        .router()
        .route(load(&holon), LoadBalancingStrategy::CostBased)
        .await
        .expect("routed");

    assert_eq!(routed.provider, ProviderType::Ipfs);
}

/// Test that the adaptive strategy avoids a provider with a failure history
#[tokio::test]
async fn test_auto_strategy_avoids_failing_provider() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::Ipfs, ProviderType::Holo]);
    let holon = stored_holon(&stores);
    for _ in 0..10 {
        context
            .optimizer()
            .record_outcome(ProviderType::Ipfs, RequestKind::LoadHolon, false, 100.0, None);
    }

    let routed = context
        .router()
        .route(load(&holon), LoadBalancingStrategy::Auto)
        .await
        .expect("routed");

    assert_eq!(routed.provider, ProviderType::Holo);
}

/// Test that replication counts partial success as success
#[tokio::test]
async fn test_replicate_partial_success() {
    let mut config = test_config();
    config.routing.auto_replication_providers =
        vec![ProviderType::MongoDb, ProviderType::Ipfs, ProviderType::Holo];
    let context = create_test_context(config);
    let stores = register_memory(
        &context,
        &[ProviderType::MongoDb, ProviderType::Ipfs, ProviderType::Holo],
    );
    stores[2].set_available(false);
    let holon = Holon::new("replicated", HolonType::Holon);

    let replicated = context.router().replicate(save(&holon)).await.expect("two of three");

    assert_eq!(replicated.satisfied, 2);
    assert!(!replicated.is_complete());
    assert_eq!(replicated.failures.len(), 1);
    assert_eq!(replicated.failures[0].0, ProviderType::Holo);
    assert_eq!(stores[0].len(), 1);
    assert_eq!(stores[1].len(), 1);
    assert!(stores[2].is_empty());
    assert_eq!(context.quota().usage(OperationClass::Replications), 2);
}

/// Test that replication with no successful target is an error
#[tokio::test]
async fn test_replicate_all_targets_failed() {
    let mut config = test_config();
    config.routing.auto_replication_providers = vec![ProviderType::MongoDb, ProviderType::Ipfs];
    let context = create_test_context(config);
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ipfs]);
    for store in &stores {
        store.set_available(false);
    }
    let holon = Holon::new("lost", HolonType::Holon);

    let err = context
        .router()
        .replicate(save(&holon))
        .await
        .expect_err("nothing stored");

    assert!(matches!(err, Error::AllProvidersFailed { .. }));
}

/// Test that an attempt pins the category without moving the current pointer
#[tokio::test]
async fn test_attempt_pins_and_restores() {
    let context = create_test_context(test_config());
    let registry = context.registry();
    register_memory(&context, &[ProviderType::MongoDb]);
    let holon = Holon::new("pinned", HolonType::Holon);
    let recorders: Vec<Arc<PointerRecorder>> = [ProviderType::Ipfs, ProviderType::Holo]
        .into_iter()
        .map(|id| {
            let inner = InMemoryHolonProvider::new(id).with_holons([holon.clone()]);
            Arc::new(PointerRecorder::new(inner, registry.clone(), Duration::from_millis(20)))
        })
        .collect();
    for recorder in &recorders {
        context
            .router()
            .register_provider(STORAGE, recorder.clone())
            .expect("register recorder");
    }
    assert_eq!(registry.current(STORAGE), ProviderType::MongoDb);

    let router = context.router();
    let request = load(&holon);
    let attempts = [ProviderType::Ipfs, ProviderType::Holo, ProviderType::Ipfs]
        .map(|id| router.attempt(id, &request));
    for result in join_all(attempts).await {
        assert!(result.is_ok());
    }

    for recorder in &recorders {
        let seen = recorder.seen();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|(effective, current)| {
            *current == ProviderType::MongoDb && *effective != ProviderType::MongoDb
        }));
    }
    assert_eq!(registry.effective(STORAGE), ProviderType::MongoDb);
    assert_eq!(registry.current(STORAGE), ProviderType::MongoDb);
    assert_eq!(context.monitor().active_connections(ProviderType::Ipfs), 0);
}

/// Test that the configured current provider becomes current on registration
#[tokio::test]
async fn test_register_provider_sets_configured_current() {
    let context = create_test_context(test_config());
    let router = context.router();

    register_memory(&context, &[ProviderType::Ipfs]);
    assert_eq!(context.registry().current(STORAGE), ProviderType::Default);
    register_memory(&context, &[ProviderType::MongoDb]);
    assert_eq!(context.registry().current(STORAGE), ProviderType::MongoDb);

    let err = router
        .register_provider(STORAGE, Arc::new(InMemoryHolonProvider::new(ProviderType::Default)))
        .expect_err("Default is a placeholder");
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

/// Test the router counters
#[tokio::test]
async fn test_stats_counters() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::MongoDb]);
    let holon = stored_holon(&stores);
    let router = context.router();
    router
        .route(load(&holon), LoadBalancingStrategy::Auto)
        .await
        .expect("routed");
    stores[0].set_available(false);
    let _ = router.route(load(&holon), LoadBalancingStrategy::Auto).await;

    let stats = router.stats();
    assert_eq!(stats["requests"], 2);
    assert_eq!(stats["successes"], 1);
    assert_eq!(stats["failures"], 1);
    assert_eq!(stats["usage"]["requests"], 1);
    assert!(context.registry().is_enabled(AutoList::Failover));
}

/// Test that an abandoned attempt closes its connection and releases its pin
#[tokio::test(start_paused = true)]
async fn test_cancelled_attempt_closes_connection() {
    let context = create_test_context(test_config());
    let stores = register_memory(&context, &[ProviderType::MongoDb, ProviderType::Ipfs]);
    let holon = stored_holon(&stores);
    stores[1].set_latency(Duration::from_millis(500));
    let router = context.router();
    let request = load(&holon);

    for _ in 0..2 {
        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            router.attempt(ProviderType::Ipfs, &request),
        )
        .await;
        assert!(abandoned.is_err());
    }

    assert_eq!(context.monitor().active_connections(ProviderType::Ipfs), 0);
    assert_eq!(context.registry().effective(STORAGE), ProviderType::MongoDb);
    assert_eq!(context.registry().current(STORAGE), ProviderType::MongoDb);
}

/// Test that concurrent requests at the edge of the plan limit cannot overshoot it
#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_respect_limit() {
    let mut config = test_config();
    config.subscription.plan_type = PlanType::Free;
    let tracker = Arc::new(InMemoryUsageTracker::new());
    tracker.record(OperationClass::Requests, 999);
    let context = init_app_with_usage(config, tracker.clone()).expect("valid configuration");
    let stores = register_memory(&context, &[ProviderType::MongoDb]);
    let holon = stored_holon(&stores);
    stores[0].set_latency(Duration::from_millis(10));
    let router = context.router();

    let requests = (0..5).map(|_| router.route(load(&holon), LoadBalancingStrategy::Auto));
    let results = join_all(requests).await;

    let served = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(Error::QuotaExceeded {
                    class: OperationClass::Requests,
                    ..
                })
            )
        })
        .count();
    assert_eq!(served, 1);
    assert_eq!(rejected, 4);
    assert_eq!(tracker.usage(OperationClass::Requests), 1000);
    assert_eq!(stores[0].call_count(), 1);
}

/// Test that a failed request gives its quota unit back
#[tokio::test]
async fn test_failed_request_releases_quota() {
    let mut config = test_config();
    config.subscription.plan_type = PlanType::Free;
    let tracker = Arc::new(InMemoryUsageTracker::new());
    tracker.record(OperationClass::Requests, 999);
    let context = init_app_with_usage(config, tracker.clone()).expect("valid configuration");
    let stores = register_memory(&context, &[ProviderType::MongoDb]);
    let holon = stored_holon(&stores);
    let router = context.router();

    stores[0].set_available(false);
    let err = router
        .route(load(&holon), LoadBalancingStrategy::Auto)
        .await
        .expect_err("store is down");
    assert!(matches!(err, Error::AllProvidersFailed { .. }));
    assert_eq!(tracker.usage(OperationClass::Requests), 999);

    stores[0].set_available(true);
    router
        .route(load(&holon), LoadBalancingStrategy::Auto)
        .await
        .expect("last unit of the plan");
    assert_eq!(tracker.usage(OperationClass::Requests), 1000);
}
