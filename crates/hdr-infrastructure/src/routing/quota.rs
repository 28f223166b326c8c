//! Subscription quota enforcement

use super::telemetry;
use crate::config::SubscriptionConfig;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use hdr_domain::error::{Error, Result};
use hdr_domain::ports::UsageTracker;
use hdr_domain::value_objects::{OperationClass, ProviderType};
use std::sync::Arc;
use tracing::{debug, warn};

/// Process-local usage counters
#[derive(Debug, Default)]
pub struct InMemoryUsageTracker {
    usage: DashMap<OperationClass, u64>,
}

impl InMemoryUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageTracker for InMemoryUsageTracker {
    fn usage(&self, class: OperationClass) -> u64 {
        self.usage.get(&class).map_or(0, |u| *u)
    }

    fn record(&self, class: OperationClass, amount: u64) {
        let mut usage = self.usage.entry(class).or_insert(0);
        *usage = usage.saturating_add(amount);
    }

    fn try_acquire(&self, class: OperationClass, limit: u64) -> bool {
        let mut usage = self.usage.entry(class).or_insert(0);
        if *usage >= limit {
            return false;
        }
        *usage += 1;
        true
    }

    fn release(&self, class: OperationClass, amount: u64) {
        if let Some(mut usage) = self.usage.get_mut(&class) {
            *usage = usage.saturating_sub(amount);
        }
    }

    fn reset(&self) {
        self.usage.clear();
    }
}

/// Plan limits and provider restrictions of the caller
pub struct QuotaGuard {
    subscription: ArcSwap<SubscriptionConfig>,
    usage: Arc<dyn UsageTracker>,
}

impl QuotaGuard {
    pub fn new(subscription: SubscriptionConfig, usage: Arc<dyn UsageTracker>) -> Self {
        Self {
            subscription: ArcSwap::from_pointee(subscription),
            usage,
        }
    }

    /// Reject the operation class when its usage has reached the plan limit.
    ///
    /// Pay-as-you-go plans are never rejected.
    pub fn check(&self, class: OperationClass) -> Result<()> {
        let subscription = self.subscription.load();
        let Some(limit) = subscription.limit_for(class) else {
            return Ok(());
        };
        let usage = self.usage.usage(class);
        if usage < limit {
            return Ok(());
        }
        if subscription.pay_as_you_go_enabled {
            debug!(class = %class, usage, limit, "Over plan limit, billed as pay-as-you-go");
            return Ok(());
        }
        warn!(class = %class, usage, limit, plan = %subscription.plan_type, "Quota exceeded");
        telemetry::record_quota_rejection(class);
        Err(Error::quota_exceeded(class, usage, limit))
    }

    /// Take one unit of the class for an in-flight operation.
    ///
    /// The limit check and the increment are one step, so concurrent
    /// callers can never overshoot the plan. The unit is given back when
    /// the reservation is dropped without being committed.
    pub fn reserve(&self, class: OperationClass) -> Result<QuotaReservation> {
        let subscription = self.subscription.load();
        match subscription.limit_for(class) {
            None => self.usage.record(class, 1),
            Some(limit) if self.usage.try_acquire(class, limit) => {}
            Some(limit) if subscription.pay_as_you_go_enabled => {
                debug!(class = %class, limit, "Over plan limit, billed as pay-as-you-go");
                self.usage.record(class, 1);
            }
            Some(limit) => {
                let usage = self.usage.usage(class);
                warn!(
                    class = %class,
                    usage,
                    limit,
                    plan = %subscription.plan_type,
                    "Quota exceeded"
                );
                telemetry::record_quota_rejection(class);
                return Err(Error::quota_exceeded(class, usage, limit));
            }
        }
        Ok(QuotaReservation {
            usage: Arc::clone(&self.usage),
            class,
            held: true,
        })
    }

    pub fn record(&self, class: OperationClass, amount: u64) {
        self.usage.record(class, amount);
    }

    pub fn usage(&self, class: OperationClass) -> u64 {
        self.usage.usage(class)
    }

    /// Whether the plan may route to the provider
    pub fn allows(&self, provider: ProviderType) -> bool {
        self.subscription.load().allows(provider)
    }

    pub fn subscription(&self) -> Arc<SubscriptionConfig> {
        self.subscription.load_full()
    }

    pub fn set_subscription(&self, subscription: SubscriptionConfig) {
        self.subscription.store(Arc::new(subscription));
    }

    pub fn reset_usage(&self) {
        self.usage.reset();
    }
}

/// One unit of usage held for an operation still in flight
#[must_use = "the unit is released as soon as the reservation is dropped"]
pub struct QuotaReservation {
    usage: Arc<dyn UsageTracker>,
    class: OperationClass,
    held: bool,
}

impl QuotaReservation {
    pub fn class(&self) -> OperationClass {
        self.class
    }

    /// Keep the unit: the operation completed
    pub fn commit(mut self) {
        self.held = false;
    }
}

impl Drop for QuotaReservation {
    fn drop(&mut self) {
        if self.held {
            self.usage.release(self.class, 1);
        }
    }
}
