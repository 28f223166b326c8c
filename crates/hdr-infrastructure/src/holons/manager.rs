//! Holon manager
//!
//! Entity read path: try the requested or current provider, then walk the
//! failover list in order, stopping at the first success. Providers the
//! caller's plan does not allow are never tried. Loaded holons get
//! their metadata mapped, an as-loaded snapshot, and optionally their
//! children loaded recursively.
//!
//! Child failures are warnings by default. With `continue_on_error` off the
//! parent is not returned without its children and the load fails with
//! [`Error::PartialLoad`].

use crate::routing::{
    AutoList, HolonOperation, HyperDriveRouter, OperationOutput, Routed, RoutingRequest,
};
use futures::future::{BoxFuture, FutureExt};
use hdr_domain::entities::{Holon, HolonFilter, HolonKey, LoadedHolon, MetadataQuery};
use hdr_domain::error::{Error, Result};
use hdr_domain::value_objects::{Outcome, ProviderCategory, ProviderType};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// How a load treats providers and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Provider to try first; `Default` means the current provider
    pub provider: ProviderType,
    pub load_children: bool,
    /// Load grandchildren and below, not only direct children
    pub recursive: bool,
    /// Deepest child level to load, `None` for unlimited
    pub max_child_depth: Option<usize>,
    /// Return the parent with a warning when children fail to load
    pub continue_on_error: bool,
    /// The provider already returns children; do not load them here
    pub load_children_from_provider: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            provider: ProviderType::Default,
            load_children: true,
            recursive: true,
            max_child_depth: None,
            continue_on_error: true,
            load_children_from_provider: false,
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn from_provider(mut self, provider: ProviderType) -> Self {
        self.provider = provider;
        self
    }

    #[must_use]
    pub fn without_children(mut self) -> Self {
        self.load_children = false;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_child_depth = Some(depth);
        self
    }

    #[must_use]
    pub fn strict(mut self) -> Self {
        self.continue_on_error = false;
        self
    }

    fn depth_limit(&self) -> Option<usize> {
        if self.recursive { self.max_child_depth } else { Some(1) }
    }

    fn manages_children(&self) -> bool {
        self.load_children && !self.load_children_from_provider
    }
}

/// Loads and saves holons for one provider category
pub struct HolonManager {
    router: Arc<HyperDriveRouter>,
    category: ProviderCategory,
}

impl HolonManager {
    pub fn new(router: Arc<HyperDriveRouter>) -> Self {
        Self {
            router,
            category: ProviderCategory::Storage,
        }
    }

    // ---------------------------------------------------------------------
    // Loads
    // ---------------------------------------------------------------------

    pub async fn load_holon(
        &self,
        key: HolonKey,
        options: &LoadOptions,
    ) -> Result<Outcome<LoadedHolon>> {
        let routed = self
            .load_with_failover(HolonOperation::Load(key), options.provider)
            .await?;
        let provider = routed.provider;
        let mut warnings = routed.warnings;
        let mut loaded = prepare(routed.value.into_holon()?, provider);
        if options.manages_children() {
            let mut visited = HashSet::from([loaded.holon.id]);
            let child_warnings = self
                .attach_children(&mut loaded.holon, provider, options, 1, &mut visited)
                .await?;
            warnings.extend(child_warnings);
        }
        Ok(Outcome {
            value: loaded,
            warnings,
        })
    }

    pub async fn load_holons_for_parent(
        &self,
        parent: HolonKey,
        filter: HolonFilter,
        options: &LoadOptions,
    ) -> Result<Outcome<Vec<LoadedHolon>>> {
        let routed = self
            .load_with_failover(HolonOperation::LoadForParent { parent, filter }, options.provider)
            .await?;
        self.finish_list(routed, options).await
    }

    pub async fn load_holons_by_metadata(
        &self,
        query: MetadataQuery,
        options: &LoadOptions,
    ) -> Result<Outcome<Vec<LoadedHolon>>> {
        let routed = self
            .load_with_failover(HolonOperation::LoadByMetadata(query), options.provider)
            .await?;
        self.finish_list(routed, options).await
    }

    async fn finish_list(
        &self,
        routed: Routed<OperationOutput>,
        options: &LoadOptions,
    ) -> Result<Outcome<Vec<LoadedHolon>>> {
        let provider = routed.provider;
        let mut warnings = routed.warnings;
        let mut loaded = Vec::new();
        for holon in routed.value.into_holons()? {
            let mut item = prepare(holon, provider);
            if options.manages_children() {
                let mut visited = HashSet::from([item.holon.id]);
                let child_warnings = self
                    .attach_children(&mut item.holon, provider, options, 1, &mut visited)
                    .await?;
                warnings.extend(child_warnings);
            }
            loaded.push(item);
        }
        Ok(Outcome {
            value: loaded,
            warnings,
        })
    }

    // ---------------------------------------------------------------------
    // Saves
    // ---------------------------------------------------------------------

    /// Route a save, then copy the stored holon to the replication list.
    ///
    /// Replica failures never fail the save; they come back as warnings.
    pub async fn save_holon(&self, holon: Holon, provider: ProviderType) -> Result<Outcome<Holon>> {
        let request = RoutingRequest::new(HolonOperation::Save(holon))
            .in_category(self.category)
            .prefer(provider);
        let routed = self
            .router
            .route(request, self.router.config().default_strategy)
            .await?;
        let served_by = routed.provider;
        let mut outcome = Outcome {
            value: routed.value.into_holon()?,
            warnings: routed.warnings,
        };

        let registry = self.router.registry();
        if !registry.is_enabled(AutoList::Replication) {
            return Ok(outcome);
        }
        let targets: Vec<ProviderType> = registry
            .list(self.category, AutoList::Replication)
            .into_iter()
            .filter(|p| *p != served_by && registry.is_registered(*p, Some(self.category)))
            .filter(|p| self.router.quota().allows(*p))
            .collect();
        if targets.is_empty() {
            return Ok(outcome);
        }

        let replica = RoutingRequest::new(HolonOperation::Save(outcome.value.clone()))
            .in_category(self.category);
        let replicated = self.router.replicate_to(&replica, targets).await;
        for (target, message) in replicated.failures {
            warn!(
                holon = %outcome.value.id,
                target = %target,
                error = %message,
                "Replica save failed"
            );
            outcome.warn(format!("Replication to {target} failed: {message}"));
        }
        Ok(outcome)
    }

    // ---------------------------------------------------------------------
    // Read path
    // ---------------------------------------------------------------------

    /// Requested-or-current provider first, then the failover list in
    /// order, skipping the ones already covered
    async fn load_with_failover(
        &self,
        operation: HolonOperation,
        requested: ProviderType,
    ) -> Result<Routed<OperationOutput>> {
        let registry = self.router.registry();
        let quota = self.router.quota();
        let current = registry.current(self.category);
        let first = if requested.is_default() { current } else { requested };
        let request = RoutingRequest::new(operation)
            .in_category(self.category)
            .prefer(first);

        let mut attempted = Vec::new();
        let mut last_error = None;
        if !first.is_default() {
            if quota.allows(first) {
                attempted.push(first);
                match self.router.attempt(first, &request).await {
                    Ok(outcome) => return Ok(routed(outcome, first, attempted)),
                    Err(e) => last_error = Some(e),
                }
            } else {
                debug!(provider = %first, "Skipping provider the plan does not allow");
            }
        }

        if registry.is_enabled(AutoList::Failover) {
            for provider in registry.list(self.category, AutoList::Failover) {
                if provider == first || provider == current || attempted.contains(&provider) {
                    continue;
                }
                if !quota.allows(provider) {
                    continue;
                }
                debug!(
                    provider = %provider,
                    operation = %request.kind(),
                    "Trying failover provider"
                );
                attempted.push(provider);
                match self.router.attempt(provider, &request).await {
                    Ok(outcome) => return Ok(routed(outcome, provider, attempted)),
                    Err(e) => last_error = Some(e),
                }
            }
        }

        let message = last_error.map_or_else(
            || "no provider the plan allows could serve the load".to_string(),
            |e| e.to_string(),
        );
        Err(Error::all_providers_failed(request.kind().to_string(), attempted, message))
    }

    /// Load the children of `parent` level by level, up to the depth limit
    fn attach_children<'a>(
        &'a self,
        parent: &'a mut Holon,
        provider: ProviderType,
        options: &'a LoadOptions,
        depth: usize,
        visited: &'a mut HashSet<Uuid>,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        async move {
            if options.depth_limit().is_some_and(|limit| depth > limit) {
                return Ok(Vec::new());
            }
            let operation = HolonOperation::LoadForParent {
                parent: HolonKey::Id(parent.id),
                filter: HolonFilter::default(),
            };
            let routed = match self.load_with_failover(operation, provider).await {
                Ok(routed) => routed,
                Err(e) if options.continue_on_error => {
                    warn!(parent = %parent.id, error = %e, "Children failed to load");
                    return Ok(vec![format!("Children of {} could not be loaded: {e}", parent.id)]);
                }
                Err(e) => return Err(Error::partial_load(parent.id.to_string(), e.to_string())),
            };
            parent.children.clear();

            let child_provider = routed.provider;
            let mut warnings = routed.warnings;
            for mut child in routed.value.into_holons()? {
                if !visited.insert(child.id) {
                    warnings.push(format!("Holon {} appears twice in the tree; skipped", child.id));
                    continue;
                }
                child.map_metadata();
                let nested = self
                    .attach_children(&mut child, child_provider, options, depth + 1, visited)
                    .await?;
                warnings.extend(nested);
                parent.children.push(child);
            }
            Ok(warnings)
        }
        .boxed()
    }
}

/// Map raw metadata, then snapshot the result as its own baseline
fn prepare(mut holon: Holon, provider: ProviderType) -> LoadedHolon {
    holon.map_metadata();
    LoadedHolon::new(holon, provider)
}

fn routed(
    outcome: Outcome<OperationOutput>,
    provider: ProviderType,
    attempted: Vec<ProviderType>,
) -> Routed<OperationOutput> {
    Routed {
        value: outcome.value,
        provider,
        attempted,
        warnings: outcome.warnings,
    }
}
