//! Reconciliation logic for Presentation CRDs.
//!
//! One pass reads the Presentation, makes its ConfigMap carry the current
//! markdown, and makes sure a Pod is serving that ConfigMap. A Pod mounts its
//! ConfigMap at creation time, so a content change replaces the Pod rather
//! than patching it.
//!
//! The reconciler keeps no state between passes and never retries; every
//! failure is returned to the caller, which owns requeueing.

use crate::error::ControllerError;
use crate::ownership::OwnerLinker;
use crate::resources;
use crds::Presentation;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use store_client::{ObjectKey, ObjectKind, StoreClientTrait};
use tracing::{debug, info};

/// What a pass did to the ConfigMap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOutcome {
    Created,
    Updated,
    Unchanged,
}

impl ConfigOutcome {
    /// Whether the Pod has to be recreated to pick up the ConfigMap.
    ///
    /// A freshly created ConfigMap counts as changed.
    pub fn changed(self) -> bool {
        !matches!(self, ConfigOutcome::Unchanged)
    }
}

/// What a pass did to the Pod
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodOutcome {
    Created,
    Replaced,
    Unchanged,
}

/// Result of a successful reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The Presentation no longer exists; owned objects are left to garbage collection
    Skipped,
    /// Dependents now match the Presentation
    Converged {
        config: ConfigOutcome,
        pod: PodOutcome,
    },
}

/// Reconciles Presentation resources.
pub struct Reconciler {
    pub(crate) store: Box<dyn StoreClientTrait>,
    pub(crate) linker: Box<dyn OwnerLinker>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(store: Box<dyn StoreClientTrait>, linker: Box<dyn OwnerLinker>) -> Self {
        Self { store, linker }
    }

    /// Reconciles the Presentation identified by `key`.
    ///
    /// This method:
    /// 1. Fetches the Presentation (absent means deleted: nothing to do)
    /// 2. Ensures the ConfigMap holds the current markdown
    /// 3. Ensures a Pod exists, replacing it if the ConfigMap changed in step 2
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome, ControllerError> {
        debug!("Reconciling Presentation {}", key);

        let presentation: Presentation = match self.store.get(ObjectKind::Presentation, key).await {
            Ok(object) => object.try_into()?,
            Err(e) if e.is_not_found() => {
                debug!("Presentation {} not found, owned objects are garbage collected", key);
                return Ok(ReconcileOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };

        let config = self.ensure_latest_config_map(key, &presentation).await?;
        let pod = self
            .ensure_latest_pod(key, &presentation, config.changed())
            .await?;

        Ok(ReconcileOutcome::Converged { config, pod })
    }

    async fn ensure_latest_config_map(
        &self,
        key: &ObjectKey,
        presentation: &Presentation,
    ) -> Result<ConfigOutcome, ControllerError> {
        let mut desired = resources::new_config_map(key, presentation.content());
        self.linker.link(presentation, &mut desired.metadata)?;
        let cm_key = resources::config_map_key(key);

        let existing: ConfigMap = match self.store.get(ObjectKind::ConfigMap, &cm_key).await {
            Ok(object) => object.try_into()?,
            Err(e) if e.is_not_found() => {
                self.store.create(desired.into()).await?;
                info!("Created ConfigMap {}", cm_key);
                return Ok(ConfigOutcome::Created);
            }
            Err(e) => return Err(e.into()),
        };

        if resources::slides_content(&existing) == presentation.content() {
            debug!("ConfigMap {} is up to date", cm_key);
            return Ok(ConfigOutcome::Unchanged);
        }

        // Write against the version we compared with; a concurrent writer yields a conflict
        desired.metadata.resource_version = existing.metadata.resource_version;
        self.store.update(desired.into()).await?;
        info!("Updated ConfigMap {} with new slides", cm_key);
        Ok(ConfigOutcome::Updated)
    }

    async fn ensure_latest_pod(
        &self,
        key: &ObjectKey,
        presentation: &Presentation,
        config_changed: bool,
    ) -> Result<PodOutcome, ControllerError> {
        let mut desired = resources::new_pod(key);
        self.linker.link(presentation, &mut desired.metadata)?;
        let pod_key = resources::pod_key(key);

        match self.store.get(ObjectKind::Pod, &pod_key).await {
            Ok(object) => {
                let _existing: Pod = object.try_into()?;
            }
            Err(e) if e.is_not_found() => {
                self.store.create(desired.into()).await?;
                info!("Created Pod {}", pod_key);
                return Ok(PodOutcome::Created);
            }
            Err(e) => return Err(e.into()),
        }

        if !config_changed {
            debug!("Pod {} is current", pod_key);
            return Ok(PodOutcome::Unchanged);
        }

        // If the create below fails the Pod stays absent until the next pass creates it
        info!("ConfigMap changed, replacing Pod {}", pod_key);
        self.store.delete(ObjectKind::Pod, &pod_key).await?;
        self.store.create(desired.into()).await?;
        info!("Recreated Pod {}", pod_key);
        Ok(PodOutcome::Replaced)
    }
}
