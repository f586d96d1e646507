//! Kubernetes resource watcher.
//!
//! Turns Presentation events, and events on the ConfigMaps and Pods it owns,
//! into reconciliation passes using kube_runtime::Controller. Every pass runs
//! under a deadline; failed passes are requeued with a per-object Fibonacci
//! backoff that resets once the object reconciles cleanly.

use crate::backoff::FibonacciBackoff;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::reconciler::{ReconcileOutcome, Reconciler};
use crds::Presentation;
use futures::StreamExt;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use kube::{Api, Client};
use kube_runtime::{
    Controller, watcher,
    controller::{Action, Config as RuntimeConfig},
    reflector::{ObjectRef, Store},
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use store_client::ObjectKey;
use tracing::{debug, error, info, warn};

/// Shared state handed to every reconciliation
pub struct WatchContext {
    reconciler: Reconciler,
    reconcile_timeout: Duration,
    backoff_min: Duration,
    backoff_max: Duration,
    backoffs: Mutex<HashMap<ObjectKey, FibonacciBackoff>>,
    presentations: Option<Store<Presentation>>,
}

impl std::fmt::Debug for WatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchContext")
            .field("reconcile_timeout", &self.reconcile_timeout)
            .field("backoff_min", &self.backoff_min)
            .field("backoff_max", &self.backoff_max)
            .finish_non_exhaustive()
    }
}

impl WatchContext {
    /// Creates the context from a reconciler and the controller settings.
    pub fn new(reconciler: Reconciler, config: &ControllerConfig) -> Self {
        Self {
            reconciler,
            reconcile_timeout: config.reconcile_timeout,
            backoff_min: config.backoff_min,
            backoff_max: config.backoff_max,
            backoffs: Mutex::new(HashMap::new()),
            presentations: None,
        }
    }

    /// Uses the controller's cache of live Presentations to drop stale backoff entries.
    pub fn with_store(mut self, presentations: Store<Presentation>) -> Self {
        self.presentations = Some(presentations);
        self
    }

    fn next_backoff(&self, key: &ObjectKey) -> Duration {
        let mut backoffs = self.backoffs.lock().unwrap_or_else(PoisonError::into_inner);
        backoffs
            .entry(key.clone())
            .or_insert_with(|| FibonacciBackoff::new(self.backoff_min, self.backoff_max))
            .next_backoff()
    }

    fn forget_backoff(&self, key: &ObjectKey) {
        self.backoffs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Drops backoff state for every key `is_live` rejects.
    fn retain_backoffs<F>(&self, is_live: F)
    where
        F: Fn(&ObjectKey) -> bool,
    {
        self.backoffs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| is_live(key));
    }

    /// Forgets objects deleted while failing; they are never reconciled again.
    fn prune_deleted(&self) {
        if let Some(presentations) = &self.presentations {
            self.retain_backoffs(|key| {
                presentations
                    .get(&ObjectRef::new(&key.name).within(&key.namespace))
                    .is_some()
            });
        }
    }

    #[cfg(test)]
    fn tracked_backoffs(&self) -> usize {
        self.backoffs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Runs one reconciliation pass, failing with `Timeout` if it outlives `deadline`.
///
/// A pass cut short by the deadline may have applied some of its writes; the
/// next pass observes whatever state it left behind.
pub async fn reconcile_with_deadline(
    reconciler: &Reconciler,
    key: &ObjectKey,
    deadline: Duration,
) -> Result<ReconcileOutcome, ControllerError> {
    tokio::time::timeout(deadline, reconciler.reconcile(key))
        .await
        .map_err(|_elapsed| ControllerError::Timeout(deadline))?
}

async fn reconcile(
    presentation: Arc<Presentation>,
    ctx: Arc<WatchContext>,
) -> Result<Action, ControllerError> {
    let key = ObjectKey::from_meta(&presentation.metadata)?;

    let outcome = reconcile_with_deadline(&ctx.reconciler, &key, ctx.reconcile_timeout).await?;
    debug!("Reconciled Presentation {}: {:?}", key, outcome);
    ctx.forget_backoff(&key);
    Ok(Action::await_change())
}

fn error_policy(
    presentation: Arc<Presentation>,
    error: &ControllerError,
    ctx: Arc<WatchContext>,
) -> Action {
    ctx.prune_deleted();
    match ObjectKey::from_meta(&presentation.metadata) {
        Ok(key) => {
            let delay = ctx.next_backoff(&key);
            error!(
                "Reconciliation failed for Presentation {}: {} (retrying in {:?})",
                key, error, delay
            );
            Action::requeue(delay)
        }
        Err(e) => {
            warn!("Presentation without identity cannot be reconciled: {}", e);
            Action::requeue(ctx.backoff_max)
        }
    }
}

/// Watches Presentations and the objects they own until shutdown.
pub async fn watch_presentations(
    client: Client,
    reconciler: Reconciler,
    config: &ControllerConfig,
) -> Result<(), ControllerError> {
    let (presentations, config_maps, pods): (Api<Presentation>, Api<ConfigMap>, Api<Pod>) =
        match config.namespace.as_deref() {
            Some(ns) => (
                Api::namespaced(client.clone(), ns),
                Api::namespaced(client.clone(), ns),
                Api::namespaced(client, ns),
            ),
            None => (
                Api::all(client.clone()),
                Api::all(client.clone()),
                Api::all(client),
            ),
        };

    info!(
        "Starting Presentation watcher in {}",
        config.namespace.as_deref().unwrap_or("all namespaces")
    );

    let runtime_config = RuntimeConfig::default()
        .debounce(config.debounce)
        .concurrency(config.concurrency);

    let controller = Controller::new(presentations, watcher::Config::default())
        .owns(config_maps, watcher::Config::default())
        .owns(pods, watcher::Config::default());
    let ctx = Arc::new(WatchContext::new(reconciler, config).with_store(controller.store()));

    controller
        .with_config(runtime_config)
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _action)) => debug!("Reconciled {}", obj),
                Err(e) => warn!("Controller error: {}", e),
            }
        })
        .await;

    info!("Presentation watcher stopped");
    Ok(())
}
