//! Presentation Controller
//!
//! Serves markdown slides for every `Presentation` custom resource:
//! - a ConfigMap `<name>-config` holds the markdown under `slides.md`
//! - a Pod `<name>-pod` runs the presentation image with that ConfigMap mounted
//!
//! Editing the markdown updates the ConfigMap and replaces the Pod.

mod backoff;
mod config;
mod controller;
mod error;
mod ownership;
mod reconciler;
mod resources;
mod watcher;
#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    info!("Starting Presentation Controller");

    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Reconcile timeout: {:?}", config.reconcile_timeout);
    info!("  Debounce: {:?}, concurrency: {}", config.debounce, config.concurrency);
    info!("  Backoff: {:?} .. {:?}", config.backoff_min, config.backoff_max);

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
