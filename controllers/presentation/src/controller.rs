//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Kubernetes
//! client, the reconciler and the Presentation watcher together.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::ownership::ControllerOwnerLinker;
use crate::reconciler::Reconciler;
use crate::watcher;
use kube::Client;
use store_client::KubeStoreClient;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for Presentation resources.
#[derive(Debug)]
pub struct Controller {
    presentation_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts its watcher.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Presentation Controller");

        let kube_client = Client::try_default().await?;

        let reconciler = Reconciler::new(
            Box::new(KubeStoreClient::new(kube_client.clone())),
            Box::new(ControllerOwnerLinker),
        );

        let presentation_watcher = tokio::spawn(async move {
            watcher::watch_presentations(kube_client, reconciler, &config).await
        });

        Ok(Self {
            presentation_watcher,
        })
    }

    /// Runs until the watcher stops (on SIGTERM/ctrl-c) or fails.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("Presentation Controller running");

        self.presentation_watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("Presentation watcher panicked: {}", e)))??;

        info!("Presentation Controller stopped");
        Ok(())
    }
}
