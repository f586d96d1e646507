//! Controller-specific error types.
//!
//! Every failure inside a reconciliation pass surfaces as a `ControllerError`;
//! the caller decides when to retry.

use std::time::Duration;
use store_client::StoreError;
use thiserror::Error;

/// Errors that can occur in the Presentation Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Object store error (read, create, update or delete)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Kubernetes client error outside the object store
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Dependent object could not be linked to its owner
    #[error("Owner linkage failed: {0}")]
    OwnerLinkage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reconciliation did not finish within the deadline
    #[error("Reconciliation exceeded deadline of {0:?}")]
    Timeout(Duration),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
