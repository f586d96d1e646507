//! StoreClient trait for mocking
//!
//! This trait abstracts the object store so the reconciler can be driven
//! by an in-memory implementation in unit tests.

use crate::error::StoreError;
use crate::models::{Object, ObjectKey, ObjectKind};

/// Trait for object store operations
///
/// Every call is a single request against the store; implementations do not
/// retry. All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait StoreClientTrait: Send + Sync {
    /// Fetch an object by kind and identity. Absence is `StoreError::NotFound`.
    async fn get(&self, kind: ObjectKind, key: &ObjectKey) -> Result<Object, StoreError>;

    /// Create a new object. An existing object with the same identity is `StoreError::AlreadyExists`.
    async fn create(&self, object: Object) -> Result<Object, StoreError>;

    /// Replace an existing object in a single write.
    async fn update(&self, object: Object) -> Result<Object, StoreError>;

    /// Delete an object by kind and identity.
    async fn delete(&self, kind: ObjectKind, key: &ObjectKey) -> Result<(), StoreError>;
}
