//! Mock StoreClient for unit testing
//!
//! This module provides an in-memory implementation of `StoreClientTrait` that
//! behaves like the API server for the handful of rules the controller relies on:
//! - `create` assigns a fresh `uid` and `resourceVersion` and rejects duplicates
//! - `update` requires the object to exist and rejects a stale `resourceVersion`
//! - `delete` of an owner removes every object owned by it (garbage collection)
//!
//! Failures can be injected per operation and kind to exercise error paths.

use crate::error::StoreError;
use crate::models::{Object, ObjectKey, ObjectKind};
use crate::store_trait::StoreClientTrait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Store operations, used to target failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Create,
    Update,
    Delete,
}

/// Number of writes the mock has accepted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl WriteCounts {
    pub fn total(&self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

/// Mock StoreClient for testing
///
/// Clones share the same underlying storage, so a test can hand one clone to
/// the reconciler and inspect the store through another.
#[derive(Debug, Clone, Default)]
pub struct MockStoreClient {
    pub(crate) objects: Arc<Mutex<HashMap<(ObjectKind, ObjectKey), Object>>>,
    pub(crate) writes: Arc<Mutex<WriteCounts>>,
    pub(crate) failures: Arc<Mutex<Vec<(StoreOp, ObjectKind)>>>,
    pub(crate) next_resource_version: Arc<Mutex<u64>>,
}

impl MockStoreClient {
    /// Create a new, empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the mock store (for test setup)
    ///
    /// Assigns a `uid` and `resourceVersion` like `create` would, but does not
    /// count as a write. Returns the stored object.
    pub fn add_object(&self, object: impl Into<Object>) -> Object {
        let mut object = object.into();
        let key = object
            .key()
            .unwrap_or_else(|e| panic!("test object has no identity: {e}"));
        self.stamp_new(&mut object);
        self.objects
            .lock()
            .unwrap()
            .insert((object.kind(), key), object.clone());
        object
    }

    /// Overwrite a stored object as an external actor would (for test setup)
    ///
    /// Keeps the stored `uid`, bumps `resourceVersion` and does not count as a write.
    pub fn replace_object(&self, object: impl Into<Object>) -> Object {
        let mut object = object.into();
        let key = object
            .key()
            .unwrap_or_else(|e| panic!("test object has no identity: {e}"));
        let kind = object.kind();
        let resource_version = self.next_resource_version();

        let mut objects = self.objects.lock().unwrap();
        let uid = objects
            .get(&(kind, key.clone()))
            .and_then(|existing| existing.metadata().uid.clone())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let meta = object.metadata_mut();
        meta.uid = Some(uid);
        meta.resource_version = Some(resource_version);
        objects.insert((kind, key), object.clone());
        object
    }

    /// Look up an object without going through the trait (for assertions)
    pub fn object(&self, kind: ObjectKind, key: &ObjectKey) -> Option<Object> {
        self.objects
            .lock()
            .unwrap()
            .get(&(kind, key.clone()))
            .cloned()
    }

    /// Number of stored objects of the given kind
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Writes accepted since creation or the last `reset_writes`
    pub fn writes(&self) -> WriteCounts {
        *self.writes.lock().unwrap()
    }

    /// Reset write counters
    pub fn reset_writes(&self) {
        *self.writes.lock().unwrap() = WriteCounts::default();
    }

    /// Make the next `op` against `kind` fail with `StoreError::Unavailable`
    pub fn fail_next(&self, op: StoreOp, kind: ObjectKind) {
        self.failures.lock().unwrap().push((op, kind));
    }

    fn take_failure(&self, op: StoreOp, kind: ObjectKind) -> Result<(), StoreError> {
        let mut failures = self.failures.lock().unwrap();
        if let Some(pos) = failures.iter().position(|f| *f == (op, kind)) {
            failures.remove(pos);
            return Err(StoreError::Unavailable(format!(
                "injected {:?} failure for {}",
                op, kind
            )));
        }
        Ok(())
    }

    fn next_resource_version(&self) -> String {
        let mut rv = self.next_resource_version.lock().unwrap();
        *rv += 1;
        rv.to_string()
    }

    fn stamp_new(&self, object: &mut Object) {
        let resource_version = self.next_resource_version();
        let meta = object.metadata_mut();
        meta.uid = Some(uuid::Uuid::new_v4().to_string());
        meta.resource_version = Some(resource_version);
    }

    /// Remove every object owned (transitively) by an object with `uid`
    fn collect_garbage(objects: &mut HashMap<(ObjectKind, ObjectKey), Object>, uid: String) {
        let mut pending = vec![uid];
        while let Some(owner_uid) = pending.pop() {
            let owned: Vec<(ObjectKind, ObjectKey)> = objects
                .iter()
                .filter(|(_, obj)| {
                    obj.metadata()
                        .owner_references
                        .as_ref()
                        .is_some_and(|refs| refs.iter().any(|r| r.uid == owner_uid))
                })
                .map(|(k, _)| k.clone())
                .collect();
            for key in owned {
                if let Some(removed) = objects.remove(&key) {
                    if let Some(uid) = removed.metadata().uid.clone() {
                        pending.push(uid);
                    }
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl StoreClientTrait for MockStoreClient {
    async fn get(&self, kind: ObjectKind, key: &ObjectKey) -> Result<Object, StoreError> {
        self.take_failure(StoreOp::Get, kind)?;
        self.object(kind, key)
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", kind, key)))
    }

    async fn create(&self, mut object: Object) -> Result<Object, StoreError> {
        let kind = object.kind();
        self.take_failure(StoreOp::Create, kind)?;
        let key = object.key()?;

        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&(kind, key.clone())) {
            return Err(StoreError::AlreadyExists(format!("{} {}", kind, key)));
        }
        self.stamp_new(&mut object);
        objects.insert((kind, key), object.clone());
        self.writes.lock().unwrap().creates += 1;
        Ok(object)
    }

    async fn update(&self, mut object: Object) -> Result<Object, StoreError> {
        let kind = object.kind();
        self.take_failure(StoreOp::Update, kind)?;
        let key = object.key()?;

        let mut objects = self.objects.lock().unwrap();
        let existing = objects
            .get(&(kind, key.clone()))
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", kind, key)))?;

        let stored_rv = existing.metadata().resource_version.clone();
        if let Some(rv) = &object.metadata().resource_version {
            if stored_rv.as_ref() != Some(rv) {
                return Err(StoreError::Conflict(format!(
                    "{} {}: resourceVersion {} is stale",
                    kind, key, rv
                )));
            }
        }

        let uid = existing.metadata().uid.clone();
        let resource_version = self.next_resource_version();
        let meta = object.metadata_mut();
        meta.uid = uid;
        meta.resource_version = Some(resource_version);

        objects.insert((kind, key), object.clone());
        self.writes.lock().unwrap().updates += 1;
        Ok(object)
    }

    async fn delete(&self, kind: ObjectKind, key: &ObjectKey) -> Result<(), StoreError> {
        self.take_failure(StoreOp::Delete, kind)?;

        let mut objects = self.objects.lock().unwrap();
        let removed = objects
            .remove(&(kind, key.clone()))
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", kind, key)))?;
        if let Some(uid) = removed.metadata().uid.clone() {
            Self::collect_garbage(&mut objects, uid);
        }
        self.writes.lock().unwrap().deletes += 1;
        Ok(())
    }
}
