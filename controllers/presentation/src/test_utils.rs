//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test data and setting up test scenarios.

#[cfg(test)]
use crate::ownership::ControllerOwnerLinker;
#[cfg(test)]
use crate::reconciler::Reconciler;
#[cfg(test)]
use crds::{Presentation, PresentationSpec};
#[cfg(test)]
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
#[cfg(test)]
use kube::api::ObjectMeta;
#[cfg(test)]
use store_client::{MockStoreClient, ObjectKey, ObjectKind};

/// Helper to create a test Presentation CRD (no uid, not stored)
#[cfg(test)]
pub fn create_test_presentation(name: &str, namespace: &str, markdown: &str) -> Presentation {
    Presentation {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: PresentationSpec {
            markdown: markdown.to_string(),
        },
    }
}

/// Helper to store a Presentation in the mock, as the API server would have it
#[cfg(test)]
pub fn seed_presentation(
    store: &MockStoreClient,
    name: &str,
    namespace: &str,
    markdown: &str,
) -> ObjectKey {
    store.add_object(create_test_presentation(name, namespace, markdown));
    ObjectKey::new(namespace, name)
}

/// Helper to change the markdown of a stored Presentation (an external edit)
#[cfg(test)]
pub fn edit_presentation(store: &MockStoreClient, key: &ObjectKey, markdown: &str) {
    let mut presentation = Presentation::try_from(
        store
            .object(ObjectKind::Presentation, key)
            .expect("presentation must be seeded"),
    )
    .expect("stored object is a Presentation");
    presentation.spec.markdown = markdown.to_string();
    // Replace in place, keeping uid so ownership still matches
    store.replace_object(presentation);
}

/// Helper to build a reconciler over a shared mock store
#[cfg(test)]
pub fn create_test_reconciler(store: &MockStoreClient) -> Reconciler {
    Reconciler::new(Box::new(store.clone()), Box::new(ControllerOwnerLinker))
}

/// Helper to read the stored ConfigMap
#[cfg(test)]
pub fn stored_config_map(store: &MockStoreClient, key: &ObjectKey) -> Option<ConfigMap> {
    store
        .object(ObjectKind::ConfigMap, key)
        .map(|o| ConfigMap::try_from(o).expect("stored object is a ConfigMap"))
}

/// Helper to read the stored Pod
#[cfg(test)]
pub fn stored_pod(store: &MockStoreClient, key: &ObjectKey) -> Option<Pod> {
    store
        .object(ObjectKind::Pod, key)
        .map(|o| Pod::try_from(o).expect("stored object is a Pod"))
}
