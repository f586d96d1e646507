//! Kubernetes-backed object store client
//!
//! Implements `StoreClientTrait` on top of `kube::Api`, one namespaced API
//! handle per request.

use crate::error::StoreError;
use crate::models::{Object, ObjectKey, ObjectKind};
use crate::store_trait::StoreClientTrait;
use crds::Presentation;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use kube::api::{Api, DeleteParams, PostParams};
use kube::{Client, Resource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

/// Object store client backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeStoreClient {
    client: Client,
}

impl Debug for KubeStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStoreClient").finish_non_exhaustive()
    }
}

impl KubeStoreClient {
    /// Create a new store client from an existing Kubernetes client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn get_typed<K>(&self, kind: ObjectKind, key: &ObjectKey) -> Result<K, StoreError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        debug!("GET {} {}", kind, key);
        self.api::<K>(&key.namespace)
            .get(&key.name)
            .await
            .map_err(|e| StoreError::from_kube(e, &format!("{} {}", kind, key)))
    }

    async fn create_typed<K>(&self, kind: ObjectKind, object: &K) -> Result<K, StoreError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Serialize + Debug,
        K::DynamicType: Default,
    {
        let key = ObjectKey::from_meta(object.meta())?;
        debug!("CREATE {} {}", kind, key);
        self.api::<K>(&key.namespace)
            .create(&PostParams::default(), object)
            .await
            .map_err(|e| StoreError::from_kube(e, &format!("{} {}", kind, key)))
    }

    async fn replace_typed<K>(&self, kind: ObjectKind, object: &K) -> Result<K, StoreError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Serialize + Debug,
        K::DynamicType: Default,
    {
        let key = ObjectKey::from_meta(object.meta())?;
        debug!("UPDATE {} {}", kind, key);
        self.api::<K>(&key.namespace)
            .replace(&key.name, &PostParams::default(), object)
            .await
            .map_err(|e| StoreError::from_kube(e, &format!("{} {}", kind, key)))
    }

    async fn delete_typed<K>(&self, kind: ObjectKind, key: &ObjectKey) -> Result<(), StoreError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        debug!("DELETE {} {}", kind, key);
        self.api::<K>(&key.namespace)
            .delete(&key.name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| StoreError::from_kube(e, &format!("{} {}", kind, key)))
    }
}

#[async_trait::async_trait]
impl StoreClientTrait for KubeStoreClient {
    async fn get(&self, kind: ObjectKind, key: &ObjectKey) -> Result<Object, StoreError> {
        Ok(match kind {
            ObjectKind::Presentation => self.get_typed::<Presentation>(kind, key).await?.into(),
            ObjectKind::ConfigMap => self.get_typed::<ConfigMap>(kind, key).await?.into(),
            ObjectKind::Pod => self.get_typed::<Pod>(kind, key).await?.into(),
        })
    }

    async fn create(&self, object: Object) -> Result<Object, StoreError> {
        let kind = object.kind();
        Ok(match object {
            Object::Presentation(p) => self.create_typed(kind, &p).await?.into(),
            Object::ConfigMap(cm) => self.create_typed(kind, &cm).await?.into(),
            Object::Pod(pod) => self.create_typed(kind, &pod).await?.into(),
        })
    }

    async fn update(&self, object: Object) -> Result<Object, StoreError> {
        let kind = object.kind();
        Ok(match object {
            Object::Presentation(p) => self.replace_typed(kind, &p).await?.into(),
            Object::ConfigMap(cm) => self.replace_typed(kind, &cm).await?.into(),
            Object::Pod(pod) => self.replace_typed(kind, &pod).await?.into(),
        })
    }

    async fn delete(&self, kind: ObjectKind, key: &ObjectKey) -> Result<(), StoreError> {
        match kind {
            ObjectKind::Presentation => self.delete_typed::<Presentation>(kind, key).await,
            ObjectKind::ConfigMap => self.delete_typed::<ConfigMap>(kind, key).await,
            ObjectKind::Pod => self.delete_typed::<Pod>(kind, key).await,
        }
    }
}
