//! Object model shared by every store client implementation.
//!
//! The controller only ever touches three kinds of object, so they are
//! modelled as a closed enum rather than through a dynamic client.

use crate::error::StoreError;
use crds::Presentation;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use kube::api::ObjectMeta;
use std::fmt;

/// Kinds of object the store client can handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    /// The user-declared desired state
    Presentation,
    /// Config artifact holding the slides
    ConfigMap,
    /// Workload serving the slides
    Pod,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Presentation => "Presentation",
            ObjectKind::ConfigMap => "ConfigMap",
            ObjectKind::Pod => "Pod",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespaced identity of an object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Reads the identity out of object metadata.
    pub fn from_meta(meta: &ObjectMeta) -> Result<Self, StoreError> {
        let name = meta
            .name
            .as_deref()
            .ok_or_else(|| StoreError::InvalidObject("metadata.name is missing".to_string()))?;
        let namespace = meta.namespace.as_deref().ok_or_else(|| {
            StoreError::InvalidObject(format!("metadata.namespace is missing for {}", name))
        })?;
        Ok(Self::new(namespace, name))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// An object of one of the supported kinds
#[derive(Debug, Clone)]
pub enum Object {
    Presentation(Presentation),
    ConfigMap(ConfigMap),
    Pod(Pod),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Presentation(_) => ObjectKind::Presentation,
            Object::ConfigMap(_) => ObjectKind::ConfigMap,
            Object::Pod(_) => ObjectKind::Pod,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Object::Presentation(p) => &p.metadata,
            Object::ConfigMap(cm) => &cm.metadata,
            Object::Pod(pod) => &pod.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Object::Presentation(p) => &mut p.metadata,
            Object::ConfigMap(cm) => &mut cm.metadata,
            Object::Pod(pod) => &mut pod.metadata,
        }
    }

    pub fn key(&self) -> Result<ObjectKey, StoreError> {
        ObjectKey::from_meta(self.metadata())
    }
}

macro_rules! object_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Object {
                fn from(value: $ty) -> Self {
                    Object::$variant(value)
                }
            }

            impl TryFrom<Object> for $ty {
                type Error = StoreError;

                fn try_from(object: Object) -> Result<Self, Self::Error> {
                    match object {
                        Object::$variant(inner) => Ok(inner),
                        other => Err(StoreError::UnexpectedKind {
                            expected: ObjectKind::$variant.as_str(),
                            actual: other.kind().as_str(),
                        }),
                    }
                }
            }
        )*
    };
}

object_conversions! {
    Presentation => Presentation,
    ConfigMap => ConfigMap,
    Pod => Pod,
}
