//! Ownership linkage between a Presentation and its dependents.
//!
//! A controller owner reference makes the API server's garbage collector
//! delete the ConfigMap and Pod when the Presentation goes away; the
//! reconciler has no deletion path of its own.

use crate::error::ControllerError;
use crds::Presentation;
use kube::Resource;
use kube::api::ObjectMeta;

/// Stamps a dependent object with a back-reference to its owner
pub trait OwnerLinker: Send + Sync {
    fn link(&self, owner: &Presentation, dependent: &mut ObjectMeta) -> Result<(), ControllerError>;
}

/// Links dependents through a controller owner reference
/// (`controller: true`, `blockOwnerDeletion: true`).
#[derive(Debug, Default, Clone, Copy)]
pub struct ControllerOwnerLinker;

impl OwnerLinker for ControllerOwnerLinker {
    fn link(&self, owner: &Presentation, dependent: &mut ObjectMeta) -> Result<(), ControllerError> {
        let owner_name = owner.metadata.name.as_deref().unwrap_or("<unknown>");
        let mut oref = owner.controller_owner_ref(&()).ok_or_else(|| {
            ControllerError::OwnerLinkage(format!(
                "Presentation {} has no name or uid yet",
                owner_name
            ))
        })?;
        oref.block_owner_deletion = Some(true);

        let refs = dependent.owner_references.get_or_insert_with(Vec::new);
        if let Some(other) = refs
            .iter()
            .find(|r| r.controller == Some(true) && r.uid != oref.uid)
        {
            return Err(ControllerError::OwnerLinkage(format!(
                "{} is already controlled by {} {}",
                dependent.name.as_deref().unwrap_or("<unnamed>"),
                other.kind,
                other.name
            )));
        }
        refs.retain(|r| r.uid != oref.uid);
        refs.push(oref);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_presentation;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

    #[test]
    fn test_link_sets_controller_reference() {
        let mut presentation = create_test_presentation("foo", "ns", "# Hello");
        presentation.metadata.uid = Some("uid-1".to_string());
        let mut meta = ObjectMeta::default();

        ControllerOwnerLinker.link(&presentation, &mut meta).unwrap();

        let refs = meta.owner_references.unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, "Presentation");
        assert_eq!(refs[0].api_version, "haxx.axxes.com/v1");
        assert_eq!(refs[0].name, "foo");
        assert_eq!(refs[0].uid, "uid-1");
        assert_eq!(refs[0].controller, Some(true));
        assert_eq!(refs[0].block_owner_deletion, Some(true));
    }

    #[test]
    fn test_link_is_idempotent() {
        let mut presentation = create_test_presentation("foo", "ns", "# Hello");
        presentation.metadata.uid = Some("uid-1".to_string());
        let mut meta = ObjectMeta::default();

        ControllerOwnerLinker.link(&presentation, &mut meta).unwrap();
        ControllerOwnerLinker.link(&presentation, &mut meta).unwrap();

        assert_eq!(meta.owner_references.unwrap().len(), 1);
    }

    #[test]
    fn test_link_without_uid_fails() {
        let presentation = create_test_presentation("foo", "ns", "# Hello");
        let mut meta = ObjectMeta::default();

        let err = ControllerOwnerLinker.link(&presentation, &mut meta).unwrap_err();
        assert!(matches!(err, ControllerError::OwnerLinkage(_)));
        assert!(meta.owner_references.is_none());
    }

    #[test]
    fn test_link_refuses_foreign_controller() {
        let mut presentation = create_test_presentation("foo", "ns", "# Hello");
        presentation.metadata.uid = Some("uid-1".to_string());
        let mut meta = ObjectMeta {
            owner_references: Some(vec![OwnerReference {
                api_version: "apps/v1".to_string(),
                kind: "ReplicaSet".to_string(),
                name: "other".to_string(),
                uid: "uid-2".to_string(),
                controller: Some(true),
                ..Default::default()
            }]),
            ..Default::default()
        };

        let err = ControllerOwnerLinker.link(&presentation, &mut meta).unwrap_err();
        assert!(matches!(err, ControllerError::OwnerLinkage(_)));
    }
}
