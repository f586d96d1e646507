//! Dependent objects derived from a Presentation.
//!
//! Names, labels and specs here are part of the controller's contract with
//! existing clusters: a renamed key or path orphans live objects.

use k8s_openapi::api::core::v1::{
    ConfigMap, ConfigMapVolumeSource, Container, Pod, PodSpec, Volume, VolumeMount,
};
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use store_client::ObjectKey;

/// ConfigMap key holding the markdown
pub const SLIDES_KEY: &str = "slides.md";
/// Image that renders `/config/slides.md`
pub const PRESENTATION_IMAGE: &str = "manueldewald/presentation";
/// Name of the single container in the pod
pub const CONTAINER_NAME: &str = "slides";
/// Where the ConfigMap is mounted inside the container
pub const CONFIG_MOUNT_PATH: &str = "/config";
/// Label key carrying the Presentation name
pub const APP_LABEL: &str = "app";

/// Name of the ConfigMap owned by the Presentation `name`
pub fn config_map_name(name: &str) -> String {
    format!("{}-config", name)
}

/// Name of the Pod owned by the Presentation `name`
pub fn pod_name(name: &str) -> String {
    format!("{}-pod", name)
}

/// Identity of the ConfigMap derived from a Presentation identity
pub fn config_map_key(presentation: &ObjectKey) -> ObjectKey {
    ObjectKey::new(&presentation.namespace, config_map_name(&presentation.name))
}

/// Identity of the Pod derived from a Presentation identity
pub fn pod_key(presentation: &ObjectKey) -> ObjectKey {
    ObjectKey::new(&presentation.namespace, pod_name(&presentation.name))
}

fn labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(APP_LABEL.to_string(), name.to_string())])
}

fn metadata(name: String, presentation: &ObjectKey) -> ObjectMeta {
    ObjectMeta {
        name: Some(name),
        namespace: Some(presentation.namespace.clone()),
        labels: Some(labels(&presentation.name)),
        ..Default::default()
    }
}

/// ConfigMap carrying `content` under `slides.md`
pub fn new_config_map(presentation: &ObjectKey, content: &str) -> ConfigMap {
    ConfigMap {
        metadata: metadata(config_map_name(&presentation.name), presentation),
        data: Some(BTreeMap::from([(
            SLIDES_KEY.to_string(),
            content.to_string(),
        )])),
        ..Default::default()
    }
}

/// Pod serving the slides from the derived ConfigMap
///
/// The pod refers to the ConfigMap by name only, so its spec never changes
/// when the slides do.
pub fn new_pod(presentation: &ObjectKey) -> Pod {
    let volume_name = config_map_name(&presentation.name);
    Pod {
        metadata: metadata(pod_name(&presentation.name), presentation),
        spec: Some(PodSpec {
            containers: vec![Container {
                name: CONTAINER_NAME.to_string(),
                image: Some(PRESENTATION_IMAGE.to_string()),
                volume_mounts: Some(vec![VolumeMount {
                    name: volume_name.clone(),
                    mount_path: CONFIG_MOUNT_PATH.to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }],
            volumes: Some(vec![Volume {
                name: volume_name,
                config_map: Some(ConfigMapVolumeSource {
                    name: config_map_name(&presentation.name),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Slides stored in a live ConfigMap; a missing key reads as empty.
pub fn slides_content(config_map: &ConfigMap) -> &str {
    config_map
        .data
        .as_ref()
        .and_then(|data| data.get(SLIDES_KEY))
        .map_or("", String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        let key = ObjectKey::new("ns", "foo");
        assert_eq!(config_map_key(&key), ObjectKey::new("ns", "foo-config"));
        assert_eq!(pod_key(&key), ObjectKey::new("ns", "foo-pod"));

        // Names are concatenated verbatim, never normalised
        let key = ObjectKey::new("team-a", "kubecon.2024-keynote");
        assert_eq!(config_map_name(&key.name), "kubecon.2024-keynote-config");
        assert_eq!(pod_name(&key.name), "kubecon.2024-keynote-pod");
    }

    #[test]
    fn test_config_map_holds_content_under_fixed_key() {
        let cm = new_config_map(&ObjectKey::new("ns", "foo"), "# Hello");
        assert_eq!(cm.metadata.name.as_deref(), Some("foo-config"));
        assert_eq!(cm.metadata.namespace.as_deref(), Some("ns"));
        assert_eq!(
            cm.metadata.labels.as_ref().and_then(|l| l.get(APP_LABEL)).map(String::as_str),
            Some("foo")
        );
        let data = cm.data.as_ref().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(slides_content(&cm), "# Hello");
    }

    #[test]
    fn test_pod_mounts_config_map_by_name() {
        let pod = new_pod(&ObjectKey::new("ns", "foo"));
        assert_eq!(pod.metadata.name.as_deref(), Some("foo-pod"));
        assert_eq!(pod.metadata.namespace.as_deref(), Some("ns"));

        let spec = pod.spec.unwrap();
        assert_eq!(spec.containers.len(), 1);
        let container = &spec.containers[0];
        assert_eq!(container.name, CONTAINER_NAME);
        assert_eq!(container.image.as_deref(), Some(PRESENTATION_IMAGE));

        let mounts = container.volume_mounts.as_ref().unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].mount_path, CONFIG_MOUNT_PATH);
        assert_eq!(mounts[0].name, "foo-config");

        let volumes = spec.volumes.unwrap();
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].name, "foo-config");
        assert_eq!(volumes[0].config_map.as_ref().unwrap().name, "foo-config");
    }

    #[test]
    fn test_missing_slides_key_reads_empty() {
        let cm = ConfigMap::default();
        assert_eq!(slides_content(&cm), "");
    }
}
