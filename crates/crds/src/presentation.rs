//! Presentation CRD
//!
//! Declares a markdown slide deck that should be served by a long-running pod.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "haxx.axxes.com",
    version = "v1",
    kind = "Presentation",
    namespaced,
    shortname = "pres"
)]
#[serde(rename_all = "camelCase")]
pub struct PresentationSpec {
    /// Markdown source of the slides
    #[serde(default)]
    pub markdown: String,
}

impl Presentation {
    /// Markdown content declared by the user.
    pub fn content(&self) -> &str {
        &self.spec.markdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::{CustomResourceExt, Resource};

    #[test]
    fn test_presentation_crd_identity() {
        let crd = Presentation::crd();
        assert_eq!(crd.spec.group, "haxx.axxes.com");
        assert_eq!(crd.spec.names.kind, "Presentation");
        assert_eq!(crd.spec.scope, "Namespaced");
        assert_eq!(Presentation::api_version(&()), "haxx.axxes.com/v1");
    }

    #[test]
    fn test_spec_deserializes_markdown() {
        let spec: PresentationSpec =
            serde_json::from_value(serde_json::json!({ "markdown": "# Hello" })).unwrap();
        assert_eq!(spec.markdown, "# Hello");

        // Missing markdown is an empty deck, not an error
        let empty: PresentationSpec = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.markdown, "");
    }

    #[test]
    fn test_content_reads_spec() {
        let presentation = Presentation::new("talk", PresentationSpec { markdown: "# A".to_string() });
        assert_eq!(presentation.content(), "# A");
    }
}
