//! Prints the Presentation CRD as YAML.
//!
//! Usage: `cargo run --bin crdgen > deploy/crd.yaml`

use crds::Presentation;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&Presentation::crd())?);
    Ok(())
}
