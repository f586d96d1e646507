//! Presentation CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the presentation controller.

pub mod presentation;

pub use presentation::*;
