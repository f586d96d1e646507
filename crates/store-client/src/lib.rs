//! Object Store Client
//!
//! The narrow slice of the Kubernetes API the presentation controller needs:
//! get, create, update and delete over a closed set of object kinds.
//!
//! # Example
//!
//! ```no_run
//! use store_client::{KubeStoreClient, ObjectKey, ObjectKind, StoreClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = KubeStoreClient::new(kube::Client::try_default().await?);
//!
//! let key = ObjectKey::new("default", "intro-config");
//! match client.get(ObjectKind::ConfigMap, &key).await {
//!     Ok(object) => println!("found {}", object.kind()),
//!     Err(e) if e.is_not_found() => println!("{key} does not exist yet"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Typed objects**: `Object` is a tagged union of Presentation, ConfigMap and Pod
//! - **Uniform errors**: API status codes are folded into `StoreError` variants
//! - **Mocking**: `MockStoreClient` (feature `test-util`) keeps objects in memory

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeStoreClient;
pub use error::StoreError;
pub use models::*;
pub use store_trait::StoreClientTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockStoreClient, StoreOp, WriteCounts};
