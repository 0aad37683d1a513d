//! Svcat is a typed client for the Kubernetes service catalog API
//!
//! # Overview
//!
//! The service catalog exposes brokers, the service classes they offer, provisioned
//! instances of those classes and bindings to those instances, all under the
//! `servicecatalog.k8s.io` API group.
//!
//! The main modules are:
//!
//! - [`apis`](crate::apis) with the typed resources of every served group version
//! - [`clientset`](crate::clientset) with one accessor per resource in a group version
//! - [`api`](crate::api) with the [`ResourceApi`](crate::api::ResourceApi) accessor and its parameters
//!
//! Transport, authentication and cluster configuration come from [`kube`], which is re-exported.
//!
//! # Using the Clientset
//! ```no_run
//! use svcat::{api::ListParams, clientset::Clientset, ResourceExt};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let clientset = Clientset::try_default().await?;
//!     let catalog = clientset.servicecatalog_v1alpha1();
//!
//!     for broker in catalog.brokers().list(&ListParams::default()).await? {
//!         println!("found broker {} at {}", broker.name_any(), broker.spec.url);
//!     }
//!     for instance in catalog.instances("default").list(&ListParams::default()).await? {
//!         println!("found instance {}", instance.name_any());
//!     }
//!     Ok(())
//! }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod apis;
pub mod clientset;

pub mod error;
#[doc(inline)]
pub use error::Error;
/// Convient alias for `Result<T, Error>`
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[doc(no_inline)]
pub use kube::{self, Client, Config, Resource, ResourceExt};
