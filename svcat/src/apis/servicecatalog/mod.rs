//! The `servicecatalog.k8s.io` API group

/// Name of the API group
pub const GROUP_NAME: &str = "servicecatalog.k8s.io";

pub mod v1alpha1;
