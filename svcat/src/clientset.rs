//! Typed clients grouping the resources of each served API group version
//!
//! A [`Clientset`] hands out one group client per group version, and each group client
//! hands out a [`ResourceApi`] per resource kind, scoped the way that kind is served.
use http::{header::USER_AGENT, HeaderValue};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::{core::GroupVersion, Client, Config};

use crate::{
    api::ResourceApi,
    apis::servicecatalog::v1alpha1::{Binding, Broker, Instance, ServiceClass, API_VERSION},
    Error, Result,
};

/// The user agent sent when none is configured: `svcat/<version> (<os>/<arch>)`
pub fn default_user_agent() -> String {
    format!(
        "svcat/{} ({}/{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Client for the `servicecatalog.k8s.io/v1alpha1` group version
#[derive(Clone)]
pub struct ServicecatalogV1alpha1Client {
    client: Client,
}

impl ServicecatalogV1alpha1Client {
    /// Wrap an existing [`Client`]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from a [`Config`], filling in the group defaults
    pub fn try_from_config(config: Config) -> Result<Self> {
        let gv: GroupVersion = API_VERSION.parse()?;
        let config = with_group_defaults(config)?;
        tracing::debug!(
            group = %gv.group,
            version = %gv.version,
            server = %config.cluster_url,
            "building group client"
        );
        Ok(Self::new(Client::try_from(config)?))
    }

    /// Build a client from the inferred [`Config`]
    pub async fn try_default() -> Result<Self> {
        Self::try_from_config(Config::infer().await?)
    }

    /// Brokers are cluster scoped
    pub fn brokers(&self) -> ResourceApi<Broker> {
        ResourceApi::all(self.client.clone())
    }

    /// Service classes in `ns`
    pub fn service_classes(&self, ns: &str) -> ResourceApi<ServiceClass> {
        ResourceApi::namespaced(self.client.clone(), ns)
    }

    /// Instances in `ns`
    pub fn instances(&self, ns: &str) -> ResourceApi<Instance> {
        ResourceApi::namespaced(self.client.clone(), ns)
    }

    /// Bindings in `ns`
    pub fn bindings(&self, ns: &str) -> ResourceApi<Binding> {
        ResourceApi::namespaced(self.client.clone(), ns)
    }

    /// The underlying [`Client`]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Resources the apiserver serves in this group version
    pub async fn served_resources(&self) -> Result<APIResourceList> {
        Ok(self.client.list_api_group_resources(API_VERSION).await?)
    }
}

impl From<Client> for ServicecatalogV1alpha1Client {
    fn from(client: Client) -> Self {
        Self::new(client)
    }
}

// Adds the default user agent unless one is configured
fn with_group_defaults(mut config: Config) -> Result<Config> {
    if !config.headers.iter().any(|(name, _)| *name == USER_AGENT) {
        let agent = HeaderValue::from_str(&default_user_agent()).map_err(Error::InvalidUserAgent)?;
        config.headers.push((USER_AGENT, agent));
    }
    Ok(config)
}

/// All group clients of the service catalog, sharing one [`Client`]
#[derive(Clone)]
pub struct Clientset {
    servicecatalog_v1alpha1: ServicecatalogV1alpha1Client,
}

impl Clientset {
    /// Wrap an existing [`Client`]
    pub fn new(client: Client) -> Self {
        Self {
            servicecatalog_v1alpha1: ServicecatalogV1alpha1Client::new(client),
        }
    }

    /// Build a clientset from a [`Config`]
    pub fn try_from_config(config: Config) -> Result<Self> {
        Ok(Self {
            servicecatalog_v1alpha1: ServicecatalogV1alpha1Client::try_from_config(config)?,
        })
    }

    /// Build a clientset from the inferred [`Config`]
    pub async fn try_default() -> Result<Self> {
        Ok(Self {
            servicecatalog_v1alpha1: ServicecatalogV1alpha1Client::try_default().await?,
        })
    }

    /// Client for `servicecatalog.k8s.io/v1alpha1`
    pub fn servicecatalog_v1alpha1(&self) -> &ServicecatalogV1alpha1Client {
        &self.servicecatalog_v1alpha1
    }

    /// Client for the preferred version of `servicecatalog.k8s.io`
    pub fn servicecatalog(&self) -> &ServicecatalogV1alpha1Client {
        &self.servicecatalog_v1alpha1
    }
}
