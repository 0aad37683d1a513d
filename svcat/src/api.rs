//! Typed accessors for service catalog resources
//!
//! A [`ResourceApi`] offers one method per verb of the API and hands the request to the
//! [`Client`]. Nothing is retried or cached here.
use std::fmt::Debug;

use either::Either;
use futures::{Stream, StreamExt};
use k8s_openapi::NamespaceResourceScope;
use kube::{Client, Resource};
use serde::{de::DeserializeOwned, Serialize};

pub use kube::core::{
    object::ObjectList,
    params::{DeleteParams, GetParams, ListParams, Patch, PatchParams, PostParams, Preconditions, PropagationPolicy},
    response::Status,
    WatchEvent,
};

use crate::{Error, Result};

/// Filters passed along with a watch
///
/// Only what is set here reaches the apiserver. There is no default timeout and
/// bookmarks are off unless asked for, so the server decides both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatchOptions {
    /// Only watch objects whose labels match
    pub label_selector: Option<String>,
    /// Only watch objects whose fields match
    pub field_selector: Option<String>,
    /// Start after this resource version
    pub resource_version: Option<String>,
    /// Ask the apiserver to end the watch after this many seconds
    pub timeout: Option<u32>,
    /// Ask for `BOOKMARK` events
    pub bookmarks: bool,
}

impl WatchOptions {
    /// Filter by a label selector, e.g. `app=blog`
    #[must_use]
    pub fn labels(mut self, label_selector: &str) -> Self {
        self.label_selector = Some(label_selector.to_string());
        self
    }

    /// Filter by a field selector, e.g. `metadata.name=ups`
    #[must_use]
    pub fn fields(mut self, field_selector: &str) -> Self {
        self.field_selector = Some(field_selector.to_string());
        self
    }

    /// Start the watch after a known resource version
    #[must_use]
    pub fn at(mut self, resource_version: &str) -> Self {
        self.resource_version = Some(resource_version.to_string());
        self
    }

    /// Server side timeout in seconds
    #[must_use]
    pub fn timeout(mut self, timeout_secs: u32) -> Self {
        self.timeout = Some(timeout_secs);
        self
    }

    /// Request bookmark events
    #[must_use]
    pub fn bookmarks(mut self) -> Self {
        self.bookmarks = true;
        self
    }

    /// The watch target for a collection path
    ///
    /// Watches are a `GET` on the collection with `watch=true`, not on a `/watch/` prefixed path.
    pub(crate) fn target(&self, collection: &str) -> String {
        let mut qp = form_urlencoded::Serializer::new(String::new());
        qp.append_pair("watch", "true");
        if let Some(rv) = &self.resource_version {
            qp.append_pair("resourceVersion", rv);
        }
        if let Some(labels) = &self.label_selector {
            qp.append_pair("labelSelector", labels);
        }
        if let Some(fields) = &self.field_selector {
            qp.append_pair("fieldSelector", fields);
        }
        if let Some(timeout) = self.timeout {
            qp.append_pair("timeoutSeconds", &timeout.to_string());
        }
        if self.bookmarks {
            qp.append_pair("allowWatchBookmarks", "true");
        }
        format!("{collection}?{}", qp.finish())
    }
}

/// Accessor for one kind of service catalog resource
///
/// Wraps a [`kube::Api`] for the verbs it covers as they are, and issues watches itself.
#[derive(Clone)]
pub struct ResourceApi<K> {
    api: kube::Api<K>,
    client: Client,
    url: String,
}

impl<K> ResourceApi<K>
where
    K: Resource<DynamicType = ()>,
{
    /// Cluster scoped resources, or namespaced resources across all namespaces
    pub fn all(client: Client) -> Self {
        Self {
            url: K::url_path(&(), None),
            api: kube::Api::all(client.clone()),
            client,
        }
    }

    /// Namespaced resources in `ns`
    pub fn namespaced(client: Client, ns: &str) -> Self
    where
        K: Resource<Scope = NamespaceResourceScope>,
    {
        Self {
            url: K::url_path(&(), Some(ns)),
            api: kube::Api::namespaced(client.clone(), ns),
            client,
        }
    }

    /// The collection path requests are made against
    pub fn resource_url(&self) -> &str {
        &self.url
    }

    /// The wrapped [`kube::Api`]
    pub fn inner(&self) -> &kube::Api<K> {
        &self.api
    }
}

impl<K> ResourceApi<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    /// Get a named object
    pub async fn get(&self, name: &str) -> Result<K> {
        Ok(self.api.get(name).await?)
    }

    /// Get a named object, as of a resource version
    pub async fn get_with(&self, name: &str, gp: &GetParams) -> Result<K> {
        Ok(self.api.get_with(name, gp).await?)
    }

    /// Get a named object, or `None` when the apiserver reports it as not found
    pub async fn get_opt(&self, name: &str) -> Result<Option<K>> {
        Ok(self.api.get_opt(name).await?)
    }

    /// List the collection
    pub async fn list(&self, lp: &ListParams) -> Result<ObjectList<K>> {
        Ok(self.api.list(lp).await?)
    }

    /// Create an object
    pub async fn create(&self, pp: &PostParams, data: &K) -> Result<K>
    where
        K: Serialize,
    {
        Ok(self.api.create(pp, data).await?)
    }

    /// Update a named object with a full replacement
    pub async fn replace(&self, name: &str, pp: &PostParams, data: &K) -> Result<K>
    where
        K: Serialize,
    {
        Ok(self.api.replace(name, pp, data).await?)
    }

    /// Patch a named object
    pub async fn patch<P: Serialize + Debug>(
        &self,
        name: &str,
        pp: &PatchParams,
        patch: &Patch<P>,
    ) -> Result<K> {
        Ok(self.api.patch(name, pp, patch).await?)
    }

    /// Delete a named object
    ///
    /// `Left` is the object while finalizers still hold it, `Right` the status once it is gone.
    pub async fn delete(&self, name: &str, dp: &DeleteParams) -> Result<Either<K, Status>> {
        Ok(self.api.delete(name, dp).await?)
    }

    /// Delete every object matching the list filters
    pub async fn delete_collection(
        &self,
        dp: &DeleteParams,
        lp: &ListParams,
    ) -> Result<Either<ObjectList<K>, Status>> {
        Ok(self.api.delete_collection(dp, lp).await?)
    }

    /// Watch the collection
    ///
    /// Issues `GET <collection>?watch=true` with the given options and decodes each line of
    /// the response as a [`WatchEvent`]. Dropping the stream closes the connection.
    pub async fn watch(&self, wo: &WatchOptions) -> Result<impl Stream<Item = Result<WatchEvent<K>>>> {
        let target = wo.target(&self.url);
        tracing::trace!(%target, "opening watch");
        let mut req = http::Request::get(target)
            .body(vec![])
            .map_err(Error::BuildRequest)?;
        req.extensions_mut().insert("watch");
        let events = self.client.request_events::<K>(req).await?;
        Ok(events.map(|event| event.map_err(Error::from)))
    }

    /// Get the `status` subresource of a named object
    pub async fn get_status(&self, name: &str) -> Result<K> {
        Ok(self.api.get_status(name).await?)
    }

    /// Patch the `status` subresource of a named object
    pub async fn patch_status<P: Serialize + Debug>(
        &self,
        name: &str,
        pp: &PatchParams,
        patch: &Patch<P>,
    ) -> Result<K> {
        Ok(self.api.patch_status(name, pp, patch).await?)
    }

    /// Replace the `status` subresource of a named object
    pub async fn replace_status(&self, name: &str, pp: &PostParams, data: &K) -> Result<K>
    where
        K: Serialize,
    {
        let body = serde_json::to_vec(data).map_err(Error::SerializeBody)?;
        Ok(self.api.replace_status(name, pp, body).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTANCES: &str = "/apis/servicecatalog.k8s.io/v1alpha1/namespaces/ns/instances";

    #[test]
    fn watch_passes_only_given_options() {
        assert_eq!(WatchOptions::default().target(INSTANCES), format!("{INSTANCES}?watch=true"));

        let wo = WatchOptions::default()
            .at("42")
            .labels("app=blog")
            .fields("metadata.name=db")
            .timeout(600)
            .bookmarks();
        assert_eq!(
            wo.target(INSTANCES),
            format!(
                "{INSTANCES}?watch=true&resourceVersion=42&labelSelector=app%3Dblog\
                 &fieldSelector=metadata.name%3Ddb&timeoutSeconds=600&allowWatchBookmarks=true"
            )
        );
    }

    #[test]
    fn watch_defaults_are_empty() {
        let wo = WatchOptions::default();
        assert!(!wo.bookmarks);
        assert_eq!(wo.timeout, None);
    }
}
