use either::Either::{Left, Right};
use futures::{StreamExt, TryStreamExt};
use k8s_openapi::api::core::v1::LocalObjectReference;
use serde_json::json;
use svcat::{
    api::{DeleteParams, PostParams, WatchEvent, WatchOptions},
    apis::servicecatalog::v1alpha1::{Binding, BindingSpec, Instance, InstanceSpec},
    clientset::Clientset,
    ResourceExt,
};
use tracing::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,svcat=debug".into()),
        )
        .init();
    let clientset = Clientset::try_default().await?;
    let catalog = clientset.servicecatalog();
    let namespace = std::env::var("NAMESPACE").unwrap_or_else(|_| "default".into());
    let class = std::env::var("SERVICE_CLASS").unwrap_or_else(|_| "user-provided-service".into());

    let instances = catalog.instances(&namespace);
    let bindings = catalog.bindings(&namespace);
    let pp = PostParams::default();

    let instance = Instance::new("demo-instance", InstanceSpec {
        service_class_name: class,
        plan_name: "default".into(),
        parameters: Some(json!({ "credentials": { "user": "demo" } })),
        ..InstanceSpec::default()
    });
    let instance = instances.create(&pp, &instance).await?;
    info!("created instance {} at {:?}", instance.name_any(), instance.resource_version());

    let binding = Binding::new("demo-binding", BindingSpec {
        instance_ref: LocalObjectReference {
            name: instance.name_any(),
        },
        secret_name: "demo-credentials".into(),
        ..BindingSpec::default()
    });
    let binding = bindings.create(&pp, &binding).await?;
    let version = binding.resource_version().unwrap_or_else(|| "0".into());

    // Wait for the binding controller to report readiness
    let wo = WatchOptions::default()
        .at(&version)
        .fields(&format!("metadata.name={}", binding.name_any()))
        .timeout(30);
    let mut stream = bindings.watch(&wo).await?.boxed();
    while let Some(event) = stream.try_next().await? {
        match event {
            WatchEvent::Modified(b) if b.status.as_ref().is_some_and(|s| s.is_ready()) => {
                info!("binding ready, credentials in secret {}", b.spec.secret_name);
                break;
            }
            WatchEvent::Error(e) => {
                warn!("binding watch failed: {}", e);
                break;
            }
            other => debug!("binding event: {:?}", other),
        }
    }

    let dp = DeleteParams::default();
    for result in [
        bindings.delete("demo-binding", &dp).await.map(|r| r.map_left(|b| b.name_any())),
        instances.delete("demo-instance", &dp).await.map(|r| r.map_left(|i| i.name_any())),
    ] {
        match result? {
            Left(name) => info!("deleting {}", name),
            Right(status) => info!("deleted: {:?}", status),
        }
    }
    Ok(())
}
