use svcat::{api::ListParams, clientset::Clientset, ResourceExt};
use tracing::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let clientset = Clientset::try_default().await?;
    let catalog = clientset.servicecatalog_v1alpha1();

    let served = catalog.served_resources().await?;
    for r in &served.resources {
        info!("{} serves {} (namespaced: {})", served.group_version, r.name, r.namespaced);
    }

    for broker in catalog.brokers().list(&ListParams::default()).await? {
        let ready = broker.status.as_ref().is_some_and(|s| s.is_ready());
        info!("broker {} at {} ready={}", broker.name_any(), broker.spec.url, ready);
    }

    let namespace = std::env::var("NAMESPACE").unwrap_or_else(|_| "default".into());
    for class in catalog.service_classes(&namespace).list(&ListParams::default()).await? {
        let plans: Vec<_> = class.plans.iter().map(|p| p.name.as_str()).collect();
        info!("class {} from {}: plans {:?}", class.name_any(), class.broker_name, plans);
    }
    Ok(())
}
