use futures::{StreamExt, TryStreamExt};
use svcat::{
    api::{WatchEvent, WatchOptions},
    clientset::ServicecatalogV1alpha1Client,
    ResourceExt,
};
use tracing::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let catalog = ServicecatalogV1alpha1Client::try_default().await?;
    let brokers = catalog.brokers();

    // The stream ends when the apiserver closes the watch, here after at most a minute
    let wo = WatchOptions::default().timeout(60).bookmarks();
    let mut stream = brokers.watch(&wo).await?.boxed();
    while let Some(event) = stream.try_next().await? {
        match event {
            WatchEvent::Added(b) => info!("added {} at {}", b.name_any(), b.spec.url),
            WatchEvent::Modified(b) => {
                let ready = b.status.as_ref().is_some_and(|s| s.is_ready());
                info!("modified {} ready={}", b.name_any(), ready)
            }
            WatchEvent::Deleted(b) => info!("deleted {}", b.name_any()),
            WatchEvent::Bookmark(bm) => debug!("bookmark at {}", bm.metadata.resource_version),
            WatchEvent::Error(e) => warn!("watch error: {}", e),
        }
    }
    Ok(())
}
