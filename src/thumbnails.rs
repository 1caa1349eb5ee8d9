use crate::attachment::AttachmentRef;
use crate::error::{DashboardError, Result};
use futures::future::join_all;
use image::DynamicImage;
use log::warn;
use reqwest::Client;
use std::time::Duration;

/// Per-image wait before the region is left blank
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Download and decode one thumbnail
pub async fn fetch_thumbnail(client: &Client, url: &str) -> Result<DynamicImage> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    image::load_from_memory(&bytes)
        .map_err(|e| DashboardError::Render(format!("cannot decode {url}: {e}")))
}

/// Fetch every attachment thumbnail concurrently.
///
/// The output lines up with `attachments`. Slots without a thumbnail, failed downloads
/// and downloads that outlive `timeout` are `None`; the last two are logged.
pub async fn wait_for_thumbnails(
    client: &Client,
    attachments: &[AttachmentRef],
    timeout: Duration,
) -> Vec<Option<DynamicImage>> {
    let fetches = attachments.iter().map(|attachment| async move {
        let url = attachment.thumbnail.as_deref()?;
        match tokio::time::timeout(timeout, fetch_thumbnail(client, url)).await {
            Ok(Ok(image)) => Some(image),
            Ok(Err(e)) => {
                warn!("thumbnail for {} failed: {}", attachment.caption(), e);
                None
            }
            Err(_) => {
                warn!(
                    "thumbnail for {} timed out after {:?}",
                    attachment.caption(),
                    timeout
                );
                None
            }
        }
    });

    join_all(fetches).await
}
