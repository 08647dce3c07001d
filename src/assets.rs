use async_trait::async_trait;

/// External image pipeline: QR rendering plus blob storage that hands back a
/// public URL. The backend depends only on this seam; deployments without
/// the pipeline run on [`DisabledAssets`].
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Render a QR image for the payload and store it. `None` means the
    /// capability is switched off (or declined the upload) and the caller
    /// proceeds without a URL.
    async fn publish_qr(&self, payload: &str) -> Option<String>;
}

pub struct DisabledAssets;

#[async_trait]
impl AssetStore for DisabledAssets {
    async fn publish_qr(&self, _payload: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
pub(crate) struct StaticAssets(pub &'static str);

#[cfg(test)]
#[async_trait]
impl AssetStore for StaticAssets {
    async fn publish_qr(&self, payload: &str) -> Option<String> {
        Some(format!("{}/{payload}.png", self.0))
    }
}
