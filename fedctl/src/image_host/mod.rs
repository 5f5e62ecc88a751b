//! Image hosting abstraction.
//!
//! Profile photos and gallery images live on an external image host; the
//! database only stores the hosted URLs plus a deletion handle.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ImageHostConfig;

pub mod dummy;
pub mod imgbb;

/// Create an image host from configuration.
pub fn create_host(config: ImageHostConfig, timeout: Duration) -> Arc<dyn ImageHost> {
    match config {
        ImageHostConfig::Imgbb(imgbb_config) => Arc::new(imgbb::ImgBbHost::new(imgbb_config, timeout)),
        ImageHostConfig::Dummy => Arc::new(dummy::DummyHost::default()),
    }
}

/// Result type for image host operations
pub type Result<T> = std::result::Result<T, ImageHostError>;

#[derive(Debug, thiserror::Error)]
pub enum ImageHostError {
    #[error("Image host API error: {0}")]
    Api(String),

    #[error("Malformed image host response: {0}")]
    InvalidResponse(String),
}

/// A successfully hosted image.
#[derive(Debug, Clone)]
pub struct HostedImage {
    pub url: String,
    pub thumb_url: Option<String>,
    pub delete_url: Option<String>,
}

/// Abstract image hosting interface.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload raw image bytes under a display name.
    async fn upload(&self, image: &[u8], name: &str) -> Result<HostedImage>;

    /// Remove a previously uploaded image using its deletion handle.
    ///
    /// Failures here are logged by callers but never block the surrounding
    /// operation: a dangling remote image is preferable to a failed delete.
    async fn delete(&self, delete_url: &str) -> Result<()>;
}
