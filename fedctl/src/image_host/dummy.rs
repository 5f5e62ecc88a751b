//! In-memory image host for tests and local development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::{HostedImage, ImageHost, Result};

#[derive(Default)]
pub struct DummyHost {
    counter: AtomicU64,
    deleted: Mutex<Vec<String>>,
}

impl DummyHost {
    /// Deletion handles seen so far (for assertions).
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageHost for DummyHost {
    async fn upload(&self, _image: &[u8], name: &str) -> Result<HostedImage> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(HostedImage {
            url: format!("https://images.invalid/{n}/{name}"),
            thumb_url: Some(format!("https://images.invalid/{n}/{name}/thumb")),
            delete_url: Some(format!("https://images.invalid/{n}/{name}/delete")),
        })
    }

    async fn delete(&self, delete_url: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(delete_url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_and_delete_round_trip() {
        let host = DummyHost::default();

        let hosted = host.upload(b"bytes", "foto.jpg").await.unwrap();
        assert!(hosted.url.contains("foto.jpg"));

        let delete_url = hosted.delete_url.unwrap();
        host.delete(&delete_url).await.unwrap();
        assert_eq!(host.deleted(), vec![delete_url]);
    }
}
