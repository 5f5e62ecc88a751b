//! ImgBB image host client.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;
use url::Url;

use super::{HostedImage, ImageHost, ImageHostError, Result};
use crate::config::ImgBbConfig;

pub struct ImgBbHost {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
    delete_url: Option<String>,
    thumb: Option<ThumbData>,
}

#[derive(Debug, Deserialize)]
struct ThumbData {
    url: String,
}

impl ImgBbHost {
    pub fn new(config: ImgBbConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client construction cannot fail with these options");

        Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
        }
    }
}

#[async_trait]
impl ImageHost for ImgBbHost {
    #[instrument(skip(self, image), fields(name = %name, bytes = image.len()), err)]
    async fn upload(&self, image: &[u8], name: &str) -> Result<HostedImage> {
        let endpoint = self
            .base_url
            .join("/1/upload")
            .map_err(|e| ImageHostError::Api(format!("invalid upload URL: {e}")))?;

        let form = [
            ("key", self.api_key.clone()),
            ("image", BASE64_STANDARD.encode(image)),
            ("name", name.to_string()),
        ];

        let response = self
            .client
            .post(endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| ImageHostError::Api(format!("upload request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageHostError::Api(format!("upload returned {status}: {body}")));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImageHostError::InvalidResponse(e.to_string()))?;

        let data = match (upload.success, upload.data) {
            (true, Some(data)) => data,
            _ => return Err(ImageHostError::InvalidResponse("upload reported failure".to_string())),
        };

        Ok(HostedImage {
            url: data.url,
            thumb_url: data.thumb.map(|t| t.url),
            delete_url: data.delete_url,
        })
    }

    #[instrument(skip(self, delete_url), err)]
    async fn delete(&self, delete_url: &str) -> Result<()> {
        // ImgBB has no formal deletion API; the delete handle is a web page
        // that removes the image when visited.
        let response = self
            .client
            .get(delete_url)
            .send()
            .await
            .map_err(|e| ImageHostError::Api(format!("delete request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageHostError::Api(format!("delete returned {status}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn host_for(server: &MockServer) -> ImgBbHost {
        ImgBbHost::new(
            ImgBbConfig {
                api_key: "k".to_string(),
                base_url: Url::parse(&server.uri()).unwrap(),
            },
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn upload_parses_hosted_image() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/1/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": {
                    "url": "https://i.ibb.co/abc/foto.jpg",
                    "delete_url": "https://ibb.co/abc/delete",
                    "thumb": { "url": "https://i.ibb.co/abc/foto-thumb.jpg" }
                }
            })))
            .mount(&server)
            .await;

        let host = host_for(&server);
        let hosted = host.upload(b"fake-image-bytes", "foto").await.unwrap();

        assert_eq!(hosted.url, "https://i.ibb.co/abc/foto.jpg");
        assert_eq!(hosted.thumb_url.as_deref(), Some("https://i.ibb.co/abc/foto-thumb.jpg"));
        assert_eq!(hosted.delete_url.as_deref(), Some("https://ibb.co/abc/delete"));
    }

    #[tokio::test]
    async fn upload_failure_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/1/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": false })))
            .mount(&server)
            .await;

        let host = host_for(&server);
        let result = host.upload(b"bytes", "foto").await;
        assert!(matches!(result, Err(ImageHostError::InvalidResponse(_))));
    }
}
