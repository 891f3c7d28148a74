//! DALL-E image generation.

use crate::errors::ServiceError;
use crate::openai::OpenAiClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Sizes accepted by the image endpoint.
pub const IMAGE_SIZES: &[&str] = &["256x256", "512x512", "1024x1024"];

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate `n` images for `prompt`, returning their URLs.
    async fn generate(&self, prompt: &str, size: &str, n: u8) -> Result<Vec<String>, ServiceError>;
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

#[async_trait]
impl ImageGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str, size: &str, n: u8) -> Result<Vec<String>, ServiceError> {
        if self.api_key.is_empty() {
            return Err(ServiceError::NotConfigured("OpenAI API key is not set".into()));
        }

        let resp = self
            .http
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ImageRequest { prompt, n, size })
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::from_response("openai images", status.as_u16(), &body));
        }

        let body: ImageResponse = resp.json().await?;
        let urls: Vec<String> = body.data.into_iter().filter_map(|d| d.url).collect();
        if urls.is_empty() {
            return Err(ServiceError::InvalidResponse("no image URLs returned".into()));
        }

        info!("Generated {} image(s)", urls.len());
        Ok(urls)
    }
}
