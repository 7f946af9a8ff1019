use super::client::GeminiHttpClient;
use super::types::PredictResponse;
use crate::ai::{mime, ImageSynthesisService};
use crate::models::EncodedImage;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const OUTPUT_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: String,
    output_options: OutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: String,
}

pub struct GeminiImageSynthesizer {
    http: GeminiHttpClient,
}

impl GeminiImageSynthesizer {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }

    async fn request_image(&self, prompt: &str) -> Result<EncodedImage> {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "1:1".to_string(),
                output_options: OutputOptions {
                    mime_type: OUTPUT_MIME_TYPE.to_string(),
                },
            },
        };

        let response: PredictResponse = self.http.predict(&request).await?;

        let prediction = response
            .predictions
            .first()
            .ok_or_else(|| Error::AiProvider("No images in Imagen response".to_string()))?;

        let data = match (&prediction.bytes_base64_encoded, &prediction.rai_filtered_reason) {
            (Some(data), _) => data,
            (None, Some(reason)) => {
                return Err(Error::AiProvider(format!("Image was filtered: {}", reason)));
            }
            (None, None) => {
                return Err(Error::AiProvider(
                    "No image data in Imagen response".to_string(),
                ));
            }
        };

        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| Error::AiProvider(format!("Failed to decode Imagen base64 image: {}", e)))?;

        let mime_type = mime::resolve_image_mime(prediction.mime_type.as_deref(), &bytes);

        tracing::debug!(
            "Imagen returned image with mime_type: {} ({} bytes)",
            mime_type,
            bytes.len()
        );

        Ok(EncodedImage { mime_type, bytes })
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiImageSynthesizer);

#[async_trait]
impl ImageSynthesisService for GeminiImageSynthesizer {
    async fn synthesize(&self, prompt: &str) -> Result<EncodedImage> {
        self.request_image(prompt).await.map_err(|e| {
            tracing::error!("Image synthesis failed for prompt {:?}: {}", prompt, e);
            Error::Synthesis(e.to_string())
        })
    }
}
