use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::TermExpansionService;
use crate::models::TermSet;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ExpansionRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: ExpansionGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpansionGenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// Response shape the model is constrained to: `{cards: [{arabic, english, imagePrompt}]}`.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "cards": {
                "type": "ARRAY",
                "minItems": 1,
                "maxItems": 4,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "arabic": {
                            "type": "STRING",
                            "description": "The Arabic word"
                        },
                        "english": {
                            "type": "STRING",
                            "description": "The English translation"
                        },
                        "imagePrompt": {
                            "type": "STRING",
                            "description": "Prompt for a realistic photograph of the word"
                        }
                    },
                    "required": ["arabic", "english", "imagePrompt"],
                    "propertyOrdering": ["arabic", "english", "imagePrompt"]
                }
            }
        },
        "required": ["cards"]
    })
}

pub struct GeminiTermExpander {
    http: GeminiHttpClient,
}

impl GeminiTermExpander {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
        }
    }

    async fn request_cards(&self, raw_input: &str) -> Result<String> {
        let request = ExpansionRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::Text {
                    text: prompts::term_expansion(raw_input),
                }],
            }],
            generation_config: ExpansionGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| Error::AiProvider("No text in Gemini expansion response".to_string()))
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiTermExpander);

#[async_trait]
impl TermExpansionService for GeminiTermExpander {
    async fn expand(&self, raw_input: &str) -> Result<TermSet> {
        tracing::debug!(
            "Expanding input {:?} with model {}",
            raw_input,
            self.http.model()
        );

        let text = self.request_cards(raw_input).await.map_err(|e| {
            tracing::error!("Term expansion request failed: {}", e);
            Error::Expansion(e.to_string())
        })?;

        let terms = TermSet::from_json(&text)?;
        tracing::info!(
            "Expanded input into {} term(s) ({})",
            terms.len(),
            if terms.is_category() {
                "category"
            } else {
                "single concept"
            }
        );
        Ok(terms)
    }
}
