use super::{ImageSynthesisService, TermExpansionService};
use crate::models::{EncodedImage, TermSet};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Smallest valid JPEG header; enough for MIME sniffing.
const PLACEHOLDER_JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

/// Expander that replays canned JSON bodies through [`TermSet::from_json`].
#[derive(Clone)]
pub struct MockTermExpander {
    responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl MockTermExpander {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_json_response(self, body: &str) -> Self {
        self.responses.lock().unwrap().push(body.to_string());
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }

    pub fn get_inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl Default for MockTermExpander {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TermExpansionService for MockTermExpander {
    async fn expand(&self, raw_input: &str) -> Result<TermSet> {
        let count = {
            let mut inputs = self.inputs.lock().unwrap();
            inputs.push(raw_input.to_string());
            inputs.len()
        };

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::Expansion(message));
        }

        let body = {
            let responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                // Default mock response: treat the input as a single concept
                serde_json::json!({
                    "cards": [{
                        "arabic": raw_input,
                        "english": raw_input,
                        "imagePrompt": format!("a photo of {}", raw_input)
                    }]
                })
                .to_string()
            } else {
                responses[(count - 1) % responses.len()].clone()
            }
        };

        TermSet::from_json(&body)
    }
}

/// Image synthesizer with per-prompt failures and delays.
#[derive(Clone)]
pub struct MockImageSynthesizer {
    images: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failures: Arc<Mutex<HashMap<String, String>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<Mutex<usize>>,
    max_in_flight: Arc<Mutex<usize>>,
}

impl MockImageSynthesizer {
    pub fn new() -> Self {
        Self {
            images: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            delays: Arc::new(Mutex::new(HashMap::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(Mutex::new(0)),
            max_in_flight: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image_for(self, prompt: &str, bytes: Vec<u8>) -> Self {
        self.images
            .lock()
            .unwrap()
            .insert(prompt.to_string(), bytes);
        self
    }

    pub fn with_failure_for(self, prompt: &str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(prompt.to_string(), message.to_string());
        self
    }

    pub fn with_delay_for(self, prompt: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(prompt.to_string(), delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts in the order the calls were issued.
    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Highest number of calls that were running at the same time.
    pub fn get_max_in_flight(&self) -> usize {
        *self.max_in_flight.lock().unwrap()
    }

    async fn respond(&self, prompt: &str) -> Result<EncodedImage> {
        let delay = self.delays.lock().unwrap().get(prompt).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failures.lock().unwrap().get(prompt) {
            return Err(Error::Synthesis(message.clone()));
        }

        let bytes = self
            .images
            .lock()
            .unwrap()
            .get(prompt)
            .cloned()
            .unwrap_or_else(|| PLACEHOLDER_JPEG.to_vec());

        Ok(EncodedImage::new(super::mime::detect_image_mime(&bytes), bytes))
    }
}

impl Default for MockImageSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSynthesisService for MockImageSynthesizer {
    async fn synthesize(&self, prompt: &str) -> Result<EncodedImage> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            *in_flight += 1;
            let mut max = self.max_in_flight.lock().unwrap();
            *max = (*max).max(*in_flight);
        }

        let result = self.respond(prompt).await;

        *self.in_flight.lock().unwrap() -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_expander_default_is_single_concept() {
        let expander = MockTermExpander::new();

        let set = expander.expand("قطة").await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.terms()[0].source_term, "قطة");
        assert_eq!(expander.get_inputs(), vec!["قطة".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_expander_cycles_responses() {
        let expander = MockTermExpander::new()
            .with_json_response(r#"{"cards":[{"arabic":"a","english":"b","imagePrompt":"c"}]}"#)
            .with_json_response(r#"{"cards":[]}"#);

        assert!(expander.expand("x").await.is_ok());
        assert!(matches!(
            expander.expand("x").await,
            Err(Error::Expansion(_))
        ));
        assert!(expander.expand("x").await.is_ok());
        assert_eq!(expander.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_synthesizer_returns_configured_bytes() {
        let synth = MockImageSynthesizer::new().with_image_for("cat", vec![0x89, 0x50, 0x4E, 0x47]);

        let image = synth.synthesize("cat").await.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, vec![0x89, 0x50, 0x4E, 0x47]);

        let fallback = synth.synthesize("dog").await.unwrap();
        assert_eq!(fallback.mime_type, "image/jpeg");
        assert_eq!(synth.get_prompts(), vec!["cat", "dog"]);
        // Sequential calls never overlap
        assert_eq!(synth.get_max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_mock_synthesizer_failure() {
        let synth = MockImageSynthesizer::new().with_failure_for("cat", "quota exceeded");

        let err = synth.synthesize("cat").await.unwrap_err();
        assert!(matches!(err, Error::Synthesis(ref msg) if msg == "quota exceeded"));
        assert_eq!(synth.get_call_count(), 1);
    }
}
