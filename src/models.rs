//! Data models and structures
//!
//! Defines the term records produced by expansion, the images produced by
//! synthesis, the display-ready cards, and runtime configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One source-language term, its translation, and a prompt describing it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermRecord {
    #[serde(rename = "arabic")]
    pub source_term: String,
    #[serde(rename = "english")]
    pub target_term: String,
    #[serde(rename = "imagePrompt")]
    pub image_prompt: String,
}

impl TermRecord {
    pub fn new(source_term: &str, target_term: &str, image_prompt: &str) -> Self {
        Self {
            source_term: source_term.to_string(),
            target_term: target_term.to_string(),
            image_prompt: image_prompt.to_string(),
        }
    }

    fn blank_field(&self) -> Option<&'static str> {
        if self.source_term.trim().is_empty() {
            Some("arabic")
        } else if self.target_term.trim().is_empty() {
            Some("english")
        } else if self.image_prompt.trim().is_empty() {
            Some("imagePrompt")
        } else {
            None
        }
    }
}

/// Raw shape of the structured expansion response.
#[derive(Debug, Deserialize)]
struct ExpansionPayload {
    #[serde(default)]
    cards: Option<Vec<TermRecord>>,
}

/// Ordered terms for a single run: one concept or a four-card category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermSet {
    terms: Vec<TermRecord>,
}

impl TermSet {
    /// Card counts the expansion stage is allowed to produce.
    pub const ALLOWED_LENGTHS: [usize; 2] = [1, 4];

    pub fn new(terms: Vec<TermRecord>) -> Result<Self> {
        if terms.is_empty() {
            return Err(Error::Expansion("response contained no cards".to_string()));
        }
        if !Self::ALLOWED_LENGTHS.contains(&terms.len()) {
            return Err(Error::Expansion(format!(
                "expected 1 or 4 cards, got {}",
                terms.len()
            )));
        }
        for (i, term) in terms.iter().enumerate() {
            if let Some(field) = term.blank_field() {
                return Err(Error::Expansion(format!(
                    "card {} has an empty {}",
                    i, field
                )));
            }
        }
        Ok(Self { terms })
    }

    /// Parse the JSON text returned by the structured-output call.
    pub fn from_json(text: &str) -> Result<Self> {
        let payload: ExpansionPayload = serde_json::from_str(text)
            .map_err(|e| Error::Expansion(format!("invalid JSON in response: {}", e)))?;
        Self::new(payload.cards.unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_category(&self) -> bool {
        self.terms.len() > 1
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TermRecord> {
        self.terms.iter()
    }

    pub fn terms(&self) -> &[TermRecord] {
        &self.terms
    }
}

impl<'a> IntoIterator for &'a TermSet {
    type Item = &'a TermRecord;
    type IntoIter = std::slice::Iter<'a, TermRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

/// Encoded image payload as returned by the image service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn new(mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            bytes,
        }
    }
}

/// An image tagged with the position of the term it illustrates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub index: usize,
    pub image: EncodedImage,
}

impl GeneratedImage {
    pub fn new(index: usize, image: EncodedImage) -> Self {
        Self { index, image }
    }
}

/// Display-ready flashcard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    pub image_url: String,
    pub arabic_word: String,
    pub english_translation: String,
}

// Configuration
pub const DEFAULT_EXPANSION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub expansion_model: String,
    pub image_model: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .map_err(|_| crate::Error::Config("GEMINI_API_KEY not set".to_string()))?,
            expansion_model: std::env::var("EXPANSION_MODEL")
                .unwrap_or_else(|_| DEFAULT_EXPANSION_MODEL.to_string()),
            image_model: std::env::var("IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_term_record_uses_wire_field_names() {
        let term = TermRecord::new("قطة", "cat", "a photo of a cat");

        let json = serde_json::to_string(&term).unwrap();
        assert!(json.contains("\"arabic\":\"قطة\""));
        assert!(json.contains("\"english\":\"cat\""));
        assert!(json.contains("\"imagePrompt\":\"a photo of a cat\""));
    }

    #[test]
    fn test_from_json_single_concept() {
        let set = TermSet::from_json(
            r#"{"cards":[{"arabic":"قطة","english":"cat","imagePrompt":"a photo of a cat"}]}"#,
        )
        .unwrap();

        assert_eq!(set.len(), 1);
        assert!(!set.is_category());
        assert_eq!(set.terms()[0].target_term, "cat");
    }

    #[test]
    fn test_from_json_preserves_category_order() {
        let set = TermSet::from_json(
            r#"{"cards":[
                {"arabic":"فواكه","english":"fruits","imagePrompt":"a bowl of fruit"},
                {"arabic":"تفاح","english":"apple","imagePrompt":"a red apple"},
                {"arabic":"موز","english":"banana","imagePrompt":"a banana"},
                {"arabic":"عنب","english":"grapes","imagePrompt":"green grapes"}
            ]}"#,
        )
        .unwrap();

        let english: Vec<&str> = set.iter().map(|t| t.target_term.as_str()).collect();
        assert_eq!(english, vec!["fruits", "apple", "banana", "grapes"]);
        assert!(set.is_category());
    }

    #[test]
    fn test_from_json_rejects_empty_cards() {
        let err = TermSet::from_json(r#"{"cards":[]}"#).unwrap_err();
        assert!(matches!(err, Error::Expansion(ref msg) if msg.contains("no cards")));
    }

    #[test]
    fn test_from_json_rejects_missing_cards() {
        let err = TermSet::from_json(r#"{"items":[]}"#).unwrap_err();
        assert!(matches!(err, Error::Expansion(_)));
    }

    #[test]
    fn test_from_json_rejects_malformed_json() {
        let err = TermSet::from_json("not json").unwrap_err();
        assert!(matches!(err, Error::Expansion(ref msg) if msg.contains("invalid JSON")));
    }

    #[test]
    fn test_new_rejects_unsupported_lengths() {
        let term = TermRecord::new("قطة", "cat", "a cat");
        for n in [2, 3, 5] {
            let err = TermSet::new(vec![term.clone(); n]).unwrap_err();
            assert!(
                matches!(err, Error::Expansion(ref msg) if msg.contains(&format!("got {}", n)))
            );
        }
    }

    #[test]
    fn test_new_rejects_blank_fields() {
        let err = TermSet::new(vec![TermRecord::new("قطة", "  ", "a cat")]).unwrap_err();
        assert!(matches!(err, Error::Expansion(ref msg) if msg == "card 0 has an empty english"));
    }

    #[test]
    fn test_card_data_serializes_camel_case() {
        let card = CardData {
            image_url: "data:image/jpeg;base64,AA==".to_string(),
            arabic_word: "قطة".to_string(),
            english_translation: "cat".to_string(),
        };

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["imageUrl"], "data:image/jpeg;base64,AA==");
        assert_eq!(json["arabicWord"], "قطة");
        assert_eq!(json["englishTranslation"], "cat");
    }
}
