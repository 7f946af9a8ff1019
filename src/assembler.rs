//! Pairs expanded terms with their generated images to produce display cards.

use crate::models::{CardData, GeneratedImage, TermSet};
use crate::{Error, Result};
use base64::Engine as _;

/// Encode image bytes as a self-contained `data:` URI.
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Zip `terms` and `images` positionally into cards.
///
/// `images[i]` must illustrate `terms[i]`; a length or index mismatch is an
/// internal defect and yields [`Error::AssemblyInvariant`].
pub fn assemble(terms: &TermSet, images: &[GeneratedImage]) -> Result<Vec<CardData>> {
    let misplaced = images.iter().enumerate().any(|(i, image)| image.index != i);
    if terms.len() != images.len() || misplaced {
        tracing::error!(
            "Cannot assemble {} terms with {} images (misplaced: {})",
            terms.len(),
            images.len(),
            misplaced
        );
        return Err(Error::AssemblyInvariant {
            terms: terms.len(),
            images: images.len(),
        });
    }

    Ok(terms
        .iter()
        .zip(images)
        .map(|(term, generated)| CardData {
            image_url: to_data_uri(&generated.image.mime_type, &generated.image.bytes),
            arabic_word: term.source_term.clone(),
            english_translation: term.target_term.clone(),
        })
        .collect())
}
