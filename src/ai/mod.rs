//! AI service integration for term expansion and image synthesis
//!
//! The pipeline talks to these traits only; `gemini` provides the REST
//! implementations and `mock` provides scriptable stand-ins for tests.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiImageSynthesizer, GeminiTermExpander};
pub use mock::{MockImageSynthesizer, MockTermExpander};

use crate::models::{EncodedImage, TermSet};
use crate::Result;
use async_trait::async_trait;

/// Classifies raw input and expands it into 1 or 4 term records.
///
/// Failures are reported as [`crate::Error::Expansion`].
#[async_trait]
pub trait TermExpansionService: Send + Sync {
    async fn expand(&self, raw_input: &str) -> Result<TermSet>;
}

/// Produces one square photographic image for a prompt.
///
/// Failures are reported as [`crate::Error::Synthesis`].
#[async_trait]
pub trait ImageSynthesisService: Send + Sync {
    async fn synthesize(&self, prompt: &str) -> Result<EncodedImage>;
}
