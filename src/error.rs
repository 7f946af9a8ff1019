//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Please enter a word or category")]
    InvalidInput,

    #[error("Unable to get valid data from the model: {0}")]
    Expansion(String),

    #[error("Image generation failed: {0}")]
    Synthesis(String),

    #[error("Card assembly invariant violated: {terms} terms but {images} images")]
    AssemblyInvariant { terms: usize, images: usize },

    #[error("A generation run is already in progress")]
    Busy,

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Gemini API error (status {status}): {body}")]
    ApiStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
