//! Illustrated flashcard generator
//!
//! Turns a word or category into one or four flashcards: each card pairs an
//! AI-generated photograph with an Arabic term and its English translation.

pub mod ai;
pub mod assembler;
pub mod error;
pub mod models;
pub mod observer;
pub mod pipeline;
pub mod prompts;

pub use error::{Error, Result};
