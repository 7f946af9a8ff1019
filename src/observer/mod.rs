//! Callbacks through which a pipeline run reports to its presentation layer.

pub mod mock;

pub use mock::{ObservedEvent, RecordingObserver};

use crate::models::CardData;
use crate::pipeline::RunState;

/// Receives progress, results, and failures of a pipeline run.
///
/// Exactly one of `on_success` or `on_error` fires per accepted run.
pub trait PipelineObserver: Send + Sync {
    fn on_progress(&self, stage_text: &str);
    fn on_success(&self, cards: &[CardData]);
    fn on_error(&self, message: &str);

    /// Called after every run-state change, in order.
    fn on_state_change(&self, _state: RunState) {}
}

/// Observer that only logs; used by the command-line driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_progress(&self, stage_text: &str) {
        tracing::info!("{}", stage_text);
    }

    fn on_success(&self, cards: &[CardData]) {
        for card in cards {
            tracing::info!("Card ready: {} = {}", card.arabic_word, card.english_translation);
        }
    }

    fn on_error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn on_state_change(&self, state: RunState) {
        tracing::debug!("Pipeline is {}", state);
    }
}
