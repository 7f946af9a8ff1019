use super::PipelineObserver;
use crate::models::CardData;
use crate::pipeline::RunState;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    Progress(String),
    Success(Vec<CardData>),
    Error(String),
}

/// Observer that records every callback for later inspection.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<ObservedEvent>>>,
    states: Arc<Mutex<Vec<RunState>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Every state the pipeline moved into, in order.
    pub fn states(&self) -> Vec<RunState> {
        self.states.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObservedEvent::Progress(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn successes(&self) -> Vec<Vec<CardData>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObservedEvent::Success(cards) => Some(cards),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObservedEvent::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ObservedEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_progress(&self, stage_text: &str) {
        self.push(ObservedEvent::Progress(stage_text.to_string()));
    }

    fn on_success(&self, cards: &[CardData]) {
        self.push(ObservedEvent::Success(cards.to_vec()));
    }

    fn on_error(&self, message: &str) {
        self.push(ObservedEvent::Error(message.to_string()));
    }

    fn on_state_change(&self, state: RunState) {
        self.states.lock().unwrap().push(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        let recorded = observer.clone();

        observer.on_progress("Analyzing input...");
        observer.on_error("boom");

        assert_eq!(
            recorded.events(),
            vec![
                ObservedEvent::Progress("Analyzing input...".to_string()),
                ObservedEvent::Error("boom".to_string()),
            ]
        );
        assert_eq!(recorded.errors(), vec!["boom".to_string()]);
        assert!(recorded.successes().is_empty());
    }
}
