//! Orchestrates a flashcard run: validate, expand, synthesize images, assemble.

use crate::ai::{
    GeminiImageSynthesizer, GeminiTermExpander, ImageSynthesisService, TermExpansionService,
};
use crate::assembler;
use crate::models::{CardData, Config, GeneratedImage, TermSet};
use crate::observer::PipelineObserver;
use crate::{Error, Result};
use futures::future::join_all;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Prefix of every message delivered through [`PipelineObserver::on_error`].
pub const ERROR_PREFIX: &str = "Failed to generate flashcards: ";

pub const ANALYZING_TEXT: &str = "Analyzing input...";

fn synthesizing_text(count: usize) -> String {
    if count == 1 {
        "Generating 1 image...".to_string()
    } else {
        format!("Generating {} images...", count)
    }
}

/// Message shown to the user for a failed run.
pub fn user_message(err: &Error) -> String {
    format!("{}{}", ERROR_PREFIX, err)
}

/// Where a run currently is.
///
/// `Done` and `Failed` are terminal for a run; the next invocation resets to
/// `Idle` before moving to `Validating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validating,
    Expanding,
    Synthesizing { count: usize },
    Assembling,
    Done,
    Failed,
}

impl RunState {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RunState::Validating
                | RunState::Expanding
                | RunState::Synthesizing { .. }
                | RunState::Assembling
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Validating => write!(f, "validating"),
            RunState::Expanding => write!(f, "expanding"),
            RunState::Synthesizing { count } => write!(f, "synthesizing ({})", count),
            RunState::Assembling => write!(f, "assembling"),
            RunState::Done => write!(f, "done"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// Runs the two-stage generation and reports to an observer.
pub struct Pipeline {
    expander: Box<dyn TermExpansionService>,
    synthesizer: Box<dyn ImageSynthesisService>,
    observer: Box<dyn PipelineObserver>,
    state: Mutex<RunState>,
    latest_cards: Mutex<Vec<CardData>>,
}

/// Injectable service bundle used to construct [`Pipeline`] in tests/harnesses.
pub struct PipelineServices {
    pub expander: Box<dyn TermExpansionService>,
    pub synthesizer: Box<dyn ImageSynthesisService>,
    pub observer: Box<dyn PipelineObserver>,
}

impl Pipeline {
    pub fn with_services(services: PipelineServices) -> Self {
        Self {
            expander: services.expander,
            synthesizer: services.synthesizer,
            observer: services.observer,
            state: Mutex::new(RunState::Idle),
            latest_cards: Mutex::new(Vec::new()),
        }
    }

    /// Build a pipeline backed by the Gemini and Imagen REST APIs.
    pub fn new(config: &Config, observer: Box<dyn PipelineObserver>) -> Self {
        // Reuse one HTTP connection pool across both clients.
        let http_client = reqwest::Client::new();

        info!("Expansion model: {}", config.expansion_model);
        info!("Image model: {}", config.image_model);

        Self::with_services(PipelineServices {
            expander: Box::new(GeminiTermExpander::new_with_client(
                config.gemini_api_key.clone(),
                config.expansion_model.clone(),
                http_client.clone(),
            )),
            synthesizer: Box::new(GeminiImageSynthesizer::new_with_client(
                config.gemini_api_key.clone(),
                config.image_model.clone(),
                http_client,
            )),
            observer,
        })
    }

    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True while a run is in flight; callers should disable their trigger.
    pub fn is_busy(&self) -> bool {
        self.state().is_active()
    }

    /// Cards of the most recent successful run; empty once a new run starts.
    pub fn latest_cards(&self) -> Vec<CardData> {
        self.latest_cards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run the pipeline and deliver the outcome through the observer.
    ///
    /// Returns the terminal state of the run, or [`Error::Busy`] without any
    /// side effects when another run is still in flight.
    pub async fn request_generation(&self, raw_input: &str) -> Result<RunState> {
        match self.generate(raw_input).await {
            Ok(cards) => {
                self.observer.on_success(&cards);
                Ok(RunState::Done)
            }
            Err(Error::Busy) => Err(Error::Busy),
            Err(e) => {
                self.observer.on_error(&user_message(&e));
                Ok(RunState::Failed)
            }
        }
    }

    /// Run the pipeline and return the cards directly.
    ///
    /// Progress is still reported through the observer.
    pub async fn generate(&self, raw_input: &str) -> Result<Vec<CardData>> {
        let run = self.begin_run()?;

        let run_id = Uuid::new_v4();
        let result = self
            .execute(raw_input)
            .instrument(info_span!("run", %run_id))
            .await;

        match &result {
            Ok(cards) => {
                *self
                    .latest_cards
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = cards.clone();
                run.finish(RunState::Done);
                info!(%run_id, "Run finished with {} card(s)", cards.len());
            }
            Err(e) => {
                run.finish(RunState::Failed);
                error!(%run_id, "Run failed: {}", e);
            }
        }

        result
    }

    fn begin_run(&self) -> Result<ActiveRun<'_>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_active() {
            warn!("Rejecting generation request while {}", *state);
            return Err(Error::Busy);
        }
        let reset = *state != RunState::Idle;
        if reset {
            info!("State {} -> {}", *state, RunState::Idle);
            *state = RunState::Idle;
        }
        info!("State {} -> {}", RunState::Idle, RunState::Validating);
        *state = RunState::Validating;
        drop(state);

        if reset {
            self.observer.on_state_change(RunState::Idle);
        }
        self.observer.on_state_change(RunState::Validating);

        // A new run supersedes whatever the previous one produced.
        self.latest_cards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(ActiveRun { pipeline: self })
    }

    fn transition(&self, next: RunState) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            info!("State {} -> {}", *state, next);
            *state = next;
        }
        self.observer.on_state_change(next);
    }

    async fn execute(&self, raw_input: &str) -> Result<Vec<CardData>> {
        let input = raw_input.trim();
        if input.is_empty() {
            return Err(Error::InvalidInput);
        }

        self.observer.on_progress(ANALYZING_TEXT);
        self.transition(RunState::Expanding);
        let terms = self.expander.expand(input).await?;

        self.observer.on_progress(&synthesizing_text(terms.len()));
        self.transition(RunState::Synthesizing { count: terms.len() });
        let images = self.synthesize_all(&terms).await?;

        self.transition(RunState::Assembling);
        assembler::assemble(&terms, &images)
    }

    /// Issue one synthesis call per term concurrently and wait for all of them.
    ///
    /// Results keep term order; the first failure by position fails the batch.
    async fn synthesize_all(&self, terms: &TermSet) -> Result<Vec<GeneratedImage>> {
        let requests = terms.iter().enumerate().map(|(index, term)| async move {
            self.synthesizer
                .synthesize(&term.image_prompt)
                .await
                .map(|image| GeneratedImage::new(index, image))
        });

        let results = join_all(requests).await;
        let failures = results.iter().filter(|r| r.is_err()).count();
        if failures > 0 {
            warn!(
                "{} of {} image request(s) failed; discarding the batch",
                failures,
                results.len()
            );
        }

        results.into_iter().collect()
    }
}

/// Holds the pipeline busy for one run.
///
/// A run dropped before reaching a terminal state (for example when the
/// caller's future is cancelled) is marked `Failed` so the next request is
/// accepted.
struct ActiveRun<'a> {
    pipeline: &'a Pipeline,
}

impl ActiveRun<'_> {
    fn finish(self, terminal: RunState) {
        self.pipeline.transition(terminal);
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        let abandoned = {
            let mut state = self
                .pipeline
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let abandoned = state.is_active();
            if abandoned {
                warn!("Run abandoned while {}; marking it failed", *state);
                *state = RunState::Failed;
            }
            abandoned
        };
        if abandoned {
            self.pipeline.observer.on_state_change(RunState::Failed);
        }
    }
}
