//! Editable text-field session for Korean input.
//!
//! `InputSession` owns the committed buffer and the in-progress syllable.
//! Every operation returns an `EditResponse` describing what changed, and
//! the same changes are pushed to an optional `SessionObserver`.

mod key_handlers;
mod types;

#[cfg(test)]
mod tests;

use jamo_core::hangul::{CompositionState, HangulComposer};

pub use types::{EditResponse, SessionConfig, SessionObserver};

pub struct InputSession {
    buffer: String,
    composer: HangulComposer,
    config: SessionConfig,
    observer: Option<Box<dyn SessionObserver>>,
}

impl InputSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            buffer: String::new(),
            composer: HangulComposer::new(),
            config,
            observer: None,
        }
    }

    /// Register the observer notified on buffer and composing changes.
    pub fn set_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observer = Some(observer);
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn composing_text(&self) -> String {
        self.composer.composing_text()
    }

    pub fn composition_state(&self) -> CompositionState {
        self.composer.state()
    }

    pub fn is_composing(&self) -> bool {
        !self.composer.is_empty()
    }

    /// Committed buffer followed by the composing syllable.
    pub fn full_text(&self) -> String {
        let mut text = self.buffer.clone();
        text.push_str(&self.composer.composing_text());
        text
    }

    /// Logical length: buffer characters plus one for a composing syllable.
    pub fn length(&self) -> usize {
        self.buffer.chars().count() + usize::from(self.is_composing())
    }

    pub fn remaining(&self) -> usize {
        self.config.max_characters.saturating_sub(self.length())
    }
}
