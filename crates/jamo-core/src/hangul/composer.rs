//! Jamo-by-jamo syllable composition.
//!
//! `CompositionState` transitions are pure: each `(state, key)` pair yields
//! exactly one successor plus the text (possibly empty) that leaves the
//! composing area. `HangulComposer` wraps the current state for callers.

use tracing::trace;

use super::algebra::{
    classify, compose, compound_final, compound_vowel, final_index, final_to_initial,
    initial_jamo, split_final, JamoKind, NO_FINAL,
};

/// Composition state of the single in-progress syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionState {
    #[default]
    Empty,
    Initial(u8),
    InitialVowel(u8, u8),
    /// The final index may be a compound final (e.g. ㄺ).
    Complete(u8, u8, u8),
}

/// Result of feeding one key to a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: CompositionState,
    /// Text that leaves the composing area, in order.
    pub committed: String,
}

impl Step {
    fn stay(next: CompositionState) -> Self {
        Self {
            next,
            committed: String::new(),
        }
    }

    /// Commit `prev`'s rendering, then continue in `next`.
    fn commit(prev: CompositionState, next: CompositionState) -> Self {
        Self {
            next,
            committed: prev.render().map(String::from).unwrap_or_default(),
        }
    }

    /// Commit `prev`'s rendering followed by a literal character.
    fn commit_literal(prev: CompositionState, literal: char) -> Self {
        let mut step = Self::commit(prev, CompositionState::Empty);
        step.committed.push(literal);
        step
    }
}

impl CompositionState {
    /// Single scalar shown in the composing area, `None` when empty.
    pub fn render(&self) -> Option<char> {
        match *self {
            Self::Empty => None,
            Self::Initial(c) => Some(initial_jamo(c)),
            Self::InitialVowel(c, v) => Some(compose(c, v, NO_FINAL)),
            Self::Complete(c, v, f) => Some(compose(c, v, f)),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Apply one keyboard character.
    pub fn apply(self, key: char) -> Step {
        use CompositionState::*;

        let kind = classify(key);
        match (self, kind) {
            (Empty, JamoKind::Consonant(c)) => Step::stay(Initial(c)),
            (Empty, _) => Step::commit_literal(Empty, key),

            (Initial(c), JamoKind::Vowel(v)) => Step::stay(InitialVowel(c, v)),
            (Initial(_), JamoKind::Consonant(k)) => Step::commit(self, Initial(k)),

            (InitialVowel(c, v), JamoKind::Vowel(v2)) => match compound_vowel(v, v2) {
                Some(cv) => Step::stay(InitialVowel(c, cv)),
                None => Step::commit_literal(self, key),
            },
            (InitialVowel(c, v), JamoKind::Consonant(k)) => match final_index(key) {
                Some(f) => Step::stay(Complete(c, v, f)),
                None => Step::commit(self, Initial(k)),
            },

            (Complete(c, v, f), JamoKind::Vowel(v2)) => {
                if let Some((f1, f2)) = split_final(f) {
                    if let Some(next_initial) = final_to_initial(f2) {
                        return Step::commit(Complete(c, v, f1), InitialVowel(next_initial, v2));
                    }
                } else if let Some(next_initial) = final_to_initial(f) {
                    return Step::commit(InitialVowel(c, v), InitialVowel(next_initial, v2));
                }
                Step::commit_literal(self, key)
            }
            (Complete(c, v, f), JamoKind::Consonant(k)) => {
                match final_index(key).and_then(|kf| compound_final(f, kf)) {
                    Some(cf) => Step::stay(Complete(c, v, cf)),
                    None => Step::commit(self, Initial(k)),
                }
            }

            (_, JamoKind::Other) => Step::commit_literal(self, key),
        }
    }

    /// Undo one composition step. `None` means nothing was composing and the
    /// caller should delete from its own buffer instead.
    pub fn step_back(self) -> Option<CompositionState> {
        use CompositionState::*;

        match self {
            Complete(c, v, f) => Some(match split_final(f) {
                Some((f1, _)) => Complete(c, v, f1),
                None => InitialVowel(c, v),
            }),
            InitialVowel(c, _) => Some(Initial(c)),
            Initial(_) => Some(Empty),
            Empty => None,
        }
    }
}

/// Holds one syllable's composition state between keystrokes.
#[derive(Debug, Default, Clone)]
pub struct HangulComposer {
    state: CompositionState,
}

impl HangulComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CompositionState {
        self.state
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn composing_text(&self) -> String {
        self.state.render().map(String::from).unwrap_or_default()
    }

    /// Feed one key; returns the text committed by this key (often empty).
    pub fn input(&mut self, key: char) -> String {
        let step = self.state.apply(key);
        trace!(?key, from = ?self.state, to = ?step.next, committed = %step.committed, "compose");
        self.state = step.next;
        step.committed
    }

    /// Returns `false` when there was nothing to undo.
    pub fn delete_backward(&mut self) -> bool {
        match self.state.step_back() {
            Some(prev) => {
                trace!(from = ?self.state, to = ?prev, "step back");
                self.state = prev;
                true
            }
            None => false,
        }
    }

    /// Flush the composing syllable, returning its text. Idempotent.
    pub fn commit(&mut self) -> String {
        let text = self.composing_text();
        self.state = CompositionState::Empty;
        text
    }

    /// Drop the composing syllable without committing it.
    pub fn reset(&mut self) {
        self.state = CompositionState::Empty;
    }
}
