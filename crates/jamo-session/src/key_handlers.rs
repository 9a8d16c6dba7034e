use tracing::{debug, debug_span};

use super::types::EditResponse;
use super::InputSession;

impl InputSession {
    /// Process one classified key. With `is_hangul_hint == false` the key is
    /// always a literal, even if it happens to be a jamo.
    ///
    /// Ignored when it would take the field past `max_characters`. A key
    /// that only grows the composing syllable (ㄱ → 가 → 간) never adds
    /// length, so an in-flight syllable is never blocked mid-stroke.
    pub fn handle_key(&mut self, key: char, is_hangul_hint: bool) -> EditResponse {
        let _span = debug_span!("handle_key", ?key, is_hangul_hint).entered();

        if self.projected_length(key, is_hangul_hint) > self.config.max_characters {
            debug!(length = self.length(), "field full, key ignored");
            return EditResponse::ignored();
        }

        let before = self.composer.composing_text();
        let committed = if is_hangul_hint {
            self.composer.input(key)
        } else {
            let mut text = self.composer.commit();
            text.push(key);
            text
        };
        self.finish(committed, 0, before)
    }

    /// Undo one composition step, or delete the last committed character
    /// when nothing is composing.
    pub fn handle_backspace(&mut self) -> EditResponse {
        let _span = debug_span!("handle_backspace").entered();

        let before = self.composer.composing_text();
        if self.composer.delete_backward() {
            return self.finish(String::new(), 0, before);
        }
        match self.buffer.pop() {
            Some(_) => self.finish(String::new(), 1, before),
            None => EditResponse::ignored(),
        }
    }

    pub fn handle_space(&mut self) -> EditResponse {
        self.commit_with_separator(' ')
    }

    pub fn handle_newline(&mut self) -> EditResponse {
        self.commit_with_separator('\n')
    }

    /// Move the composing syllable into the buffer. Idempotent.
    pub fn commit_composing(&mut self) -> EditResponse {
        let before = self.composer.composing_text();
        let committed = self.composer.commit();
        if committed.is_empty() {
            return EditResponse::ignored();
        }
        self.finish(committed, 0, before)
    }

    /// Reset both the buffer and the composing syllable.
    pub fn clear(&mut self) -> EditResponse {
        let before = self.composer.composing_text();
        let deleted = self.buffer.chars().count();
        self.buffer.clear();
        self.composer.reset();
        if deleted == 0 && before.is_empty() {
            return EditResponse::ignored();
        }
        self.finish(String::new(), deleted, before)
    }

    fn commit_with_separator(&mut self, separator: char) -> EditResponse {
        let _span = debug_span!("commit_with_separator", ?separator).entered();

        let before = self.composer.composing_text();
        let mut committed = self.composer.commit();
        // Separator capacity is checked after the syllable lands in the buffer.
        if self.buffer.chars().count() + committed.chars().count() < self.config.max_characters {
            committed.push(separator);
        }
        if committed.is_empty() {
            return EditResponse::ignored();
        }
        self.finish(committed, 0, before)
    }

    /// Logical length the field would have after `key`, without applying it.
    fn projected_length(&self, key: char, is_hangul_hint: bool) -> usize {
        let state = self.composer.state();
        let (committed, composing) = if is_hangul_hint {
            let step = state.apply(key);
            (step.committed.chars().count(), !step.next.is_empty())
        } else {
            // Composing syllable (if any) plus the literal, nothing left composing.
            (usize::from(!state.is_empty()) + 1, false)
        };
        self.buffer.chars().count() + committed + usize::from(composing)
    }

    /// Apply a committed delta, build the response and notify the observer.
    fn finish(&mut self, committed: String, deleted: usize, composing_before: String) -> EditResponse {
        self.buffer.push_str(&committed);
        let composing_after = self.composer.composing_text();

        let resp = EditResponse {
            consumed: true,
            commit: (!committed.is_empty()).then_some(committed),
            deleted,
            composing: (composing_after != composing_before).then_some(composing_after),
        };

        if let Some(observer) = self.observer.as_mut() {
            if resp.buffer_changed() {
                observer.buffer_changed(&self.buffer);
            }
            if let Some(ref composing) = resp.composing {
                observer.composing_changed(composing);
            }
        }
        resp
    }
}
