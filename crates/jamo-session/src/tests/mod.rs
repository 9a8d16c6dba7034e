
use std::cell::RefCell;
use std::rc::Rc;

use super::{EditResponse, InputSession, SessionConfig, SessionObserver};

pub(super) fn make_session(max_characters: usize) -> InputSession {
    InputSession::new(SessionConfig { max_characters })
}

// Helper: simulate typing jamo one key at a time
pub(super) fn type_keys(session: &mut InputSession, keys: &str) -> Vec<EditResponse> {
    keys.chars()
        .map(|k| session.handle_key(k, true))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Notification {
    Buffer(String),
    Composing(String),
}

#[derive(Clone, Default)]
pub(super) struct RecordingObserver {
    pub(super) events: Rc<RefCell<Vec<Notification>>>,
}

impl SessionObserver for RecordingObserver {
    fn buffer_changed(&mut self, buffer: &str) {
        self.events
            .borrow_mut()
            .push(Notification::Buffer(buffer.to_string()));
    }

    fn composing_changed(&mut self, composing: &str) {
        self.events
            .borrow_mut()
            .push(Notification::Composing(composing.to_string()));
    }
}
