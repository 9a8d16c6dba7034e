use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, debug_span};

use jamo_core::cache::ResponseCache;
use jamo_core::settings::Settings;
use jamo_session::{EditResponse, InputSession, SessionConfig, SessionObserver};

use crate::error::ServiceError;
use crate::pipeline::{Completion, PipelineConfig, RequestPipeline};
use crate::service::OperationKind;
use crate::transport::Transport;

use super::AssistMode;

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub session: SessionConfig,
    pub pipeline: PipelineConfig,
    pub cache_max_items: usize,
    pub translation: OperationKind,
    pub correction: OperationKind,
}

impl AssistantConfig {
    /// Korean source text, translated to English or corrected in a neutral tone.
    pub fn from_settings(s: &Settings, device_id: impl Into<String>) -> Self {
        Self {
            session: SessionConfig::from_settings(s),
            pipeline: PipelineConfig::from_settings(s, device_id),
            cache_max_items: s.limits.cache_max_items,
            translation: OperationKind::translate("ko", "en"),
            correction: OperationKind::correct("ko", "neutral"),
        }
    }
}

type SharedResultCallback = Rc<RefCell<Box<dyn FnMut(AssistMode, &Completion)>>>;
type SharedErrorCallback = Rc<RefCell<Box<dyn FnMut(AssistMode, &ServiceError)>>>;

pub struct Assistant {
    session: InputSession,
    translation: RequestPipeline,
    correction: RequestPipeline,
    mode: AssistMode,
}

impl Assistant {
    pub fn new(config: AssistantConfig, transport: Arc<dyn Transport>) -> Self {
        let translation = RequestPipeline::new(
            config.translation,
            config.pipeline.clone(),
            ResponseCache::new(config.cache_max_items),
            Arc::clone(&transport),
        );
        let correction = RequestPipeline::new(
            config.correction,
            config.pipeline,
            ResponseCache::new(config.cache_max_items),
            transport,
        );
        Self::from_parts(InputSession::new(config.session), translation, correction)
    }

    pub fn from_parts(
        session: InputSession,
        translation: RequestPipeline,
        correction: RequestPipeline,
    ) -> Self {
        Self {
            session,
            translation,
            correction,
            mode: AssistMode::Off,
        }
    }

    pub fn set_session_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.session.set_observer(observer);
    }

    /// Register the success callback for both pipelines; the mode says which
    /// one produced the result.
    pub fn set_on_result(&mut self, callback: impl FnMut(AssistMode, &Completion) + 'static) {
        let shared: SharedResultCallback = Rc::new(RefCell::new(Box::new(callback)));
        let cb = Rc::clone(&shared);
        self.translation
            .set_on_result(move |c| (*cb.borrow_mut())(AssistMode::Translate, c));
        self.correction
            .set_on_result(move |c| (*shared.borrow_mut())(AssistMode::Correct, c));
    }

    pub fn set_on_error(&mut self, callback: impl FnMut(AssistMode, &ServiceError) + 'static) {
        let shared: SharedErrorCallback = Rc::new(RefCell::new(Box::new(callback)));
        let cb = Rc::clone(&shared);
        self.translation
            .set_on_error(move |e| (*cb.borrow_mut())(AssistMode::Translate, e));
        self.correction
            .set_on_error(move |e| (*shared.borrow_mut())(AssistMode::Correct, e));
    }

    pub fn session(&self) -> &InputSession {
        &self.session
    }

    pub fn translation(&self) -> &RequestPipeline {
        &self.translation
    }

    pub fn correction(&self) -> &RequestPipeline {
        &self.correction
    }

    pub fn mode(&self) -> AssistMode {
        self.mode
    }

    pub fn full_text(&self) -> String {
        self.session.full_text()
    }

    // --- Session edits ---

    pub fn handle_key(&mut self, key: char, is_hangul_hint: bool) -> EditResponse {
        let resp = self.session.handle_key(key, is_hangul_hint);
        self.after_edit(&resp);
        resp
    }

    pub fn handle_backspace(&mut self) -> EditResponse {
        let resp = self.session.handle_backspace();
        self.after_edit(&resp);
        resp
    }

    pub fn handle_space(&mut self) -> EditResponse {
        let resp = self.session.handle_space();
        self.after_edit(&resp);
        resp
    }

    pub fn handle_newline(&mut self) -> EditResponse {
        let resp = self.session.handle_newline();
        self.after_edit(&resp);
        resp
    }

    pub fn commit_composing(&mut self) -> EditResponse {
        let resp = self.session.commit_composing();
        self.after_edit(&resp);
        resp
    }

    pub fn clear(&mut self) -> EditResponse {
        let resp = self.session.clear();
        self.after_edit(&resp);
        resp
    }

    // --- Mode and parameters ---

    pub fn set_mode(&mut self, mode: AssistMode) {
        if mode == self.mode {
            return;
        }
        let _span = debug_span!("set_mode", from = ?self.mode, to = ?mode).entered();
        // Switching back later answers the unchanged field again.
        if let Some(previous) = self.active_pipeline() {
            previous.reset();
        }
        self.mode = mode;
        self.submit_current();
    }

    pub fn set_translation(&mut self, operation: OperationKind) {
        self.translation.set_operation(operation);
        if self.mode == AssistMode::Translate {
            self.submit_current();
        }
    }

    pub fn set_correction(&mut self, operation: OperationKind) {
        self.correction.set_operation(operation);
        if self.mode == AssistMode::Correct {
            self.submit_current();
        }
    }

    /// The text field went away: nothing pending may report back.
    pub fn end_session(&mut self) {
        debug!("end_session");
        self.translation.cancel_pending();
        self.correction.cancel_pending();
    }

    // --- Event loop ---

    pub fn tick(&mut self) {
        self.translation.tick();
        self.correction.tick();
    }

    pub fn poll(&mut self) -> usize {
        self.translation.poll() + self.correction.poll()
    }

    /// Block on the active pipeline for at most `timeout`. Returns false
    /// immediately when assist is off.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let applied = match self.active_pipeline() {
            Some(pipeline) => pipeline.wait(timeout),
            None => false,
        };
        // Results left over from a previous mode are stale; drain them.
        applied | (self.poll() > 0)
    }

    pub fn next_wakeup(&self) -> Option<Duration> {
        match self.mode {
            AssistMode::Off => None,
            AssistMode::Translate => self.translation.next_wakeup(),
            AssistMode::Correct => self.correction.next_wakeup(),
        }
    }

    fn active_pipeline(&mut self) -> Option<&mut RequestPipeline> {
        match self.mode {
            AssistMode::Off => None,
            AssistMode::Translate => Some(&mut self.translation),
            AssistMode::Correct => Some(&mut self.correction),
        }
    }

    fn after_edit(&mut self, resp: &EditResponse) {
        if resp.changed() {
            self.submit_current();
        }
    }

    fn submit_current(&mut self) {
        let text = self.session.full_text();
        let Some(pipeline) = self.active_pipeline() else {
            return;
        };
        if text.trim().is_empty() {
            pipeline.reset();
        } else {
            pipeline.submit(&text);
        }
    }
}
