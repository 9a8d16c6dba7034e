//! Debounced, cancellable request pipeline.
//!
//! Text changes go through `submit`. A cache hit answers immediately; a miss
//! (re)starts the debounce timer, and when it fires the request is handed to
//! the network worker stamped with the current generation. Results whose
//! generation is no longer current are dropped without being reported.
//!
//! All state lives on the caller's thread. The caller drives the pipeline
//! with `tick` (timer), `poll` (completed requests) or the blocking `wait`.

mod timer;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, debug_span, trace, warn};

use jamo_core::cache::ResponseCache;
use jamo_core::settings::Settings;

use crate::async_worker::{Generation, NetworkWorker, RequestResult, RequestWork};
use crate::error::ServiceError;
use crate::service::{
    build_request, classify_response, ClientIdentity, OperationKind, ServiceRequest,
};
use crate::transport::Transport;

pub use timer::{Clock, DebounceTimer, SystemClock};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub debounce: Duration,
    /// Automatic retries for timeouts and generic network errors.
    pub max_retries: u32,
    pub identity: ClientIdentity,
}

impl PipelineConfig {
    pub fn from_settings(s: &Settings, device_id: impl Into<String>) -> Self {
        Self {
            debounce: s.limits.debounce(),
            max_retries: s.network.max_retries,
            identity: ClientIdentity {
                tier: s.network.tier.clone(),
                device_id: device_id.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Debouncing {
        text: String,
    },
    InFlight {
        text: String,
        generation: u64,
        retries_used: u32,
    },
}

/// A successful result for `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub source: String,
    pub output: String,
    /// Answered from the cache without a network call.
    pub cached: bool,
}

type ResultCallback = Box<dyn FnMut(&Completion)>;
type ErrorCallback = Box<dyn FnMut(&ServiceError)>;

pub struct RequestPipeline {
    operation: OperationKind,
    config: PipelineConfig,
    cache: ResponseCache,
    clock: Box<dyn Clock>,
    timer: DebounceTimer,
    state: PipelineState,
    generation: Generation,
    worker: NetworkWorker,
    last_completed: Option<String>,
    on_result: Option<ResultCallback>,
    on_error: Option<ErrorCallback>,
}

impl RequestPipeline {
    pub fn new(
        operation: OperationKind,
        config: PipelineConfig,
        cache: ResponseCache,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::with_clock(operation, config, cache, transport, Box::new(SystemClock))
    }

    pub fn with_clock(
        operation: OperationKind,
        config: PipelineConfig,
        cache: ResponseCache,
        transport: Arc<dyn Transport>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let generation = Generation::default();
        let worker = NetworkWorker::new(transport, generation.clone());
        Self {
            operation,
            config,
            cache,
            clock,
            timer: DebounceTimer::new(),
            state: PipelineState::Idle,
            generation,
            worker,
            last_completed: None,
            on_result: None,
            on_error: None,
        }
    }

    pub fn set_on_result(&mut self, callback: impl FnMut(&Completion) + 'static) {
        self.on_result = Some(Box::new(callback));
    }

    pub fn set_on_error(&mut self, callback: impl FnMut(&ServiceError) + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    pub fn operation(&self) -> &OperationKind {
        &self.operation
    }

    /// Switch language pair or tone. Pending work for the old parameters is
    /// cancelled and the completed-text short-circuit is forgotten.
    pub fn set_operation(&mut self, operation: OperationKind) {
        if operation == self.operation {
            return;
        }
        debug!(from = ?self.operation, to = ?operation, "set_operation");
        self.reset();
        self.operation = operation;
    }

    /// Cancel pending work and forget the last completed text, so the next
    /// submission is answered again even if it repeats it.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.last_completed = None;
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.current()
    }

    pub fn last_completed_text(&self) -> Option<&str> {
        self.last_completed.as_deref()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Time until the debounce timer fires, if one is pending.
    pub fn next_wakeup(&self) -> Option<Duration> {
        self.timer.remaining(self.clock.now())
    }

    /// Hand over the session's current full text.
    pub fn submit(&mut self, text: &str) {
        let _span = debug_span!("submit", op = self.operation.name()).entered();

        let text = text.trim();
        if text.is_empty() || self.last_completed.as_deref() == Some(text) {
            // Field is back to nothing or to what was last answered; work
            // scheduled for other text must not report.
            if self.state != PipelineState::Idle {
                debug!("drop pending work for superseded text");
                self.cancel_pending();
            }
            trace!("nothing new to send");
            return;
        }
        if let PipelineState::InFlight { text: in_flight, .. } = &self.state {
            if in_flight == text {
                trace!("same text already in flight");
                return;
            }
        }

        self.timer.cancel();
        let key = self.operation.cache_key(text);
        if let Some(output) = self.cache.get(&key) {
            self.cache_hit();
            debug!(generation = self.generation.current(), "cache hit");
            self.state = PipelineState::Idle;
            self.last_completed = Some(text.to_string());
            self.report_result(Completion {
                source: text.to_string(),
                output,
                cached: true,
            });
            return;
        }

        self.start_debounce(text);
    }

    /// Drop the pending timer and make any in-flight result stale.
    pub fn cancel_pending(&mut self) {
        self.timer.cancel();
        self.cancel();
        self.state = PipelineState::Idle;
    }

    /// Fire the debounce timer if its deadline has passed.
    pub fn tick(&mut self) {
        if !self.timer.fire_if_due(self.clock.now()) {
            return;
        }
        let PipelineState::Debouncing { text } = &self.state else {
            return;
        };
        let text = text.clone();
        let generation = self.generation.current();
        self.issue(text, generation, 0);
    }

    /// Apply every completed request without blocking. Returns how many
    /// results were current (stale ones are dropped silently).
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Some(result) = self.worker.try_recv() {
            if self.handle_result(result) {
                applied += 1;
            }
        }
        applied
    }

    /// Block for at most `timeout` until the timer fires or a request
    /// completes, then process it. Returns true when a current result was
    /// applied or the timer fired.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        if self.fire_due_timer() {
            return true;
        }
        let wait_for = self
            .next_wakeup()
            .map_or(timeout, |remaining| remaining.min(timeout));
        let applied = match self.worker.recv_timeout(wait_for) {
            Some(result) => self.handle_result(result),
            None => false,
        };
        applied || self.fire_due_timer()
    }

    /// Drive the pipeline until it is idle again or `timeout` elapses.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.state != PipelineState::Idle {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.wait(deadline - now);
        }
        true
    }

    fn fire_due_timer(&mut self) -> bool {
        let was_debouncing = matches!(self.state, PipelineState::Debouncing { .. });
        self.tick();
        was_debouncing && matches!(self.state, PipelineState::InFlight { .. })
    }

    // --- Generation changes: the only places the counter moves ---

    fn start_debounce(&mut self, text: &str) {
        let generation = self.generation.bump();
        self.timer.reschedule(self.clock.now(), self.config.debounce);
        trace!(generation, "debounce started");
        self.state = PipelineState::Debouncing {
            text: text.to_string(),
        };
    }

    fn cancel(&mut self) {
        let generation = self.generation.bump();
        trace!(generation, "cancelled");
    }

    fn cache_hit(&mut self) {
        self.generation.bump();
    }

    // --- Network ---

    fn issue(&mut self, text: String, generation: u64, retries_used: u32) {
        let request = build_request(&self.operation, &text, &self.config.identity);
        self.dispatch(request, generation, retries_used);
    }

    fn dispatch(&mut self, request: ServiceRequest, generation: u64, retries_used: u32) {
        debug!(generation, retries_used, "issue request");
        self.state = PipelineState::InFlight {
            text: request.text.clone(),
            generation,
            retries_used,
        };
        self.worker.submit(RequestWork {
            request,
            generation,
            retries_used,
        });
    }

    fn handle_result(&mut self, result: RequestResult) -> bool {
        let _span = debug_span!("handle_result", generation = result.generation).entered();

        if !self.generation.is_current(result.generation) {
            trace!(current = self.generation.current(), "drop stale result");
            return false;
        }

        let outcome = result
            .outcome
            .map_err(ServiceError::from)
            .and_then(|response| classify_response(&result.request.operation, &response));

        match outcome {
            Ok(output) => {
                let text = result.request.text;
                self.cache
                    .set(result.request.operation.cache_key(&text), output.clone());
                self.last_completed = Some(text.clone());
                self.state = PipelineState::Idle;
                debug!("completed");
                self.report_result(Completion {
                    source: text,
                    output,
                    cached: false,
                });
            }
            Err(e) if e.is_retryable() && result.retries_used < self.config.max_retries => {
                debug!(error = %e, "retrying");
                // Same request, same generation, no new debounce window.
                self.dispatch(result.request, result.generation, result.retries_used + 1);
            }
            Err(e) => {
                warn!(error = %e, "request failed");
                self.state = PipelineState::Idle;
                self.report_error(e);
            }
        }
        true
    }

    fn report_result(&mut self, completion: Completion) {
        if let Some(callback) = self.on_result.as_mut() {
            callback(&completion);
        }
    }

    fn report_error(&mut self, error: ServiceError) {
        if let Some(callback) = self.on_error.as_mut() {
            callback(&error);
        }
    }
}
