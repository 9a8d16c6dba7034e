use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::error::TransportError;
use crate::testutil::{ok, status, GatedTransport, ManualClock, ScriptedTransport};

const DEBOUNCE: Duration = Duration::from_millis(300);
const SETTLE: Duration = Duration::from_secs(5);

struct Harness {
    pipeline: RequestPipeline,
    clock: ManualClock,
    results: Rc<RefCell<Vec<Completion>>>,
    errors: Rc<RefCell<Vec<ServiceError>>>,
}

impl Harness {
    fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_operation(transport, OperationKind::translate("en", "ko"))
    }

    fn with_operation(transport: Arc<dyn Transport>, operation: OperationKind) -> Self {
        let clock = ManualClock::new();
        let config = PipelineConfig {
            debounce: DEBOUNCE,
            max_retries: 1,
            identity: ClientIdentity {
                tier: "free".into(),
                device_id: "test-device".into(),
            },
        };
        let mut pipeline = RequestPipeline::with_clock(
            operation,
            config,
            ResponseCache::new(8),
            transport,
            Box::new(clock.clone()),
        );
        let results = Rc::new(RefCell::new(Vec::new()));
        let errors = Rc::new(RefCell::new(Vec::new()));
        {
            let results = Rc::clone(&results);
            pipeline.set_on_result(move |c| results.borrow_mut().push(c.clone()));
        }
        {
            let errors = Rc::clone(&errors);
            pipeline.set_on_error(move |e| errors.borrow_mut().push(e.clone()));
        }
        Self {
            pipeline,
            clock,
            results,
            errors,
        }
    }

    /// Submit and let the debounce window elapse.
    fn submit_and_fire(&mut self, text: &str) {
        self.pipeline.submit(text);
        self.clock.advance(DEBOUNCE);
        self.pipeline.tick();
    }

    /// Wait for the next network result to be processed.
    fn settle(&mut self) -> bool {
        self.pipeline.wait(SETTLE)
    }

    fn outputs(&self) -> Vec<String> {
        self.results
            .borrow()
            .iter()
            .map(|c| c.output.clone())
            .collect()
    }
}

// --- Debounce ---

#[test]
fn test_nothing_sent_before_debounce_elapses() {
    let transport = ScriptedTransport::new(vec![ok(r#"{"translatedText":"안녕"}"#)]);
    let mut h = Harness::new(transport.clone());

    h.pipeline.submit("hello");
    assert_eq!(
        h.pipeline.state(),
        &PipelineState::Debouncing {
            text: "hello".into()
        }
    );
    h.clock.advance(DEBOUNCE - Duration::from_millis(1));
    h.pipeline.tick();
    assert!(matches!(h.pipeline.state(), PipelineState::Debouncing { .. }));
    assert_eq!(h.pipeline.next_wakeup(), Some(Duration::from_millis(1)));

    h.clock.advance(Duration::from_millis(1));
    h.pipeline.tick();
    assert!(matches!(h.pipeline.state(), PipelineState::InFlight { .. }));
    assert!(h.settle());
    assert_eq!(h.outputs(), vec!["안녕"]);
    assert_eq!(transport.call_count(), 1);
    assert_eq!(h.pipeline.state(), &PipelineState::Idle);
}

#[test]
fn test_same_text_twice_in_window_sends_once() {
    let transport = ScriptedTransport::new(vec![ok(r#"{"translatedText":"안녕"}"#)]);
    let mut h = Harness::new(transport.clone());

    h.pipeline.submit("hello");
    h.clock.advance(Duration::from_millis(100));
    h.submit_and_fire("hello");
    assert!(h.settle());

    assert_eq!(transport.call_count(), 1);
    assert_eq!(h.results.borrow().len(), 1);
}

#[test]
fn test_only_latest_text_is_sent() {
    let transport = ScriptedTransport::new(vec![ok(r#"{"translatedText":"세계"}"#)]);
    let mut h = Harness::new(transport.clone());

    h.pipeline.submit("A");
    h.clock.advance(DEBOUNCE - Duration::from_millis(1));
    h.pipeline.submit("B");
    // The window restarted, so passing the first deadline fires nothing.
    h.clock.advance(Duration::from_millis(2));
    h.pipeline.tick();
    assert_eq!(transport.call_count(), 0);

    h.clock.advance(DEBOUNCE);
    h.pipeline.tick();
    assert!(h.settle());

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "B");
    assert_eq!(h.results.borrow()[0].source, "B");
}

#[test]
fn test_blank_and_trimmed_submissions() {
    let transport = ScriptedTransport::new(vec![]);
    let mut h = Harness::new(transport);

    h.pipeline.submit("   \n");
    assert_eq!(h.pipeline.state(), &PipelineState::Idle);
    assert_eq!(h.pipeline.current_generation(), 0);

    h.pipeline.submit("  hello ");
    assert_eq!(
        h.pipeline.state(),
        &PipelineState::Debouncing {
            text: "hello".into()
        }
    );
}

// --- Cache ---

#[test]
fn test_cache_hit_skips_network() {
    let transport = ScriptedTransport::new(vec![
        ok(r#"{"translatedText":"안녕"}"#),
        ok(r#"{"translatedText":"잘 가"}"#),
    ]);
    let mut h = Harness::new(transport.clone());

    h.submit_and_fire("hello");
    assert!(h.settle());
    h.submit_and_fire("bye");
    assert!(h.settle());
    assert_eq!(transport.call_count(), 2);
    let generation = h.pipeline.current_generation();

    h.pipeline.submit("hello");
    assert_eq!(transport.call_count(), 2);
    assert_eq!(h.pipeline.current_generation(), generation + 1);
    let results = h.results.borrow();
    assert_eq!(results.len(), 3);
    assert_eq!(results[2].output, "안녕");
    assert!(results[2].cached);
    assert_eq!(h.pipeline.state(), &PipelineState::Idle);
}

#[test]
fn test_completed_text_short_circuits() {
    let transport = ScriptedTransport::new(vec![ok(r#"{"translatedText":"안녕"}"#)]);
    let mut h = Harness::new(transport.clone());

    h.submit_and_fire("hello");
    assert!(h.settle());
    let generation = h.pipeline.current_generation();

    h.pipeline.submit("hello ");
    assert_eq!(h.pipeline.current_generation(), generation);
    assert_eq!(h.results.borrow().len(), 1);
    assert_eq!(h.pipeline.last_completed_text(), Some("hello"));
}

#[test]
fn test_success_is_cached_under_operation_key() {
    let transport = ScriptedTransport::new(vec![ok(r#"{"correctedText":"안녕하세요"}"#)]);
    let mut h = Harness::with_operation(transport, OperationKind::correct("ko", "polite"));

    h.submit_and_fire("안녕");
    assert!(h.settle());
    assert!(h.pipeline.cache().contains("correct_ko_polite_안녕"));
}

#[test]
fn test_return_to_completed_text_drops_pending_debounce() {
    let transport = ScriptedTransport::new(vec![
        ok(r#"{"translatedText":"ga"}"#),
        ok(r#"{"translatedText":"gan"}"#),
    ]);
    let mut h = Harness::new(transport.clone());

    h.submit_and_fire("가");
    assert!(h.settle());
    h.pipeline.submit("간");
    h.pipeline.submit("가");
    assert_eq!(h.pipeline.state(), &PipelineState::Idle);
    assert_eq!(h.pipeline.next_wakeup(), None);

    h.clock.advance(DEBOUNCE);
    h.pipeline.tick();
    assert_eq!(transport.call_count(), 1);
    assert_eq!(h.outputs(), vec!["ga"]);
}

#[test]
fn test_return_to_completed_text_drops_in_flight() {
    let (transport, gate) = GatedTransport::new();
    let mut h = Harness::new(transport);

    h.submit_and_fire("가");
    assert_eq!(gate.wait_entered(), "가");
    gate.release.send(ok(r#"{"translatedText":"ga"}"#)).unwrap();
    assert!(h.settle());

    h.submit_and_fire("간");
    assert_eq!(gate.wait_entered(), "간");
    h.pipeline.submit("가");
    gate.release.send(ok(r#"{"translatedText":"gan"}"#)).unwrap();
    assert!(!h.settle());

    assert_eq!(h.outputs(), vec!["ga"]);
    assert_eq!(h.pipeline.state(), &PipelineState::Idle);
}

#[test]
fn test_blank_submission_drops_pending_debounce() {
    let transport = ScriptedTransport::new(vec![]);
    let mut h = Harness::new(transport.clone());

    h.pipeline.submit("hello");
    h.pipeline.submit("  ");
    assert_eq!(h.pipeline.state(), &PipelineState::Idle);

    h.clock.advance(DEBOUNCE);
    h.pipeline.tick();
    assert_eq!(transport.call_count(), 0);
}

// --- Generation staleness ---

#[test]
fn test_cancel_drops_in_flight_result() {
    let (transport, gate) = GatedTransport::new();
    let mut h = Harness::new(transport);

    h.submit_and_fire("hello");
    assert_eq!(gate.wait_entered(), "hello");
    h.pipeline.cancel_pending();
    gate.release
        .send(ok(r#"{"translatedText":"안녕"}"#))
        .unwrap();

    assert!(!h.settle());
    assert!(h.results.borrow().is_empty());
    assert!(h.errors.borrow().is_empty());
    assert!(!h.pipeline.cache().contains("translate_en_ko_hello"));
    assert_eq!(h.pipeline.state(), &PipelineState::Idle);
}

#[test]
fn test_newer_input_supersedes_in_flight_request() {
    let (transport, gate) = GatedTransport::new();
    let mut h = Harness::new(transport);

    h.submit_and_fire("first");
    assert_eq!(gate.wait_entered(), "first");
    h.pipeline.submit("second");
    gate.release
        .send(ok(r#"{"translatedText":"하나"}"#))
        .unwrap();
    assert!(!h.settle());
    assert!(h.results.borrow().is_empty());

    h.clock.advance(DEBOUNCE);
    h.pipeline.tick();
    assert_eq!(gate.wait_entered(), "second");
    gate.release
        .send(ok(r#"{"translatedText":"둘"}"#))
        .unwrap();
    assert!(h.settle());
    assert_eq!(h.outputs(), vec!["둘"]);
}

#[test]
fn test_generation_moves_on_named_operations() {
    let transport = ScriptedTransport::new(vec![ok(r#"{"translatedText":"안녕"}"#)]);
    let mut h = Harness::new(transport);

    h.pipeline.submit("hello"); // debounce start
    assert_eq!(h.pipeline.current_generation(), 1);
    h.clock.advance(DEBOUNCE);
    h.pipeline.tick(); // request carries generation 1
    assert!(matches!(
        h.pipeline.state(),
        PipelineState::InFlight { generation: 1, .. }
    ));
    assert!(h.settle());
    h.pipeline.cancel_pending();
    assert_eq!(h.pipeline.current_generation(), 2);
    h.pipeline.submit("other");
    assert_eq!(h.pipeline.current_generation(), 3);
    h.pipeline.submit("other");
    assert_eq!(h.pipeline.current_generation(), 4);
}

// --- Retry and errors ---

#[test]
fn test_timeout_retried_once_then_succeeds() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::Timeout),
        ok(r#"{"translatedText":"안녕"}"#),
    ]);
    let mut h = Harness::new(transport.clone());

    h.submit_and_fire("hello");
    assert!(h.settle());
    assert!(matches!(
        h.pipeline.state(),
        PipelineState::InFlight {
            retries_used: 1,
            ..
        }
    ));
    assert!(h.settle());
    assert_eq!(transport.call_count(), 2);
    assert_eq!(h.outputs(), vec!["안녕"]);
    assert!(h.errors.borrow().is_empty());
}

#[test]
fn test_second_timeout_is_reported() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::Timeout),
        Err(TransportError::Timeout),
    ]);
    let mut h = Harness::new(transport.clone());

    h.submit_and_fire("hello");
    assert!(h.settle());
    assert!(h.settle());
    assert_eq!(transport.call_count(), 2);
    assert_eq!(*h.errors.borrow(), vec![ServiceError::Timeout]);
    assert_eq!(h.pipeline.state(), &PipelineState::Idle);
    assert_eq!(h.pipeline.last_completed_text(), None);
}

#[test]
fn test_network_error_retried() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::Network("connection reset".into())),
        ok(r#"{"translatedText":"안녕"}"#),
    ]);
    let mut h = Harness::new(transport.clone());

    h.submit_and_fire("hello");
    assert!(h.settle());
    assert!(h.settle());
    assert_eq!(transport.call_count(), 2);
    assert_eq!(h.outputs(), vec!["안녕"]);
}

#[test]
fn test_offline_not_retried() {
    let transport = ScriptedTransport::new(vec![Err(TransportError::Offline)]);
    let mut h = Harness::new(transport.clone());

    h.submit_and_fire("hello");
    assert!(h.settle());
    assert_eq!(transport.call_count(), 1);
    assert_eq!(*h.errors.borrow(), vec![ServiceError::Offline]);
}

#[test]
fn test_rate_limit_reports_hint() {
    let transport = ScriptedTransport::new(vec![status(429, r#"{"retryAfter":30}"#)]);
    let mut h = Harness::new(transport.clone());

    h.submit_and_fire("hello");
    assert!(h.settle());
    assert_eq!(transport.call_count(), 1);
    assert_eq!(
        *h.errors.borrow(),
        vec![ServiceError::RateLimited {
            retry_after_secs: 30
        }]
    );
}

#[test]
fn test_server_error_not_retried() {
    let transport = ScriptedTransport::new(vec![status(500, r#"{"error":"boom"}"#)]);
    let mut h = Harness::new(transport.clone());

    h.submit_and_fire("hello");
    assert!(h.settle());
    assert_eq!(transport.call_count(), 1);
    assert_eq!(
        *h.errors.borrow(),
        vec![ServiceError::Server {
            status: 500,
            body: "boom".into()
        }]
    );
}

#[test]
fn test_malformed_body_reported() {
    let transport = ScriptedTransport::new(vec![ok("{}")]);
    let mut h = Harness::new(transport.clone());

    h.submit_and_fire("hello");
    assert!(h.settle());
    assert_eq!(transport.call_count(), 1);
    assert!(matches!(
        h.errors.borrow()[0],
        ServiceError::InvalidResponse(_)
    ));
    assert!(h.pipeline.cache().is_empty());
}

// --- Operation switching ---

#[test]
fn test_set_operation_forgets_completed_text() {
    let transport = ScriptedTransport::new(vec![
        ok(r#"{"translatedText":"안녕"}"#),
        ok(r#"{"translatedText":"こんにちは"}"#),
    ]);
    let mut h = Harness::new(transport.clone());

    h.submit_and_fire("hello");
    assert!(h.settle());

    h.pipeline.set_operation(OperationKind::translate("en", "ja"));
    assert_eq!(h.pipeline.last_completed_text(), None);
    h.submit_and_fire("hello");
    assert!(h.settle());

    assert_eq!(transport.call_count(), 2);
    assert_eq!(transport.calls()[1].body["targetLang"], "ja");
    assert_eq!(h.outputs(), vec!["안녕", "こんにちは"]);
}

#[test]
fn test_run_until_idle() {
    let transport = ScriptedTransport::new(vec![ok(r#"{"translatedText":"안녕"}"#)]);
    let mut h = Harness::new(transport);

    h.submit_and_fire("hello");
    assert!(h.pipeline.run_until_idle(SETTLE));
    assert_eq!(h.outputs(), vec!["안녕"]);
}
