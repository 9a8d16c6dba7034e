//! Shared test doubles: a hand-driven clock and scripted transports.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::TransportError;
use crate::pipeline::Clock;
use crate::service::ServiceRequest;
use crate::transport::{Transport, TransportResponse};

pub(crate) type Scripted = Result<TransportResponse, TransportError>;

pub(crate) fn ok(body: &str) -> Scripted {
    status(200, body)
}

pub(crate) fn status(code: u16, body: &str) -> Scripted {
    Ok(TransportResponse {
        status: code,
        body: body.to_string(),
    })
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub(crate) struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Answers requests from a script, recording every call.
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<ServiceRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<ServiceRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &ServiceRequest) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".into())))
    }
}

/// Blocks each call until the test releases it, so a request can be held
/// in flight while the pipeline moves on.
pub(crate) struct GatedTransport {
    entered: Mutex<mpsc::Sender<String>>,
    release: Mutex<mpsc::Receiver<Scripted>>,
}

pub(crate) struct Gate {
    pub entered: mpsc::Receiver<String>,
    pub release: mpsc::Sender<Scripted>,
}

impl Gate {
    /// Wait until the transport is inside a call; returns the request text.
    pub fn wait_entered(&self) -> String {
        self.entered
            .recv_timeout(Duration::from_secs(5))
            .expect("transport was never called")
    }
}

impl GatedTransport {
    pub fn new() -> (Arc<Self>, Gate) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let transport = Arc::new(Self {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        });
        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };
        (transport, gate)
    }
}

impl Transport for GatedTransport {
    fn send(&self, request: &ServiceRequest) -> Result<TransportResponse, TransportError> {
        let _ = self.entered.lock().unwrap().send(request.text.clone());
        self.release
            .lock()
            .unwrap()
            .recv()
            .unwrap_or_else(|_| Err(TransportError::Network("gate closed".into())))
    }
}
