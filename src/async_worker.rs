//! Background thread that performs transport calls off the input thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tracing::trace;

use crate::error::TransportError;
use crate::service::ServiceRequest;
use crate::transport::{Transport, TransportResponse};

/// Monotonic counter identifying the only request whose result may apply.
///
/// Shared with the worker thread so queued work that is already stale can be
/// skipped before it reaches the network.
#[derive(Clone, Default)]
pub(crate) struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.current()
    }
}

pub(crate) struct RequestWork {
    pub request: ServiceRequest,
    pub generation: u64,
    pub retries_used: u32,
}

pub(crate) struct RequestResult {
    pub request: ServiceRequest,
    pub generation: u64,
    pub retries_used: u32,
    pub outcome: Result<TransportResponse, TransportError>,
}

pub(crate) struct NetworkWorker {
    work_tx: mpsc::Sender<RequestWork>,
    result_rx: mpsc::Receiver<RequestResult>,
}

impl NetworkWorker {
    pub fn new(transport: Arc<dyn Transport>, generation: Generation) -> Self {
        let (work_tx, work_rx) = mpsc::channel::<RequestWork>();
        let (result_tx, result_rx) = mpsc::channel::<RequestResult>();
        thread::Builder::new()
            .name("jamo-network".into())
            .spawn(move || network_worker(work_rx, result_tx, generation, transport))
            .expect("failed to spawn network worker");
        Self { work_tx, result_rx }
    }

    pub fn submit(&self, work: RequestWork) {
        let _ = self.work_tx.send(work);
    }

    pub fn try_recv(&self) -> Option<RequestResult> {
        self.result_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<RequestResult> {
        self.result_rx.recv_timeout(timeout).ok()
    }
}

/// Exits once the owning `NetworkWorker` is dropped.
fn network_worker(
    rx: mpsc::Receiver<RequestWork>,
    tx: mpsc::Sender<RequestResult>,
    generation: Generation,
    transport: Arc<dyn Transport>,
) {
    while let Ok(work) = rx.recv() {
        // Only the newest queued request can still be current.
        let mut latest = work;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }

        // A bump since queueing means nobody will read this result.
        if !generation.is_current(latest.generation) {
            trace!(generation = latest.generation, "skip stale work");
            continue;
        }

        let outcome = transport.send(&latest.request);
        let _ = tx.send(RequestResult {
            request: latest.request,
            generation: latest.generation,
            retries_used: latest.retries_used,
            outcome,
        });
    }
}
