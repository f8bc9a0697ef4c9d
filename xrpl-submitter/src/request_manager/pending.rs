use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::{sync::oneshot, task::JoinHandle, time::sleep};
use tracing::{debug, warn};

use xrpl_core::{RequestId, XrplError, XrplResult};

use crate::SubmitterMetrics;

pub type Settlement = XrplResult<Value>;

type Calls = Mutex<HashMap<RequestId, PendingCall>>;

struct PendingCall {
    sender: oneshot::Sender<Settlement>,
    deadline: JoinHandle<()>,
}

/// Calls awaiting a response, keyed by correlation id.
///
/// Removal from the map is the single point of settlement: whichever of the
/// response, the deadline or an explicit failure removes an entry first is
/// the one that fires its completion, and everyone else finds nothing.
#[derive(Clone)]
pub struct PendingCallTable {
    calls: Arc<Calls>,
    metrics: SubmitterMetrics,
}

impl PendingCallTable {
    pub fn new(metrics: SubmitterMetrics) -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
            metrics,
        }
    }

    /// Records a call and arms its deadline. Must run inside a tokio runtime.
    ///
    /// An id that is already pending is refused before anything is armed.
    pub fn register(
        &self,
        id: RequestId,
        timeout: Duration,
        timeout_error: XrplError,
    ) -> XrplResult<oneshot::Receiver<Settlement>> {
        let mut calls = self.calls.lock();
        if calls.contains_key(&id) {
            return Err(XrplError::DuplicateRequest { id });
        }
        let (sender, receiver) = oneshot::channel();
        let deadline = tokio::spawn(Self::expire_after(
            Arc::downgrade(&self.calls),
            self.metrics.clone(),
            id.clone(),
            timeout,
            timeout_error,
        ));
        calls.insert(id, PendingCall { sender, deadline });
        self.metrics.update_pending_requests_metric(calls.len());
        Ok(receiver)
    }

    /// Settles the call registered under `id`. Returns `false` if there was none.
    pub fn settle(&self, id: &RequestId, settlement: Settlement) -> bool {
        let Some(call) = Self::take(&self.calls, &self.metrics, id) else {
            return false;
        };
        call.deadline.abort();
        if call.sender.send(settlement).is_err() {
            debug!(%id, "Caller stopped waiting before the call settled");
        }
        true
    }

    /// Fails every call pending right now with `error`, returning how many there were.
    pub fn settle_all(&self, error: &XrplError) -> usize {
        let drained: Vec<(RequestId, PendingCall)> = {
            let mut calls = self.calls.lock();
            let drained = calls.drain().collect();
            self.metrics.update_pending_requests_metric(0);
            drained
        };
        let count = drained.len();
        for (_, call) in drained {
            call.deadline.abort();
            let _ = call.sender.send(Err(error.clone()));
        }
        count
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.calls.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take(calls: &Calls, metrics: &SubmitterMetrics, id: &RequestId) -> Option<PendingCall> {
        let mut calls = calls.lock();
        let call = calls.remove(id);
        metrics.update_pending_requests_metric(calls.len());
        call
    }

    async fn expire_after(
        calls: Weak<Calls>,
        metrics: SubmitterMetrics,
        id: RequestId,
        timeout: Duration,
        error: XrplError,
    ) {
        sleep(timeout).await;
        let Some(calls) = calls.upgrade() else {
            return;
        };
        // the response may have won the race while we were waking up
        if let Some(call) = Self::take(&calls, &metrics, &id) {
            warn!(%id, ?timeout, "Request timed out");
            metrics.request_timeouts.inc();
            let _ = call.sender.send(Err(error));
        }
    }
}
