use std::{
    fmt::{Debug, Formatter},
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use xrpl_core::{RequestId, XrplError, XrplResult};

use crate::SubmitterMetrics;

pub use pending::PendingCallTable;

use pending::Settlement;

mod pending;
#[cfg(test)]
mod tests;

/// Ties responses arriving on the connection back to the calls that caused them.
pub struct RequestManager {
    next_id: AtomicU64,
    pending: PendingCallTable,
}

/// Completion side of a call created by [`RequestManager::create_request`].
#[derive(Debug)]
pub struct ResponseHandle {
    id: RequestId,
    receiver: oneshot::Receiver<Settlement>,
}

impl ResponseHandle {
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Waits for the call to be resolved, failed or timed out.
    pub async fn response(self) -> XrplResult<Value> {
        match self.receiver.await {
            Ok(settlement) => settlement,
            Err(_) => Err(XrplError::Disconnected(format!(
                "Request {} was dropped before it settled",
                self.id
            ))),
        }
    }
}

impl RequestManager {
    pub fn new(metrics: SubmitterMetrics) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            pending: PendingCallTable::new(metrics),
        }
    }

    pub fn pending(&self) -> &PendingCallTable {
        &self.pending
    }

    /// Assigns an id, serializes the request with that id, and arms a
    /// deadline that fails the call with a timeout error.
    ///
    /// A caller-supplied `id` is kept as is; otherwise the next counter value
    /// is used.
    pub fn create_request(
        &self,
        request: Value,
        timeout: Duration,
    ) -> XrplResult<(RequestId, String, ResponseHandle)> {
        let Value::Object(mut fields) = request else {
            return Err(XrplError::Validation(format!(
                "Request must be a JSON object, got {request}"
            )));
        };
        let id = match fields.get("id") {
            None | Some(Value::Null) => {
                RequestId::Number(self.next_id.fetch_add(1, Ordering::SeqCst))
            }
            Some(value) => RequestId::from_json(value).ok_or_else(|| {
                XrplError::Validation(format!(
                    "Request id must be a string or a non-negative integer, got {value}"
                ))
            })?,
        };
        let original = Value::Object(fields.clone());
        fields.insert("id".to_owned(), id.to_json());
        let message = serde_json::to_string(&fields)
            .map_err(|err| XrplError::Codec(format!("Failed to serialize request: {err}")))?;

        let timeout_error = XrplError::Timeout {
            message: format!("Timeout for request: {original} with id {id}"),
            id: id.clone(),
            request: original,
        };
        let receiver = self.pending.register(id.clone(), timeout, timeout_error)?;
        debug!(%id, "Created request");
        Ok((id.clone(), message, ResponseHandle { id, receiver }))
    }

    /// Resolves the call registered under `id`.
    ///
    /// Resolving an id nobody is waiting on is a bug in the caller.
    pub fn resolve(&self, id: &RequestId, response: Value) -> XrplResult<()> {
        if self.pending.settle(id, Ok(response)) {
            return Ok(());
        }
        error!(%id, "Tried to resolve a request that is not pending");
        Err(XrplError::NoPendingCall {
            id: id.clone(),
            action: "resolve",
        })
    }

    /// Fails the call registered under `id`.
    pub fn reject(&self, id: &RequestId, err: XrplError) -> XrplResult<()> {
        if self.pending.settle(id, Err(err)) {
            return Ok(());
        }
        error!(%id, "Tried to reject a request that is not pending");
        Err(XrplError::NoPendingCall {
            id: id.clone(),
            action: "reject",
        })
    }

    /// Fails every pending call with the same error. Calls created afterwards
    /// are unaffected.
    pub fn reject_all(&self, err: &XrplError) {
        let count = self.pending.settle_all(err);
        info!(count, error = %err, "Rejected all pending requests");
    }

    /// Routes one inbound response to its call.
    ///
    /// Only a missing or malformed `id` is an error here, since there is no
    /// call to hand it to. Responses for ids that are not pending (late,
    /// duplicate, or stray) are dropped.
    pub fn handle_response(&self, mut response: Value) -> XrplResult<()> {
        let Some(id) = response.get("id").and_then(RequestId::from_json) else {
            return Err(XrplError::format(
                "valid id not found in response",
                Some(response),
            ));
        };
        if !self.pending.contains(&id) {
            debug!(%id, "Dropping response with no pending request");
            return Ok(());
        }

        let status = response.get("status").cloned();
        let settlement = match status {
            None | Some(Value::Null) => Err(XrplError::format(
                "Response has no status",
                Some(response),
            )),
            Some(Value::String(status)) if status == "error" => {
                let message = response
                    .get("error_message")
                    .and_then(Value::as_str)
                    .or_else(|| response.get("error").and_then(Value::as_str))
                    .unwrap_or_default()
                    .to_owned();
                Err(XrplError::Rippled {
                    message,
                    data: response,
                })
            }
            Some(Value::String(status)) if status == "success" => {
                if let Some(fields) = response.as_object_mut() {
                    fields.remove("status");
                }
                Ok(response)
            }
            Some(Value::String(status)) => Err(XrplError::format(
                format!("unrecognized response.status: {status}"),
                Some(response),
            )),
            Some(other) => Err(XrplError::format(
                format!("unrecognized response.status: {other}"),
                Some(response),
            )),
        };

        // losing a race against the deadline is fine; the timeout already settled the call
        if !self.pending.settle(&id, settlement) {
            debug!(%id, "Request settled before its response was handled");
        }
        Ok(())
    }
}

impl Debug for RequestManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestManager")
            .field("next_id", &self.next_id.load(Ordering::SeqCst))
            .field("pending", &self.pending.len())
            .finish()
    }
}
