use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use xrpl_core::{Connection, XrplError, XrplProvider, XrplResult};

use crate::{ClientSettings, RequestManager, SubmitterMetrics};


/// A correlated client over one logical connection.
///
/// Outbound calls go through [`Connection::send`]; whoever owns the socket
/// feeds inbound text back through [`Client::on_message`] and reports
/// closure through [`Client::on_disconnect`].
pub struct Client {
    connection: Arc<dyn Connection>,
    requests: RequestManager,
    timeout: Duration,
}

impl Client {
    pub fn new(
        connection: Arc<dyn Connection>,
        settings: &ClientSettings,
        metrics: SubmitterMetrics,
    ) -> Self {
        Self {
            connection,
            requests: RequestManager::new(metrics),
            timeout: settings.timeout(),
        }
    }

    pub fn requests(&self) -> &RequestManager {
        &self.requests
    }

    /// Sends one command and waits for its response.
    #[instrument(skip_all, fields(command = ?request.get("command")))]
    pub async fn request(&self, request: Value) -> XrplResult<Value> {
        if !self.connection.is_connected() {
            return Err(XrplError::NotConnected(format!(
                "Not connected, cannot send request: {request}"
            )));
        }
        let (_, message, handle) = self.requests.create_request(request, self.timeout)?;
        if let Err(err) = self.connection.send(message).await {
            warn!(id = %handle.id(), error = %err, "Failed to send request");
            // the deadline may already have fired; either way the handle carries the outcome
            self.requests.pending().settle(handle.id(), Err(err));
        }
        handle.response().await
    }

    /// Handles one inbound message from the connection.
    ///
    /// Only `response` messages are correlated; stream events are ignored.
    pub fn on_message(&self, message: &str) -> XrplResult<()> {
        let data: Value = serde_json::from_str(message).map_err(|err| {
            XrplError::format(format!("Failed to parse message as JSON: {err}"), None)
        })?;
        match data.get("type").and_then(Value::as_str) {
            Some("response") => self.requests.handle_response(data),
            other => {
                debug!(message_type = ?other, "Ignoring non-response message");
                Ok(())
            }
        }
    }

    /// Fails everything in flight once the connection has closed.
    pub fn on_disconnect(&self, code: u16) {
        self.requests.reject_all(&XrplError::Disconnected(format!(
            "websocket was closed, {code}"
        )));
    }
}

#[async_trait]
impl XrplProvider for Client {
    async fn request(&self, request: Value) -> XrplResult<Value> {
        Client::request(self, request).await
    }

    async fn get_ledger_index(&self) -> XrplResult<u32> {
        let response = self
            .request(json!({"command": "ledger", "ledger_index": "validated"}))
            .await?;
        response
            .pointer("/result/ledger_index")
            .and_then(Value::as_u64)
            .and_then(|index| u32::try_from(index).ok())
            .ok_or_else(|| {
                XrplError::format("ledger response has no ledger_index", Some(response.clone()))
            })
    }
}

impl Debug for Client {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("connection", &self.connection)
            .field("requests", &self.requests)
            .field("timeout", &self.timeout)
            .finish()
    }
}
