use std::fmt::Debug;

use async_trait::async_trait;
use auto_impl::auto_impl;

use crate::XrplResult;

/// The transport underneath a client: a single logical connection that
/// carries outbound wire messages. Inbound messages are pushed back into the
/// client by whoever owns the socket.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait Connection: Send + Sync + Debug {
    /// Write one serialized message.
    async fn send(&self, message: String) -> XrplResult<()>;

    /// Whether the connection is currently open.
    fn is_connected(&self) -> bool;
}
