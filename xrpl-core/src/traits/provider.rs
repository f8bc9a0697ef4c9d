use std::fmt::Debug;

use async_trait::async_trait;
use auto_impl::auto_impl;
use serde_json::Value;

use crate::XrplResult;

/// A handle to a remote validating node.
///
/// The submitter never talks to a connection directly; every operation is
/// handed one of these.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait XrplProvider: Send + Sync + Debug {
    /// Issue an arbitrary command and wait for its correlated response.
    ///
    /// The returned value is the full response with `status` stripped.
    async fn request(&self, request: Value) -> XrplResult<Value>;

    /// Index of the most recent validated ledger.
    async fn get_ledger_index(&self) -> XrplResult<u32>;
}
