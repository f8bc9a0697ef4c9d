use std::fmt::Debug;

use async_trait::async_trait;
use auto_impl::auto_impl;

use crate::{Transaction, XrplResult};

/// Fills in the fields a caller usually leaves blank: `Sequence`, `Fee` and
/// `LastLedgerSequence`.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait Autofill: Send + Sync + Debug {
    async fn autofill(&self, tx: Transaction) -> XrplResult<Transaction>;
}
