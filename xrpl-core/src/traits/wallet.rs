use std::fmt::Debug;

use async_trait::async_trait;
use auto_impl::auto_impl;

use crate::{SignedTransaction, Transaction, XrplResult};

/// Holds the keys for one account and produces signed blobs.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait Wallet: Send + Sync + Debug {
    /// The account this wallet signs for.
    fn classic_address(&self) -> String;

    /// Sign a transaction, returning the signed blob and its id.
    async fn sign(&self, tx: &Transaction) -> XrplResult<SignedTransaction>;
}
