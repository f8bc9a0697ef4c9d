use std::fmt::Debug;

use auto_impl::auto_impl;

use crate::{Transaction, XrplResult};

/// Binary transaction codec.
#[auto_impl(&, Box, Arc)]
pub trait BinaryCodec: Send + Sync + Debug {
    /// Encode a transaction into its hex wire form.
    fn encode(&self, tx: &Transaction) -> XrplResult<String>;

    /// Decode a hex blob back into JSON form.
    fn decode(&self, blob: &str) -> XrplResult<Transaction>;
}
