//! Chain-agnostic building blocks shared by the XRP Ledger submitter: wire
//! types, the error taxonomy, the traits implemented by external
//! collaborators (transport, binary codec, wallet, autofill) and transaction
//! hashing.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::panic)]

pub use error::{XrplError, XrplResult};
pub use traits::*;
pub use types::*;

mod error;
pub mod hashes;
mod traits;
mod types;
