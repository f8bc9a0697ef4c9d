//! Reliable transaction submission against an XRP Ledger node.
//!
//! [`Client`] multiplexes calls over one connection, correlating each
//! response with its request through the [`RequestManager`]. [`Submitter`]
//! signs, submits and then polls until a transaction is validated or its
//! `LastLedgerSequence` has passed, and can drive whole batches with
//! per-account sequencing.

#![deny(clippy::unwrap_used, clippy::panic)]
#![deny(clippy::arithmetic_side_effects)]

pub use client::Client;
pub use metrics::SubmitterMetrics;
pub use request_manager::{PendingCallTable, RequestManager, ResponseHandle};
pub use settings::{
    trace::{Level, Style, TracingConfig},
    ClientSettings,
};
pub use submit::{BatchItem, BatchResult, FinalityPoller, SubmitOptions, Submitter};

mod client;
mod metrics;
mod request_manager;
mod settings;
mod submit;
