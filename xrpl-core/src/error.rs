use serde_json::Value;

use crate::RequestId;

/// Remote error code reported when a queried transaction is unknown to the node.
pub const TXN_NOT_FOUND: &str = "txnNotFound";

/// The result type used across the XRPL crates.
pub type XrplResult<T> = Result<T, XrplError>;

/// Every failure a call, a submission or a batch can surface.
///
/// The enum is `Clone` so that a single connection-level failure can settle
/// every pending call with the same error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum XrplError {
    /// The response did not have the expected shape.
    #[error("{message}")]
    ResponseFormat {
        /// What was wrong with the response
        message: String,
        /// The offending payload, when there was one
        data: Option<Value>,
    },
    /// The node answered with `status: "error"`.
    #[error("{message}")]
    Rippled {
        /// `error_message`, falling back to `error`
        message: String,
        /// The raw error response
        data: Value,
    },
    /// No response arrived before the call's deadline.
    #[error("{message}")]
    Timeout {
        /// Description including the request and its assigned id
        message: String,
        /// The id the call was issued under
        id: RequestId,
        /// The request as originally issued
        request: Value,
    },
    /// The caller broke a precondition; nothing was sent.
    #[error("{0}")]
    Validation(String),
    /// A request was attempted while the connection was down.
    #[error("{0}")]
    NotConnected(String),
    /// The connection closed while the call was pending.
    #[error("{0}")]
    Disconnected(String),
    /// The ledger moved past the transaction's `LastLedgerSequence`.
    #[error(
        "The latest ledger sequence {latest_ledger} is greater than the transaction's \
         LastLedgerSequence ({last_ledger_sequence}).\nPreliminary result: {preliminary_result}"
    )]
    LedgerExpired {
        /// Latest validated ledger index seen while polling
        latest_ledger: u32,
        /// The transaction's expiry horizon
        last_ledger_sequence: u32,
        /// Engine result returned at submission time
        preliminary_result: String,
    },
    /// The transaction status query failed for a reason other than "not found".
    #[error("{code} \n Preliminary result: {preliminary_result}.\nFull error details: {source}")]
    TransactionPoll {
        /// The remote error code, empty if the failure was not remote
        code: String,
        /// Engine result returned at submission time
        preliminary_result: String,
        /// The underlying query failure
        #[source]
        source: Box<XrplError>,
    },
    /// A settlement was attempted for an id nobody is waiting on.
    #[error("No existing pending call with id {id} ({action})")]
    NoPendingCall {
        /// The id that had no pending call
        id: RequestId,
        /// Which settlement was attempted
        action: &'static str,
    },
    /// A call was issued with an id that is still in flight.
    #[error("Response with id '{id}' is already pending")]
    DuplicateRequest {
        /// The clashing id
        id: RequestId,
    },
    /// Binary encoding or decoding failed.
    #[error("Codec error: {0}")]
    Codec(String),
    /// The wallet could not sign.
    #[error("Signer error: {0}")]
    Signer(String),
    /// Autofilling the transaction failed.
    #[error("Autofill error: {0}")]
    Autofill(String),
}

impl XrplError {
    /// Builds a format error that carries the offending payload.
    pub fn format(message: impl Into<String>, data: Option<Value>) -> Self {
        XrplError::ResponseFormat {
            message: message.into(),
            data,
        }
    }

    /// The `error` code reported by the node, if this is a remote error.
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            XrplError::Rippled { data, .. } => data.get("error").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Whether the node reported that it does not know the queried transaction.
    pub fn is_txn_not_found(&self) -> bool {
        self.remote_code() == Some(TXN_NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn remote_code_reads_the_error_field() {
        let err = XrplError::Rippled {
            message: "Transaction not found.".to_owned(),
            data: json!({"id": 3, "status": "error", "error": "txnNotFound"}),
        };
        assert_eq!(err.remote_code(), Some(TXN_NOT_FOUND));
        assert!(err.is_txn_not_found());
        assert!(!XrplError::Validation("nope".into()).is_txn_not_found());
    }

    #[test]
    fn expiry_message_embeds_the_comparison() {
        let err = XrplError::LedgerExpired {
            latest_ledger: 35060782,
            last_ledger_sequence: 35060781,
            preliminary_result: "terPRE_SEQ".to_owned(),
        };
        let message = err.to_string();
        assert!(message.contains("35060782"));
        assert!(message.contains("(35060781)"));
        assert!(message.ends_with("Preliminary result: terPRE_SEQ"));
    }
}
