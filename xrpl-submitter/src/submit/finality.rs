use std::time::Duration;

use derive_new::new;
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use xrpl_core::{TxResponse, XrplError, XrplProvider, XrplResult};

use crate::SubmitterMetrics;

/// Follows one submitted transaction until its fate is decided.
///
/// Each round waits one ledger close, then checks the validated ledger index
/// against the transaction's `LastLedgerSequence` before querying the
/// transaction itself. The only bound is that horizon; there is no other
/// timeout and no way to cancel a running poll short of dropping its future.
#[derive(new)]
pub struct FinalityPoller<'a> {
    provider: &'a dyn XrplProvider,
    ledger_close_time: Duration,
    metrics: &'a SubmitterMetrics,
}

impl FinalityPoller<'_> {
    /// Polls until the transaction is validated or can no longer be.
    ///
    /// `preliminary_result` is the engine result reported at submission and
    /// is only used to enrich errors.
    #[instrument(skip(self), fields(rounds = tracing::field::Empty))]
    pub async fn wait(
        &self,
        tx_hash: &str,
        last_ledger_sequence: u32,
        preliminary_result: &str,
    ) -> XrplResult<TxResponse> {
        let mut rounds: u64 = 0;
        loop {
            sleep(self.ledger_close_time).await;
            rounds = rounds.saturating_add(1);
            tracing::Span::current().record("rounds", rounds);
            self.metrics.poll_iterations.inc();

            let latest_ledger = self.provider.get_ledger_index().await?;
            if last_ledger_sequence < latest_ledger {
                warn!(
                    latest_ledger,
                    last_ledger_sequence,
                    "Transaction expired before validation"
                );
                self.metrics.expired_transactions.inc();
                return Err(XrplError::LedgerExpired {
                    latest_ledger,
                    last_ledger_sequence,
                    preliminary_result: preliminary_result.to_owned(),
                });
            }

            let query = json!({"command": "tx", "transaction": tx_hash});
            match self.provider.request(query).await {
                Ok(raw) => {
                    let response: TxResponse = match serde_json::from_value(raw.clone()) {
                        Ok(response) => response,
                        Err(err) => {
                            let err = XrplError::format(
                                format!("Malformed tx response: {err}"),
                                Some(raw),
                            );
                            warn!(error = %err, "Transaction status query failed");
                            return Err(poll_failure(err, preliminary_result));
                        }
                    };
                    if response.result.validated {
                        info!(latest_ledger, "Transaction validated");
                        self.metrics.finalized_transactions.inc();
                        return Ok(response);
                    }
                    debug!(latest_ledger, "Transaction not validated yet");
                }
                Err(err) if err.is_txn_not_found() => {
                    debug!(latest_ledger, "Transaction not found yet");
                }
                Err(err) => {
                    warn!(error = %err, "Transaction status query failed");
                    return Err(poll_failure(err, preliminary_result));
                }
            }
        }
    }
}

/// Terminal poll failure carrying the submission's engine result.
fn poll_failure(err: XrplError, preliminary_result: &str) -> XrplError {
    XrplError::TransactionPoll {
        code: err.remote_code().unwrap_or_default().to_owned(),
        preliminary_result: preliminary_result.to_owned(),
        source: Box::new(err),
    }
}
