//! Reliable transaction submission.
//!
//! A transaction is signed if needed, submitted, and then followed ledger by
//! ledger until it is validated or its `LastLedgerSequence` has passed.

use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
    time::Duration,
};

use derive_new::new;
use serde_json::json;
use tracing::{debug, info, instrument};

use xrpl_core::{
    hashes::hash_signed_tx, Autofill, BinaryCodec, SubmitResponse, SubmittableTransaction,
    Transaction, TxResponse, Wallet, XrplError, XrplProvider, XrplResult,
};

use crate::SubmitterMetrics;

pub use batch::{BatchItem, BatchResult};
pub use finality::FinalityPoller;

mod batch;
mod finality;


/// Per-submission options.
#[derive(Clone)]
pub struct SubmitOptions {
    /// Fill in sequence, fee and ledger horizon before signing
    pub autofill: bool,
    /// Ask the node not to relay the transaction if it fails locally
    pub fail_hard: bool,
    /// Required when the transaction is not signed yet
    pub wallet: Option<Arc<dyn Wallet>>,
}

impl SubmitOptions {
    pub fn with_wallet(wallet: Arc<dyn Wallet>) -> Self {
        Self {
            wallet: Some(wallet),
            ..Default::default()
        }
    }
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            autofill: true,
            fail_hard: false,
            wallet: None,
        }
    }
}

impl Debug for SubmitOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitOptions")
            .field("autofill", &self.autofill)
            .field("fail_hard", &self.fail_hard)
            .field(
                "wallet",
                &self.wallet.as_ref().map(|wallet| wallet.classic_address()),
            )
            .finish()
    }
}

/// Signs, submits and follows transactions through one provider.
#[derive(new)]
pub struct Submitter {
    provider: Arc<dyn XrplProvider>,
    codec: Arc<dyn BinaryCodec>,
    autofiller: Arc<dyn Autofill>,
    ledger_close_time: Duration,
    metrics: SubmitterMetrics,
}

impl Submitter {
    /// Signs the transaction if needed and submits it.
    ///
    /// The response is the preliminary verdict of the first node, not finality.
    #[instrument(skip_all)]
    pub async fn submit(
        &self,
        transaction: impl Into<SubmittableTransaction>,
        options: &SubmitOptions,
    ) -> XrplResult<SubmitResponse> {
        let signed = self.get_signed_tx(transaction.into(), options).await?;
        self.submit_request(&signed, options.fail_hard).await
    }

    /// Submits the transaction and waits until its outcome is final.
    #[instrument(skip_all)]
    pub async fn submit_and_wait(
        &self,
        transaction: impl Into<SubmittableTransaction>,
        options: &SubmitOptions,
    ) -> XrplResult<TxResponse> {
        let signed = self.get_signed_tx(transaction.into(), options).await?;

        let last_ledger_sequence = self.view(&signed)?.last_ledger_sequence.ok_or_else(|| {
            XrplError::Validation(
                "Transaction must contain a LastLedgerSequence value for reliable submission."
                    .to_owned(),
            )
        })?;

        let response = self.submit_request(&signed, options.fail_hard).await?;

        let tx_hash = hash_signed_tx(&signed, self.codec.as_ref())?;
        info!(
            %tx_hash,
            last_ledger_sequence,
            engine_result = %response.result.engine_result,
            "Submitted transaction, waiting for finality"
        );
        self.poller()
            .wait(&tx_hash, last_ledger_sequence, &response.result.engine_result)
            .await
    }

    /// A poller following transactions through this submitter's provider.
    pub fn poller(&self) -> FinalityPoller<'_> {
        FinalityPoller::new(
            self.provider.as_ref(),
            self.ledger_close_time,
            &self.metrics,
        )
    }

    async fn get_signed_tx(
        &self,
        transaction: SubmittableTransaction,
        options: &SubmitOptions,
    ) -> XrplResult<SubmittableTransaction> {
        let tx = match transaction {
            SubmittableTransaction::Json(tx) if tx.is_signed() => {
                return Ok(SubmittableTransaction::Json(tx))
            }
            SubmittableTransaction::Json(tx) => *tx,
            SubmittableTransaction::Blob(blob) => {
                let decoded = self.codec.decode(&blob)?;
                if decoded.is_signed() {
                    return Ok(SubmittableTransaction::Blob(blob));
                }
                decoded
            }
        };

        let Some(wallet) = options.wallet.as_ref() else {
            return Err(XrplError::Validation(
                "Wallet must be provided when submitting an unsigned transaction".to_owned(),
            ));
        };

        let tx = if options.autofill {
            self.autofiller.autofill(tx).await?
        } else {
            tx
        };

        let signed = wallet.sign(&tx).await?;
        debug!(hash = %signed.hash, account = %tx.account, "Signed transaction");
        Ok(SubmittableTransaction::Blob(signed.tx_blob))
    }

    async fn submit_request(
        &self,
        signed: &SubmittableTransaction,
        fail_hard: bool,
    ) -> XrplResult<SubmitResponse> {
        let view = self.view(signed)?;
        if !view.is_signed() {
            return Err(XrplError::Validation("Transaction must be signed".to_owned()));
        }
        let tx_blob = match signed {
            SubmittableTransaction::Json(tx) => self.codec.encode(tx)?,
            SubmittableTransaction::Blob(blob) => blob.clone(),
        };
        let request = json!({
            "command": "submit",
            "tx_blob": tx_blob,
            "fail_hard": view.is_account_delete() || fail_hard,
        });

        let raw = self.provider.request(request).await?;
        let response: SubmitResponse = serde_json::from_value(raw.clone()).map_err(|err| {
            XrplError::format(format!("Malformed submit response: {err}"), Some(raw))
        })?;
        self.metrics
            .update_transaction_submissions_metric(&response.result.engine_result);
        Ok(response)
    }

    /// The transaction fields of either form.
    fn view(&self, tx: &SubmittableTransaction) -> XrplResult<Transaction> {
        match tx {
            SubmittableTransaction::Json(tx) => Ok(tx.as_ref().clone()),
            SubmittableTransaction::Blob(blob) => self.codec.decode(blob),
        }
    }
}

impl Debug for Submitter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("provider", &self.provider)
            .field("codec", &self.codec)
            .field("ledger_close_time", &self.ledger_close_time)
            .finish()
    }
}
