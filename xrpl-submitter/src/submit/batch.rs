use std::collections::VecDeque;

use futures_util::future::join_all;
use itertools::Itertools;
use parking_lot::Mutex;
use tracing::{info, info_span, warn, Instrument};

use xrpl_core::{Transaction, TxResponse, XrplError};

use super::{SubmitOptions, Submitter};

/// One transaction of a batch with its own options.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub transaction: Transaction,
    pub options: SubmitOptions,
}

impl BatchItem {
    pub fn new(transaction: Transaction, options: SubmitOptions) -> Self {
        Self {
            transaction,
            options,
        }
    }
}

/// Outcome of a batch.
///
/// Entries from different accounts interleave in completion order; within one
/// account they keep submission order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub success: Vec<TxResponse>,
    pub error: Vec<XrplError>,
    /// Items skipped because an earlier item of the same account failed
    pub unsubmitted: Vec<BatchItem>,
}

/// Shared sink the per-account workers append to.
#[derive(Default)]
struct BatchCollector {
    success: Mutex<Vec<TxResponse>>,
    error: Mutex<Vec<XrplError>>,
    unsubmitted: Mutex<Vec<BatchItem>>,
}

impl BatchCollector {
    fn into_result(self) -> BatchResult {
        BatchResult {
            success: self.success.into_inner(),
            error: self.error.into_inner(),
            unsubmitted: self.unsubmitted.into_inner(),
        }
    }
}

impl Submitter {
    /// Submits and waits for every item, serialized per account.
    ///
    /// Accounts progress concurrently. Within an account items go strictly in
    /// order, each one's `Sequence` set from the previous result, and the first
    /// failure leaves the rest of that account's items unsubmitted. Failures
    /// are collected, never returned.
    pub async fn submit_and_wait_batch(&self, items: Vec<BatchItem>) -> BatchResult {
        let queues = items
            .into_iter()
            .into_group_map_by(|item| item.transaction.account.clone());
        info!(accounts = queues.len(), "Submitting batch across accounts");

        let collector = BatchCollector::default();
        let workers = queues.into_iter().map(|(account, queue)| {
            let span = info_span!("batch_account", %account);
            self.process_account_queue(queue.into(), &collector)
                .instrument(span)
        });
        join_all(workers).await;

        let result = collector.into_result();
        self.metrics
            .update_batch_outcome_metric("success", result.success.len());
        self.metrics
            .update_batch_outcome_metric("error", result.error.len());
        self.metrics
            .update_batch_outcome_metric("unsubmitted", result.unsubmitted.len());
        result
    }

    async fn process_account_queue(
        &self,
        mut queue: VecDeque<BatchItem>,
        collector: &BatchCollector,
    ) {
        while let Some(item) = queue.pop_front() {
            match self.submit_and_wait(item.transaction, &item.options).await {
                Ok(response) => {
                    if let (Some(next), Some(sequence)) =
                        (queue.front_mut(), response.result.sequence)
                    {
                        next.transaction.sequence = Some(sequence.saturating_add(1));
                    }
                    collector.success.lock().push(response);
                }
                Err(err) => {
                    warn!(error = %err, skipped = queue.len(), "Batch item failed");
                    collector.error.lock().push(err);
                    collector.unsubmitted.lock().extend(queue.drain(..));
                    break;
                }
            }
        }
    }
}
