use prometheus::{
    opts, register_int_counter_vec_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, IntCounter, IntCounterVec, IntGauge, Registry,
};

const METRICS_NAMESPACE: &str = "xrpl_submitter";

fn namespaced(name: &str) -> String {
    format!("{}_{}", METRICS_NAMESPACE, name)
}

/// Metrics for the request manager and the submission engine
#[derive(Clone)]
pub struct SubmitterMetrics {
    /// Metrics registry for adding new metrics and gathering reports
    registry: Registry,

    pub pending_requests: IntGauge,
    pub request_timeouts: IntCounter,

    // labelled with the preliminary engine result
    pub transaction_submissions: IntCounterVec,
    pub finalized_transactions: IntCounter,
    pub expired_transactions: IntCounter,
    pub poll_iterations: IntCounter,

    // one of "success", "error", "unsubmitted"
    pub batch_outcomes: IntCounterVec,
}

impl SubmitterMetrics {
    pub fn new(registry: Registry) -> eyre::Result<Self> {
        let pending_requests = register_int_gauge_with_registry!(
            opts!(
                namespaced("pending_requests"),
                "The number of calls awaiting a response",
            ),
            registry.clone()
        )?;
        let request_timeouts = register_int_counter_with_registry!(
            opts!(
                namespaced("request_timeouts"),
                "The number of calls failed by their deadline",
            ),
            registry.clone()
        )?;
        let transaction_submissions = register_int_counter_vec_with_registry!(
            opts!(
                namespaced("transaction_submissions"),
                "The number of transactions submitted, by preliminary engine result",
            ),
            &["engine_result",],
            registry.clone()
        )?;
        let finalized_transactions = register_int_counter_with_registry!(
            opts!(
                namespaced("finalized_transactions"),
                "The number of transactions seen in a validated ledger",
            ),
            registry.clone()
        )?;
        let expired_transactions = register_int_counter_with_registry!(
            opts!(
                namespaced("expired_transactions"),
                "The number of transactions whose LastLedgerSequence passed before validation",
            ),
            registry.clone()
        )?;
        let poll_iterations = register_int_counter_with_registry!(
            opts!(
                namespaced("poll_iterations"),
                "The number of finality polling rounds",
            ),
            registry.clone()
        )?;
        let batch_outcomes = register_int_counter_vec_with_registry!(
            opts!(
                namespaced("batch_outcomes"),
                "The number of batch items by outcome",
            ),
            &["outcome",],
            registry.clone()
        )?;
        Ok(Self {
            registry,
            pending_requests,
            request_timeouts,
            transaction_submissions,
            finalized_transactions,
            expired_transactions,
            poll_iterations,
            batch_outcomes,
        })
    }

    pub fn update_pending_requests_metric(&self, count: usize) {
        self.pending_requests.set(count as i64);
    }

    pub fn update_transaction_submissions_metric(&self, engine_result: &str) {
        self.transaction_submissions
            .with_label_values(&[engine_result])
            .inc();
    }

    pub fn update_batch_outcome_metric(&self, outcome: &str, count: usize) {
        self.batch_outcomes
            .with_label_values(&[outcome])
            .inc_by(count as u64);
    }

    pub fn gather(&self) -> prometheus::Result<Vec<u8>> {
        let collected_metrics = self.registry.gather();
        let mut out_buf = Vec::with_capacity(1024 * 64);
        let encoder = prometheus::TextEncoder::new();
        encoder.encode(&collected_metrics, &mut out_buf)?;
        Ok(out_buf)
    }

    #[cfg(test)]
    pub fn dummy_instance() -> Self {
        let registry = Registry::new();
        let instance = Self::new(registry);
        instance.unwrap()
    }
}

impl std::fmt::Debug for SubmitterMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitterMetrics")
            .field("pending_requests", &self.pending_requests.get())
            .finish()
    }
}
