use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `TransactionType` of an account deletion.
pub const ACCOUNT_DELETE: &str = "AccountDelete";

/// A transaction in JSON form, signed or not.
///
/// Only the fields the submitter reasons about are typed; everything else is
/// carried through `fields` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    pub transaction_type: String,
    pub account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ledger_sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_pub_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_signature: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Transaction {
    /// An unsigned transaction with no optional fields set.
    pub fn new(transaction_type: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            transaction_type: transaction_type.into(),
            account: account.into(),
            sequence: None,
            last_ledger_sequence: None,
            fee: None,
            signing_pub_key: None,
            txn_signature: None,
            fields: Map::new(),
        }
    }

    /// Sets an arbitrary field, e.g. `Destination` or `Amount`.
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_owned(), value.into());
        self
    }

    /// A transaction counts as signed once it carries a signing key or a signature.
    pub fn is_signed(&self) -> bool {
        self.signing_pub_key.is_some() || self.txn_signature.is_some()
    }

    /// Account deletions are irreversible and are always submitted with `fail_hard`.
    pub fn is_account_delete(&self) -> bool {
        self.transaction_type == ACCOUNT_DELETE
    }
}

/// What callers hand to the submitter: JSON, or an already encoded blob.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmittableTransaction {
    /// JSON form
    Json(Box<Transaction>),
    /// Hex-encoded binary form
    Blob(String),
}

impl From<Transaction> for SubmittableTransaction {
    fn from(tx: Transaction) -> Self {
        SubmittableTransaction::Json(Box::new(tx))
    }
}

impl From<String> for SubmittableTransaction {
    fn from(blob: String) -> Self {
        SubmittableTransaction::Blob(blob)
    }
}

/// Output of a wallet signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Hex-encoded signed transaction
    pub tx_blob: String,
    /// Transaction id
    pub hash: String,
}
