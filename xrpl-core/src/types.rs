pub use request_id::RequestId;
pub use response::{SubmitResponse, SubmitResult, TxResponse, TxResult};
pub use transaction::{SignedTransaction, SubmittableTransaction, Transaction, ACCOUNT_DELETE};

mod request_id;
mod response;
mod transaction;
