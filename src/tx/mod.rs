//! Transaction construction, submission and confirmation

mod confirm;
mod retry;
mod submitter;
mod types;

pub use confirm::ConfirmationWaiter;
pub use retry::RetryPolicy;
pub use submitter::Submitter;
pub use types::{TransactionDescriptor, TransactionResult, TransferRequest};
