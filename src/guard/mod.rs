//! Pre-broadcast safety checks
//!
//! Every submission is quoted and checked here before it is signed.

mod fee_guard;

pub use fee_guard::{FeeGuard, FeeQuote};
