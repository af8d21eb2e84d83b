//! Error types for the EVM wallet manager

use alloy::primitives::U256;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid seed phrase: {0}")]
    InvalidSeed(String),

    #[error("Exceeded max fee for this operation: estimated fee {fee} wei is above the max fee of {max_fee} wei")]
    FeeExceeded { fee: U256, max_fee: U256 },

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("RPC rejected request: {0}")]
    Rpc(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("The wallet must be connected to a provider to {0}")]
    NotConnected(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stable failure category, for callers that branch on the kind of error
/// rather than on its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSeed,
    FeeExceeded,
    InsufficientFunds,
    Reverted,
    Network,
    Timeout,
    Rejected,
    Wallet,
    NotConnected,
    Config,
    InvalidArgument,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidSeed(_) => ErrorKind::InvalidSeed,
            Error::FeeExceeded { .. } => ErrorKind::FeeExceeded,
            Error::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            Error::Reverted(_) => ErrorKind::Reverted,
            Error::Network(_) => ErrorKind::Network,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Rpc(_) => ErrorKind::Rejected,
            Error::Wallet(_) => ErrorKind::Wallet,
            Error::NotConnected(_) => ErrorKind::NotConnected,
            Error::Config(_) | Error::Json(_) => ErrorKind::Config,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    /// Only transport failures are worth another attempt. Policy rejections and
    /// execution failures are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
