use thiserror::Error;

use crate::models::Balance;

/// Errors raised by the chain query and submission boundary
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Submission error: {0}")]
    Submission(String),

    #[error("Substrate error: {0}")]
    Subxt(#[from] subxt::Error),
}

/// Errors that abort a payout run before any validator is processed
#[derive(Error, Debug)]
pub enum PayoutError {
    #[error("Account {account} doesn't have available funds (free balance {free})")]
    InsufficientBalance { account: String, free: Balance },

    #[error("Failed to read balance of {account}: {source}")]
    BalanceUnavailable {
        account: String,
        #[source]
        source: ChainError,
    },

    #[error("Chain reports no active era")]
    ActiveEraUnavailable,

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

pub type Result<T> = std::result::Result<T, PayoutError>;
