use thiserror::Error;

use crate::domain::AccountError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Script error at line {line}: {message}")]
    Script { line: usize, message: String },

    // Domain failures pass through untouched so every kind keeps its own
    // stable message.
    #[error(transparent)]
    Account(#[from] AccountError),
}
