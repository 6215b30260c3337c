//! Error types for balance operations.

use thiserror::Error;

use crate::console::InputError;
use crate::model::BalanceOverflow;
use crate::store::StoreError;

/// Error returned by [`Engine`](super::Engine) operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("account {0} not found")]
    AccountNotFound(String),

    #[error("cannot transfer from account {0} to itself")]
    SameAccount(String),

    #[error(transparent)]
    Overflow(#[from] BalanceOverflow),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Input(#[from] InputError),
}
