//! Crate-level error, handled at the boundary of each menu action.

use thiserror::Error;

use crate::console::InputError;
use crate::engine::EngineError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum BankError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("{kind} '{key}' not found")]
    NotFound { kind: &'static str, key: String },

    #[error("total balance is out of range")]
    TotalOverflow,

    #[error("transaction failed: {0}")]
    Engine(#[from] EngineError),

    #[error("failed to write report: {0}")]
    Report(#[from] csv::Error),
}

impl BankError {
    /// The operator's terminal failed; no further action can be read.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            BankError::Input(_) | BankError::Engine(EngineError::Input(_))
        )
    }
}
