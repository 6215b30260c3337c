//! Append-only login and transfer logs.

use std::path::PathBuf;

use chrono::Local;
use tracing::info;

use crate::Amount;
use crate::model::{Client, LoginRecord, TransferRecord, User};
use crate::store::{FlatFile, StoreError};

/// Source of the timestamps written to the logs.
pub trait Clock {
    fn timestamp(&self) -> String;
}

/// Local wall-clock time without zero padding, e.g. `7/3/2024 - 9:5:1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp(&self) -> String {
        Local::now().format("%-d/%-m/%Y - %-H:%-M:%-S").to_string()
    }
}

/// Always returns the same timestamp.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn timestamp(&self) -> String {
        self.0.clone()
    }
}

/// Records every successful staff login.
#[derive(Debug, Clone)]
pub struct LoginLogger {
    file: FlatFile,
}

impl LoginLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: FlatFile::new(path),
        }
    }

    pub fn record(&self, user: &User, clock: &dyn Clock) -> Result<LoginRecord, StoreError> {
        let record = LoginRecord {
            timestamp: clock.timestamp(),
            username: user.username().to_string(),
            password: user.password.clone(),
            permissions: user.permissions,
        };
        self.file.append(&record)?;
        info!(user = %record.username, "login recorded");
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<LoginRecord>, StoreError> {
        self.file.load_all()
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.file.clear()
    }
}

/// Records every completed transfer.
#[derive(Debug, Clone)]
pub struct TransferLogger {
    file: FlatFile,
}

impl TransferLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: FlatFile::new(path),
        }
    }

    /// Log a transfer; `source` and `destination` carry their post-transfer balances.
    pub fn record(
        &self,
        source: &Client,
        destination: &Client,
        amount: Amount,
        operator: &str,
        clock: &dyn Clock,
    ) -> Result<TransferRecord, StoreError> {
        let record = TransferRecord {
            timestamp: clock.timestamp(),
            source_account: source.account_number().to_string(),
            destination_account: destination.account_number().to_string(),
            amount,
            source_balance: source.balance(),
            destination_balance: destination.balance(),
            operator: operator.to_string(),
        };
        self.file.append(&record)?;
        info!(
            source = %record.source_account,
            destination = %record.destination_account,
            amount = %amount,
            operator,
            "transfer recorded"
        );
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<TransferRecord>, StoreError> {
        self.file.load_all()
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.file.clear()
    }
}
