//! Balance-changing operations on client accounts.
//!
//! Every operation asks for confirmation once, changes the caller's working
//! copy of the client list and then rewrites the clients file in one save.
//! A declined confirmation changes nothing, in memory or on disk, and neither
//! does a change whose resulting balance would not fit in an [`Amount`].
//!
//! The engine does not check for overdrafts: withdrawal callers validate the
//! amount first with [`read_withdraw_amount`], so deposits and withdrawals
//! stay the same signed-delta operation.

use tracing::info;

use crate::Amount;
use crate::console::{self, Console, InputError};
use crate::model::Client;
use crate::repository::ClientRepository;

mod error;
pub use error::EngineError;

const CONFIRM_PROMPT: &str = "Are you sure you want to perform this transaction?";

/// Applies deposits, withdrawals and transfers to the clients file.
#[derive(Debug, Clone)]
pub struct Engine {
    clients: ClientRepository,
}

/// Public API
impl Engine {
    pub fn new(clients: ClientRepository) -> Self {
        Self { clients }
    }

    pub fn clients(&self) -> &ClientRepository {
        &self.clients
    }

    /// Add a signed `delta` to one account of the working list and save it.
    ///
    /// Returns the new balance, or `None` when the operator declined.
    /// Fails with [`EngineError::Overflow`] before prompting when the new
    /// balance is out of range.
    pub fn apply_delta(
        &self,
        console: &mut dyn Console,
        clients: &mut [Client],
        account: &str,
        delta: Amount,
    ) -> Result<Option<Amount>, EngineError> {
        let idx = Self::position(clients, account)?;
        let balance = clients[idx].balance_after(delta)?;

        if !console.confirm(CONFIRM_PROMPT)? {
            Self::log_result("balance change", account, delta, None);
            return Ok(None);
        }

        clients[idx].set_balance(balance);
        self.clients.save_all(clients)?;
        Self::log_result("balance change", account, delta, Some(balance));

        Ok(Some(balance))
    }

    /// Move `amount` from `source` to `destination` within one save.
    ///
    /// Returns both new balances, or `None` when the operator declined.
    pub fn transfer(
        &self,
        console: &mut dyn Console,
        clients: &mut [Client],
        source: &str,
        destination: &str,
        amount: Amount,
    ) -> Result<Option<(Amount, Amount)>, EngineError> {
        if source == destination {
            return Err(EngineError::SameAccount(source.to_string()));
        }
        let from = Self::position(clients, source)?;
        let to = Self::position(clients, destination)?;
        let source_balance = clients[from].balance_after(-amount)?;
        let destination_balance = clients[to].balance_after(amount)?;

        if !console.confirm(CONFIRM_PROMPT)? {
            info!(source, destination, amount = %amount, "transfer declined");
            return Ok(None);
        }

        clients[from].set_balance(source_balance);
        clients[to].set_balance(destination_balance);
        self.clients.save_all(clients)?;

        info!(
            source,
            destination,
            amount = %amount,
            source_balance = %source_balance,
            destination_balance = %destination_balance,
            "transfer applied"
        );
        Ok(Some((source_balance, destination_balance)))
    }

    /// Deposit into an account, starting from a fresh copy of the clients file.
    pub fn deposit(
        &self,
        console: &mut dyn Console,
        account: &str,
        amount: Amount,
    ) -> Result<Option<Amount>, EngineError> {
        let mut clients = self.clients.load_all()?;
        self.apply_delta(console, &mut clients, account, amount)
    }

    /// Withdraw from an account, starting from a fresh copy of the clients file.
    ///
    /// `amount` must already be validated against the balance.
    pub fn withdraw(
        &self,
        console: &mut dyn Console,
        account: &str,
        amount: Amount,
    ) -> Result<Option<Amount>, EngineError> {
        let mut clients = self.clients.load_all()?;
        self.apply_delta(console, &mut clients, account, -amount)
    }
}

/// Private API
impl Engine {
    fn position(clients: &[Client], account: &str) -> Result<usize, EngineError> {
        clients
            .iter()
            .position(|c| c.account_number() == account)
            .ok_or_else(|| EngineError::AccountNotFound(account.to_string()))
    }

    /// Small helper to log single-account results
    fn log_result(operation: &str, account: &str, delta: Amount, balance: Option<Amount>) {
        match balance {
            Some(balance) => info!(
                account,
                delta = %delta,
                balance = %balance,
                "{operation} applied"
            ),
            None => info!(account, delta = %delta, "{operation} declined"),
        }
    }
}

/// Read an amount greater than zero, re-prompting otherwise.
pub fn read_positive_amount(console: &mut dyn Console, prompt: &str) -> Result<Amount, InputError> {
    let mut amount = console::read_amount(console, prompt)?;
    while !amount.is_positive() {
        amount = console::read_amount(console, "The amount must be greater than zero, enter another one")?;
    }
    Ok(amount)
}

/// Read a positive amount that does not exceed `balance`, re-prompting otherwise.
pub fn read_withdraw_amount(
    console: &mut dyn Console,
    prompt: &str,
    balance: Amount,
) -> Result<Amount, InputError> {
    let mut amount = read_positive_amount(console, prompt)?;
    while amount > balance {
        console.print(&format!(
            "Amount exceeds the balance, you can withdraw up to: {balance}"
        ));
        amount = read_positive_amount(console, prompt)?;
    }
    Ok(amount)
}
