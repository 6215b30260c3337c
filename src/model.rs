//! Core domain types for the bank records.

use thiserror::Error;

use crate::Amount;
use crate::codec::Record;
use crate::permission::Permissions;

/// Identity fields shared by clients and users.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Whether an in-memory entity is backed by a stored record.
///
/// The "empty" state of a lookup miss is expressed with `Option` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Constructed from a fresh key, not yet filled in or saved.
    #[default]
    New,
    /// Loaded from the store or filled in and ready to be saved.
    Updatable,
}

/// An entity kept in a flat file under a unique key.
pub trait Entity: Record + Clone {
    fn key(&self) -> &str;
    fn mode(&self) -> Mode;
    fn mark_updatable(&mut self);
    fn is_deleted(&self) -> bool;
    /// Flag the entity so the next save drops it from the file.
    fn mark_deleted(&mut self);

    fn is_updatable(&self) -> bool {
        self.mode() == Mode::Updatable
    }
}

/// A balance change whose result does not fit in an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("balance {balance} of account {account} cannot change by {delta}")]
pub struct BalanceOverflow {
    pub account: String,
    pub balance: Amount,
    pub delta: Amount,
}

/// A bank account holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub person: Person,
    account_number: String,
    /// Only checked by the self-service session.
    pub pin_code: String,
    balance: Amount,
    mode: Mode,
    deleted: bool,
}

impl Client {
    /// A blank client holding only its account number.
    pub fn new(account_number: impl Into<String>) -> Self {
        Self {
            person: Person::default(),
            account_number: account_number.into(),
            pin_code: String::new(),
            balance: Amount::ZERO,
            mode: Mode::New,
            deleted: false,
        }
    }

    /// A client as read back from the store.
    pub fn stored(
        person: Person,
        account_number: impl Into<String>,
        pin_code: impl Into<String>,
        balance: Amount,
    ) -> Self {
        Self {
            person,
            account_number: account_number.into(),
            pin_code: pin_code.into(),
            balance,
            mode: Mode::Updatable,
            deleted: false,
        }
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn set_balance(&mut self, balance: Amount) {
        self.balance = balance;
    }

    /// Balance after adding a signed amount, leaving the client unchanged.
    pub fn balance_after(&self, delta: Amount) -> Result<Amount, BalanceOverflow> {
        self.balance
            .checked_add(delta)
            .ok_or_else(|| BalanceOverflow {
                account: self.account_number.clone(),
                balance: self.balance,
                delta,
            })
    }
}

impl Entity for Client {
    fn key(&self) -> &str {
        &self.account_number
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn mark_updatable(&mut self) {
        self.mode = Mode::Updatable;
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

/// A staff operator with credentials and a permission set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub person: Person,
    username: String,
    pub password: String,
    pub permissions: Permissions,
    mode: Mode,
    deleted: bool,
}

impl User {
    /// User name that can be neither updated nor deleted.
    pub const ADMIN: &'static str = "Admin";

    /// A blank user holding only its user name.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            person: Person::default(),
            username: username.into(),
            password: String::new(),
            permissions: Permissions::none(),
            mode: Mode::New,
            deleted: false,
        }
    }

    /// A user as read back from the store.
    pub fn stored(
        person: Person,
        username: impl Into<String>,
        password: impl Into<String>,
        permissions: Permissions,
    ) -> Self {
        Self {
            person,
            username: username.into(),
            password: password.into(),
            permissions,
            mode: Mode::Updatable,
            deleted: false,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The reserved administrator, matched case-insensitively.
    pub fn is_admin_name(username: &str) -> bool {
        username.eq_ignore_ascii_case(Self::ADMIN)
    }
}

impl Entity for User {
    fn key(&self) -> &str {
        &self.username
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn mark_updatable(&mut self) {
        self.mode = Mode::Updatable;
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

/// One successful staff login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRecord {
    pub timestamp: String,
    pub username: String,
    /// Kept in clear text for compatibility with existing log files.
    pub password: String,
    pub permissions: Permissions,
}

/// One completed transfer between two client accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub timestamp: String,
    pub source_account: String,
    pub destination_account: String,
    pub amount: Amount,
    pub source_balance: Amount,
    pub destination_balance: Amount,
    pub operator: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_client_is_blank() {
        let client = Client::new("1001");
        assert_eq!(client.key(), "1001");
        assert_eq!(client.balance(), Amount::ZERO);
        assert_eq!(client.mode(), Mode::New);
        assert!(!client.is_updatable());
        assert!(!client.is_deleted());
    }

    #[test]
    fn stored_client_is_updatable() {
        let client = Client::stored(Person::default(), "1001", "0000", Amount::from_units(5));
        assert!(client.is_updatable());
    }

    #[test]
    fn balance_after_adds_signed_delta() {
        let mut client = Client::new("1001");
        client.set_balance(Amount::from_units(100));
        assert_eq!(client.balance_after(Amount::from_units(-30)), Ok(Amount::from_units(70)));
        assert_eq!(client.balance_after(Amount::from_units(5)), Ok(Amount::from_units(105)));
        assert_eq!(client.balance(), Amount::from_units(100));
    }

    #[test]
    fn balance_after_out_of_range_is_an_error() {
        let start = Amount::from_units(900_000_000_000_000);
        let client = Client::stored(Person::default(), "1001", "0000", start);

        let err = client.balance_after(start).unwrap_err();
        assert_eq!(err.account, "1001");
        assert_eq!(err.delta, start);
        assert_eq!(client.balance(), start);
    }

    #[test]
    fn mode_transitions() {
        let mut user = User::new("jdoe");
        assert_eq!(user.mode(), Mode::New);
        user.mark_updatable();
        assert!(user.is_updatable());
        user.mark_deleted();
        assert!(user.is_deleted());
    }

    #[test]
    fn admin_name_ignores_case() {
        assert!(User::is_admin_name("Admin"));
        assert!(User::is_admin_name("admin"));
        assert!(!User::is_admin_name("administrator"));
    }

    #[test]
    fn full_name_joins_names() {
        let person = Person {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            ..Person::default()
        };
        assert_eq!(person.full_name(), "Ada Lovelace");
    }
}
