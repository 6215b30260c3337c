//! Keyed access to the clients and users files.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::Amount;
use crate::codec;
use crate::console::Console;
use crate::error::BankError;
use crate::model::{Client, Entity, User};
use crate::store::{FlatFile, StoreError};

/// Lookups over one entity file. Every call reloads the file.
#[derive(Debug, Clone)]
pub struct Repository<E> {
    file: FlatFile,
    _entity: PhantomData<fn() -> E>,
}

pub type ClientRepository = Repository<Client>;
pub type UserRepository = Repository<User>;

impl<E: Entity> Repository<E> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: FlatFile::new(path),
            _entity: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Fresh working copy of every stored entity.
    pub fn load_all(&self) -> Result<Vec<E>, StoreError> {
        self.file.load_all()
    }

    /// Replace the file content with `entities`, minus the deleted ones.
    pub fn save_all(&self, entities: &[E]) -> Result<usize, StoreError> {
        self.file.save_all(entities)
    }

    pub fn find_by_key(&self, key: &str) -> Result<Option<E>, StoreError> {
        Ok(self.load_all()?.into_iter().find(|e| e.key() == key))
    }

    pub fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_key(key)?.is_some())
    }

    /// Locate `key` inside a working copy so it can be changed before one save.
    pub fn find_ref_by_key<'a>(key: &str, entities: &'a mut [E]) -> Result<&'a mut E, BankError> {
        entities
            .iter_mut()
            .find(|e| e.key() == key)
            .ok_or_else(|| BankError::NotFound {
                kind: E::KIND,
                key: key.to_string(),
            })
    }

    /// Prompt until the operator enters a non-empty key that is not stored yet.
    pub fn read_new_key(&self, console: &mut dyn Console, prompt: &str) -> Result<String, BankError> {
        let mut key = console.read_line(prompt)?.trim().to_string();
        loop {
            if key.is_empty() {
                key = console.read_line("The key cannot be empty, enter a new one")?;
            } else if !codec::is_storable(&key) {
                key = console.read_line(&format!(
                    "The key cannot contain {}, enter a new one",
                    codec::DELIMITER
                ))?;
            } else if self.exists(&key)? {
                key = console.read_line(&format!("[{key}] already exists, enter a new one"))?;
            } else {
                return Ok(key);
            }
            key = key.trim().to_string();
        }
    }

    /// Prompt until the operator enters a key that is stored.
    pub fn read_existing_key(
        &self,
        console: &mut dyn Console,
        prompt: &str,
    ) -> Result<String, BankError> {
        let mut key = console.read_line(prompt)?.trim().to_string();
        while !self.exists(&key)? {
            key = console
                .read_line(&format!("[{key}] does not exist, enter an existing one"))?
                .trim()
                .to_string();
        }
        Ok(key)
    }
}

impl Repository<Client> {
    /// Client owning `account_number` when its PIN matches.
    pub fn find_by_pin(&self, account_number: &str, pin_code: &str) -> Result<Option<Client>, StoreError> {
        Ok(self
            .find_by_key(account_number)?
            .filter(|client| client.pin_code == pin_code))
    }

    /// Sum of every stored balance.
    pub fn total_balance(&self) -> Result<Amount, BankError> {
        let clients = self.load_all()?;
        Amount::checked_sum(clients.iter().map(Client::balance)).ok_or(BankError::TotalOverflow)
    }
}

impl Repository<User> {
    pub fn find_by_credentials(&self, username: &str, password: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|user| user.username() == username && user.password == password))
    }

    pub fn exists_with_password(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_credentials(username, password)?.is_some())
    }
}
