//! Locations of the data files.

use std::path::{Path, PathBuf};

pub const CLIENTS_FILE: &str = "Clients.txt";
pub const USERS_FILE: &str = "Users.txt";
pub const LOGINS_FILE: &str = "Logins.txt";
pub const TRANSFERS_FILE: &str = "Transfer.txt";

/// Paths of the four data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub clients: PathBuf,
    pub users: PathBuf,
    pub logins: PathBuf,
    pub transfers: PathBuf,
}

impl Config {
    /// Every file under `dir`, with the default file names.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            clients: dir.join(CLIENTS_FILE),
            users: dir.join(USERS_FILE),
            logins: dir.join(LOGINS_FILE),
            transfers: dir.join(TRANSFERS_FILE),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::in_dir(".")
    }
}
