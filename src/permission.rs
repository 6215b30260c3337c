//! Capability bits granted to staff users.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::console::{Console, InputError};

/// A discrete action a user may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewClients,
    AddClient,
    DeleteClient,
    UpdateClient,
    FindClient,
    Transactions,
    ManageUsers,
    ViewLoginRecords,
}

impl Capability {
    /// Every known capability, in bit order.
    pub const ALL: [Capability; 8] = [
        Capability::ViewClients,
        Capability::AddClient,
        Capability::DeleteClient,
        Capability::UpdateClient,
        Capability::FindClient,
        Capability::Transactions,
        Capability::ManageUsers,
        Capability::ViewLoginRecords,
    ];

    pub fn bit(self) -> u32 {
        match self {
            Capability::ViewClients => 1,
            Capability::AddClient => 2,
            Capability::DeleteClient => 4,
            Capability::UpdateClient => 8,
            Capability::FindClient => 16,
            Capability::Transactions => 32,
            Capability::ManageUsers => 64,
            Capability::ViewLoginRecords => 128,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Capability::ViewClients => "Show Client List",
            Capability::AddClient => "Add New Client",
            Capability::DeleteClient => "Delete Client",
            Capability::UpdateClient => "Update Client",
            Capability::FindClient => "Find Client",
            Capability::Transactions => "Transactions",
            Capability::ManageUsers => "Manage Users",
            Capability::ViewLoginRecords => "Show Login Records",
        }
    }
}

/// Error for an access value that is neither `-1` nor a bit mask.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid access value {0}")]
pub struct InvalidAccessValue(pub i64);

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "i64")]
pub enum Permissions {
    /// Every capability, including bits defined later. Stored as `-1`.
    Full,
    /// Only the capabilities whose bits are set.
    Bits(u32),
}

impl Permissions {
    pub const FULL_ACCESS_VALUE: i64 = -1;

    pub fn none() -> Self {
        Permissions::Bits(0)
    }

    pub fn with(self, capability: Capability) -> Self {
        match self {
            Permissions::Full => Permissions::Full,
            Permissions::Bits(mask) => Permissions::Bits(mask | capability.bit()),
        }
    }

    pub fn allows(self, capability: Capability) -> bool {
        self.allows_bits(capability.bit())
    }

    /// Check an arbitrary set of bits; all of them must be granted.
    pub fn allows_bits(self, bits: u32) -> bool {
        match self {
            Permissions::Full => true,
            Permissions::Bits(mask) => bits & mask == bits,
        }
    }

    /// The integer written to the users file and the login log.
    pub fn access_value(self) -> i64 {
        match self {
            Permissions::Full => Self::FULL_ACCESS_VALUE,
            Permissions::Bits(mask) => i64::from(mask),
        }
    }
}

impl TryFrom<i64> for Permissions {
    type Error = InvalidAccessValue;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == Self::FULL_ACCESS_VALUE {
            return Ok(Permissions::Full);
        }
        u32::try_from(value)
            .map(Permissions::Bits)
            .map_err(|_| InvalidAccessValue(value))
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permissions::Full => write!(f, "Full Access"),
            Permissions::Bits(mask) => write!(f, "{mask}"),
        }
    }
}

/// Build a permission set by asking about full access, then each capability.
pub fn grant_interactive(console: &mut dyn Console) -> Result<Permissions, InputError> {
    if console.confirm("Do you want to give full access?")? {
        return Ok(Permissions::Full);
    }

    console.print("\nDo you want to give access to:");
    let mut permissions = Permissions::none();
    for capability in Capability::ALL {
        if console.confirm(&format!("{}?", capability.label()))? {
            permissions = permissions.with(capability);
        }
    }
    Ok(permissions)
}
