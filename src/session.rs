//! The logged-in staff user and the login screen.

use tracing::{info, warn};

use crate::audit::{Clock, LoginLogger};
use crate::console::Console;
use crate::error::BankError;
use crate::model::User;
use crate::permission::Capability;
use crate::repository::UserRepository;

pub const MAX_LOGIN_ATTEMPTS: u8 = 3;

pub const ACCESS_DENIED: &str = "\n------------------------------------------------------------------\n\
     This user doesn't have the permission, please contact the admin.\n\
     ------------------------------------------------------------------";

/// The user operating the menus until logout.
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn username(&self) -> &str {
        self.user.username()
    }

    pub fn has_permission(&self, capability: Capability) -> bool {
        self.user.permissions.allows(capability)
    }

    /// Check a capability, printing the access-denied banner when it is missing.
    pub fn require(&self, console: &mut dyn Console, capability: Capability) -> bool {
        if self.has_permission(capability) {
            return true;
        }
        warn!(user = %self.username(), ?capability, "access denied");
        console.print(ACCESS_DENIED);
        false
    }
}

/// Ask for credentials up to [`MAX_LOGIN_ATTEMPTS`] times.
///
/// A successful login is appended to the login log. Returns `None` once
/// every attempt failed.
pub fn authenticate(
    users: &UserRepository,
    logins: &LoginLogger,
    clock: &dyn Clock,
    console: &mut dyn Console,
) -> Result<Option<Session>, BankError> {
    let mut remaining = MAX_LOGIN_ATTEMPTS;
    loop {
        let username = console.read_line("Enter user name")?.trim().to_string();
        let password = console.read_secret("Enter password")?;

        if let Some(user) = users.find_by_credentials(&username, &password)? {
            logins.record(&user, clock)?;
            info!(user = %username, "logged in");
            return Ok(Some(Session::new(user)));
        }

        warn!(user = %username, "invalid credentials");
        console.print("\nInvalid user name/password!");
        remaining -= 1;
        if remaining == 0 {
            console.print("No more tries left, please try again later.");
            return Ok(None);
        }
        let tries = if remaining == 1 { "try" } else { "tries" };
        console.print(&format!("You have {remaining} {tries} left."));
    }
}
