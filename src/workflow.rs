//! Add, find, update and delete screens shared by clients and users.
//!
//! Each screen reloads the entity file, reads a key with the repository's
//! existence loop, works on the loaded copy and saves it back in one go.

use tracing::{info, warn};

use crate::codec;
use crate::console::{self, Console, InputError};
use crate::error::BankError;
use crate::model::{Client, Entity, User};
use crate::permission;
use crate::repository::Repository;

/// The entity-specific parts of the shared screens.
pub trait EntityForm: Entity {
    /// Display name, e.g. "Client".
    const LABEL: &'static str;
    const KEY_PROMPT: &'static str;

    /// An entity holding only its key, ready to be filled in.
    fn blank(key: &str) -> Self;

    /// Ask the operator for every editable field.
    fn fill(&mut self, console: &mut dyn Console) -> Result<(), InputError>;

    /// Multi-line summary shown after lookups and changes.
    fn card(&self) -> String;

    /// Keys that may be neither updated nor deleted.
    fn is_protected(_key: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome<E> {
    Updated(E),
    Declined,
    Protected,
    NotFound,
    /// The located entity was never filled in.
    EmptyObject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome<E> {
    Deleted(E),
    Declined,
    Protected,
    NotFound,
}

/// Read a new key, fill in a blank entity and append it to the file.
pub fn add_new<E: EntityForm>(
    repo: &Repository<E>,
    console: &mut dyn Console,
) -> Result<E, BankError> {
    let mut entities = repo.load_all()?;

    let mut key = repo.read_new_key(console, E::KEY_PROMPT)?;
    while E::is_protected(&key) {
        warn!(kind = E::KIND, key = %key, "reserved key refused");
        key = repo.read_new_key(console, &format!("[{key}] is reserved, enter a new one"))?;
    }
    let mut entity = E::blank(&key);
    entity.fill(console)?;
    entity.mark_updatable();

    entities.push(entity.clone());
    repo.save_all(&entities)?;
    info!(kind = E::KIND, key = %key, "added");

    console.print(&format!("\n{} added successfully.", E::LABEL));
    console.print(&entity.card());
    Ok(entity)
}

/// Read an existing key and show the matching entity.
pub fn find<E: EntityForm>(
    repo: &Repository<E>,
    console: &mut dyn Console,
) -> Result<Option<E>, BankError> {
    let key = repo.read_existing_key(console, E::KEY_PROMPT)?;

    let found = repo.find_by_key(&key)?;
    match &found {
        Some(entity) => {
            console.print(&format!("\n{} found.", E::LABEL));
            console.print(&entity.card());
        }
        None => console.print(&format!("\n{} [{key}] was not found.", E::LABEL)),
    }
    Ok(found)
}

/// Read an existing key, confirm and fill the entity in again.
pub fn update<E: EntityForm>(
    repo: &Repository<E>,
    console: &mut dyn Console,
) -> Result<UpdateOutcome<E>, BankError> {
    let mut entities = repo.load_all()?;

    let key = repo.read_existing_key(console, E::KEY_PROMPT)?;
    if E::is_protected(&key) {
        warn!(kind = E::KIND, key = %key, "update of protected entity refused");
        console.print(&format!(
            "\nThis {} can't be updated, please contact the admin for more information.",
            E::LABEL
        ));
        return Ok(UpdateOutcome::Protected);
    }

    let entity = match locate(&key, &mut entities, console)? {
        Some(entity) => entity,
        None => return Ok(UpdateOutcome::NotFound),
    };
    console.print(&entity.card());

    if !console.confirm(&format!("Are you sure you want to update this {}?", E::LABEL))? {
        return Ok(UpdateOutcome::Declined);
    }
    if !entity.is_updatable() {
        console.print("\nUpdate failed, it's an empty object.");
        return Ok(UpdateOutcome::EmptyObject);
    }

    entity.fill(console)?;
    let updated = entity.clone();
    repo.save_all(&entities)?;
    info!(kind = E::KIND, key = %key, "updated");

    console.print(&format!("\n{} updated successfully.", E::LABEL));
    console.print(&updated.card());
    Ok(UpdateOutcome::Updated(updated))
}

/// Read an existing key, confirm and drop the entity from the file.
pub fn delete<E: EntityForm>(
    repo: &Repository<E>,
    console: &mut dyn Console,
) -> Result<DeleteOutcome<E>, BankError> {
    let mut entities = repo.load_all()?;

    let key = repo.read_existing_key(console, E::KEY_PROMPT)?;
    if E::is_protected(&key) {
        warn!(kind = E::KIND, key = %key, "delete of protected entity refused");
        console.print(&format!(
            "\nThis {} can't be deleted, please contact the admin for more information.",
            E::LABEL
        ));
        return Ok(DeleteOutcome::Protected);
    }

    let entity = match locate(&key, &mut entities, console)? {
        Some(entity) => entity,
        None => return Ok(DeleteOutcome::NotFound),
    };
    console.print(&entity.card());

    if !console.confirm(&format!("Are you sure you want to delete this {}?", E::LABEL))? {
        return Ok(DeleteOutcome::Declined);
    }

    entity.mark_deleted();
    let removed = entity.clone();
    repo.save_all(&entities)?;
    info!(kind = E::KIND, key = %key, "deleted");

    console.print(&format!("\n{} deleted successfully.", E::LABEL));
    Ok(DeleteOutcome::Deleted(removed))
}

/// Find `key` in the working copy; a miss is reported, not raised.
fn locate<'a, E: EntityForm>(
    key: &str,
    entities: &'a mut [E],
    console: &mut dyn Console,
) -> Result<Option<&'a mut E>, BankError> {
    match Repository::<E>::find_ref_by_key(key, entities) {
        Ok(entity) => Ok(Some(entity)),
        Err(BankError::NotFound { .. }) => {
            console.print(&format!("\n{} [{key}] was not found.", E::LABEL));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Read one free-text field, re-prompting while it cannot be stored.
fn read_field(console: &mut dyn Console, prompt: &str) -> Result<String, InputError> {
    let mut text = console.read_line(prompt)?;
    while !codec::is_storable(&text) {
        console.print(&format!("\nThe text cannot contain {}.", codec::DELIMITER));
        text = console.read_line(prompt)?;
    }
    Ok(text)
}

fn render_card(title: &str, rows: &[(&str, String)]) -> String {
    const RULE: &str = "- - - - - - - - - - - - - - - - - - -";
    let mut card = format!("\n{title} Card:\n{RULE}\n");
    for (name, value) in rows {
        card.push_str(&format!("{name:<13}: {value}\n"));
    }
    card.push_str(RULE);
    card
}

impl EntityForm for Client {
    const LABEL: &'static str = "Client";
    const KEY_PROMPT: &'static str = "Please enter an account number";

    fn blank(key: &str) -> Self {
        Client::new(key)
    }

    fn fill(&mut self, console: &mut dyn Console) -> Result<(), InputError> {
        self.person.first_name = read_field(console, "Enter first name")?;
        self.person.last_name = read_field(console, "Enter last name")?;
        self.person.email = read_field(console, "Enter email")?;
        self.person.phone = read_field(console, "Enter phone")?;
        self.pin_code = read_field(console, "Enter PIN code")?;
        let balance = console::read_amount(console, "Enter account balance")?;
        self.set_balance(balance);
        Ok(())
    }

    fn card(&self) -> String {
        render_card(
            "Client",
            &[
                ("First Name", self.person.first_name.clone()),
                ("Last Name", self.person.last_name.clone()),
                ("Full Name", self.person.full_name()),
                ("Email", self.person.email.clone()),
                ("Phone", self.person.phone.clone()),
                ("Acc. Number", self.account_number().to_string()),
                ("PIN Code", "*".repeat(self.pin_code.chars().count())),
                ("Balance", self.balance().to_string()),
            ],
        )
    }
}

impl EntityForm for User {
    const LABEL: &'static str = "User";
    const KEY_PROMPT: &'static str = "Please enter a user name";

    fn blank(key: &str) -> Self {
        User::new(key)
    }

    fn fill(&mut self, console: &mut dyn Console) -> Result<(), InputError> {
        self.person.first_name = read_field(console, "Enter first name")?;
        self.person.last_name = read_field(console, "Enter last name")?;
        self.person.email = read_field(console, "Enter email")?;
        self.person.phone = read_field(console, "Enter phone")?;
        self.password = read_field(console, "Enter password")?;
        self.permissions = permission::grant_interactive(console)?;
        Ok(())
    }

    fn card(&self) -> String {
        render_card(
            "User",
            &[
                ("First Name", self.person.first_name.clone()),
                ("Last Name", self.person.last_name.clone()),
                ("Full Name", self.person.full_name()),
                ("Email", self.person.email.clone()),
                ("Phone", self.person.phone.clone()),
                ("User Name", self.username().to_string()),
                ("Password", "*".repeat(self.password.chars().count())),
                ("Permissions", self.permissions.to_string()),
            ],
        )
    }

    fn is_protected(key: &str) -> bool {
        User::is_admin_name(key)
    }
}
