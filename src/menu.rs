//! Staff screens: main menu, transactions, user management and the audit lists.
//!
//! Every screen reloads what it shows. Failures of a single action are
//! reported and the menu it was started from keeps running; only a broken
//! terminal ends the program.

use tracing::{error, info, warn};

use crate::Amount;
use crate::audit::{Clock, LoginLogger, TransferLogger};
use crate::config::Config;
use crate::console::{Console, read_number_between};
use crate::engine::{self, Engine};
use crate::error::BankError;
use crate::model::{Client, Person, User};
use crate::permission::{Capability, Permissions};
use crate::repository::{ClientRepository, UserRepository};
use crate::session::{self, Session};
use crate::store::StoreError;
use crate::workflow::{self, EntityForm};

const DEFAULT_ADMIN_PASSWORD: &str = "1234";
const ACCOUNT_PROMPT: &str = "Please enter an account number";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainOption {
    ShowClients,
    AddClient,
    DeleteClient,
    UpdateClient,
    FindClient,
    Transactions,
    ManageUsers,
    LoginRecords,
    Logout,
}

impl MainOption {
    const MENU: [MainOption; 9] = [
        MainOption::ShowClients,
        MainOption::AddClient,
        MainOption::DeleteClient,
        MainOption::UpdateClient,
        MainOption::FindClient,
        MainOption::Transactions,
        MainOption::ManageUsers,
        MainOption::LoginRecords,
        MainOption::Logout,
    ];

    fn label(self) -> &'static str {
        match self {
            MainOption::ShowClients => "Show Client List",
            MainOption::AddClient => "Add New Client",
            MainOption::DeleteClient => "Delete Client",
            MainOption::UpdateClient => "Update Client Info",
            MainOption::FindClient => "Find Client",
            MainOption::Transactions => "Transactions",
            MainOption::ManageUsers => "Manage Users",
            MainOption::LoginRecords => "Login Records",
            MainOption::Logout => "Logout",
        }
    }

    fn capability(self) -> Option<Capability> {
        match self {
            MainOption::ShowClients => Some(Capability::ViewClients),
            MainOption::AddClient => Some(Capability::AddClient),
            MainOption::DeleteClient => Some(Capability::DeleteClient),
            MainOption::UpdateClient => Some(Capability::UpdateClient),
            MainOption::FindClient => Some(Capability::FindClient),
            MainOption::Transactions => Some(Capability::Transactions),
            MainOption::ManageUsers => Some(Capability::ManageUsers),
            MainOption::LoginRecords => Some(Capability::ViewLoginRecords),
            MainOption::Logout => None,
        }
    }
}

const TRANSACTIONS_MENU: [&str; 6] = [
    "Deposit",
    "Withdraw",
    "Total Balances",
    "Transfer",
    "Transfer Records",
    "Main Menu",
];

const USERS_MENU: [&str; 6] = [
    "List Users",
    "Add New User",
    "Delete User",
    "Update User",
    "Find User",
    "Main Menu",
];

/// The staff application over one data directory.
pub struct App {
    clients: ClientRepository,
    users: UserRepository,
    engine: Engine,
    logins: LoginLogger,
    transfers: TransferLogger,
    clock: Box<dyn Clock>,
}

impl App {
    pub fn new(config: &Config, clock: Box<dyn Clock>) -> Self {
        let clients = ClientRepository::new(config.clients.clone());
        Self {
            engine: Engine::new(clients.clone()),
            clients,
            users: UserRepository::new(config.users.clone()),
            logins: LoginLogger::new(config.logins.clone()),
            transfers: TransferLogger::new(config.transfers.clone()),
            clock,
        }
    }

    /// Seed the default administrator when no user is stored yet.
    ///
    /// Returns whether a user was created.
    pub fn ensure_admin(&self) -> Result<bool, StoreError> {
        if !self.users.load_all()?.is_empty() {
            return Ok(false);
        }
        let admin = User::stored(
            Person::default(),
            User::ADMIN,
            DEFAULT_ADMIN_PASSWORD,
            Permissions::Full,
        );
        self.users.save_all(&[admin])?;
        warn!(
            path = %self.users.path().display(),
            "no users stored, created the default administrator"
        );
        Ok(true)
    }

    /// Login screen and main menu until a login runs out of attempts.
    pub fn run(&self, console: &mut dyn Console) -> Result<(), BankError> {
        loop {
            header(console, "Login Screen");
            let session =
                match session::authenticate(&self.users, &self.logins, self.clock.as_ref(), console)? {
                    Some(session) => session,
                    None => return Ok(()),
                };
            self.main_menu(&session, console)?;
            info!(user = %session.username(), "logged out");
        }
    }
}

/// Menus
impl App {
    fn main_menu(&self, session: &Session, console: &mut dyn Console) -> Result<(), BankError> {
        loop {
            let labels = MainOption::MENU.map(MainOption::label);
            let choice = choose(console, "Main Menu Screen", &labels)?;
            let option = MainOption::MENU[usize::from(choice) - 1];
            if option == MainOption::Logout {
                return Ok(());
            }

            if let Some(capability) = option.capability() {
                if !session.require(console, capability) {
                    continue;
                }
            }

            let result = match option {
                MainOption::ShowClients => self.show_clients(console),
                MainOption::AddClient => workflow::add_new(&self.clients, console).map(drop),
                MainOption::DeleteClient => workflow::delete(&self.clients, console).map(drop),
                MainOption::UpdateClient => workflow::update(&self.clients, console).map(drop),
                MainOption::FindClient => workflow::find(&self.clients, console).map(drop),
                MainOption::Transactions => self.transactions_menu(session, console),
                MainOption::ManageUsers => self.users_menu(console),
                MainOption::LoginRecords => self.show_login_records(console),
                MainOption::Logout => Ok(()),
            };
            finish_action(console, result)?;
        }
    }

    fn transactions_menu(&self, session: &Session, console: &mut dyn Console) -> Result<(), BankError> {
        loop {
            let result = match choose(console, "Transactions Menu Screen", &TRANSACTIONS_MENU)? {
                1 => self.deposit(console),
                2 => self.withdraw(console),
                3 => self.show_total_balances(console),
                4 => self.transfer(session, console),
                5 => self.show_transfer_records(console),
                _ => return Ok(()),
            };
            finish_action(console, result)?;
        }
    }

    fn users_menu(&self, console: &mut dyn Console) -> Result<(), BankError> {
        loop {
            let result = match choose(console, "Manage Users Menu Screen", &USERS_MENU)? {
                1 => self.show_users(console),
                2 => workflow::add_new(&self.users, console).map(drop),
                3 => workflow::delete(&self.users, console).map(drop),
                4 => workflow::update(&self.users, console).map(drop),
                5 => workflow::find(&self.users, console).map(drop),
                _ => return Ok(()),
            };
            finish_action(console, result)?;
        }
    }
}

/// Transactions
impl App {
    fn deposit(&self, console: &mut dyn Console) -> Result<(), BankError> {
        header(console, "Deposit Screen");
        let client = self.read_client(console, ACCOUNT_PROMPT)?;
        console.print(&client.card());

        let amount = engine::read_positive_amount(console, "Please enter deposit amount")?;
        let balance = self.engine.deposit(console, client.account_number(), amount)?;
        print_balance(console, balance);
        Ok(())
    }

    fn withdraw(&self, console: &mut dyn Console) -> Result<(), BankError> {
        header(console, "Withdraw Screen");
        let client = self.read_client(console, ACCOUNT_PROMPT)?;
        console.print(&client.card());

        let amount =
            engine::read_withdraw_amount(console, "Please enter withdraw amount", client.balance())?;
        let balance = self.engine.withdraw(console, client.account_number(), amount)?;
        print_balance(console, balance);
        Ok(())
    }

    fn transfer(&self, session: &Session, console: &mut dyn Console) -> Result<(), BankError> {
        header(console, "Transfer Screen");
        let source = self.read_client(console, "Please enter the account number to transfer from")?;
        console.print(&source.card());

        let mut destination =
            self.read_client(console, "Please enter the account number to transfer to")?;
        while destination.account_number() == source.account_number() {
            console.print("\nYou cannot transfer to the same account.");
            destination = self.read_client(console, "Please enter the account number to transfer to")?;
        }
        console.print(&destination.card());

        let amount =
            engine::read_withdraw_amount(console, "Enter transfer amount", source.balance())?;

        let mut clients = self.clients.load_all()?;
        let applied = self.engine.transfer(
            console,
            &mut clients,
            source.account_number(),
            destination.account_number(),
            amount,
        )?;
        if applied.is_none() {
            console.print("\nTransfer cancelled.");
            return Ok(());
        }

        let source = client_in(&clients, source.account_number())?;
        let destination = client_in(&clients, destination.account_number())?;
        self.transfers.record(
            source,
            destination,
            amount,
            session.username(),
            self.clock.as_ref(),
        )?;

        console.print("\nTransfer done successfully.");
        console.print(&source.card());
        console.print(&destination.card());
        Ok(())
    }

    fn read_client(&self, console: &mut dyn Console, prompt: &str) -> Result<Client, BankError> {
        let account = self.clients.read_existing_key(console, prompt)?;
        self.clients
            .find_by_key(&account)?
            .ok_or(BankError::NotFound {
                kind: "client",
                key: account,
            })
    }
}

/// List screens
impl App {
    fn show_clients(&self, console: &mut dyn Console) -> Result<(), BankError> {
        let clients = self.clients.load_all()?;
        header(console, &format!("Client List ({}) Client(s).", clients.len()));
        console.print(&format!(
            "| {:<15}| {:<25}| {:<12}| {:<25}| {}",
            "Account Number", "Client Name", "Phone", "Email", "Balance"
        ));
        console.print(&RULE.repeat(100));
        if clients.is_empty() {
            console.print("\t\t\tNo clients available in the system!");
        }
        for client in &clients {
            console.print(&format!(
                "| {:<15}| {:<25}| {:<12}| {:<25}| {}",
                client.account_number(),
                client.person.full_name(),
                client.person.phone,
                client.person.email,
                client.balance()
            ));
        }
        Ok(())
    }

    fn show_total_balances(&self, console: &mut dyn Console) -> Result<(), BankError> {
        let clients = self.clients.load_all()?;
        header(console, &format!("Balances List ({}) Client(s).", clients.len()));
        console.print(&format!(
            "| {:<15}| {:<40}| {}",
            "Account Number", "Client Name", "Balance"
        ));
        console.print(&RULE.repeat(80));
        for client in &clients {
            console.print(&format!(
                "| {:<15}| {:<40}| {}",
                client.account_number(),
                client.person.full_name(),
                client.balance()
            ));
        }
        let total = Amount::checked_sum(clients.iter().map(Client::balance))
            .ok_or(BankError::TotalOverflow)?;
        console.print(&format!("\n\t\t\tTotal Balances = {total}"));
        Ok(())
    }

    fn show_users(&self, console: &mut dyn Console) -> Result<(), BankError> {
        let users = self.users.load_all()?;
        header(console, &format!("Users List ({}) User(s).", users.len()));
        console.print(&format!(
            "| {:<15}| {:<25}| {:<12}| {:<25}| {:<10}| {}",
            "User Name", "Full Name", "Phone", "Email", "Password", "Permissions"
        ));
        console.print(&RULE.repeat(110));
        for user in &users {
            console.print(&format!(
                "| {:<15}| {:<25}| {:<12}| {:<25}| {:<10}| {}",
                user.username(),
                user.person.full_name(),
                user.person.phone,
                user.person.email,
                MASKED_PASSWORD,
                user.permissions
            ));
        }
        Ok(())
    }

    fn show_login_records(&self, console: &mut dyn Console) -> Result<(), BankError> {
        let records = self.logins.list()?;
        header(console, &format!("Login Records List ({}) Record(s).", records.len()));
        console.print(&format!(
            "| {:<25}| {:<10}| {:<15}| {}",
            "Date/Time", "Password", "User Name", "Access Value"
        ));
        console.print(&RULE.repeat(80));
        for record in &records {
            console.print(&format!(
                "| {:<25}| {:<10}| {:<15}| {}",
                record.timestamp,
                MASKED_PASSWORD,
                record.username,
                record.permissions.access_value()
            ));
        }
        Ok(())
    }

    fn show_transfer_records(&self, console: &mut dyn Console) -> Result<(), BankError> {
        let records = self.transfers.list()?;
        header(console, &format!("Transfer Records List ({}) Record(s).", records.len()));
        console.print(&format!(
            "| {:<23}| {:<8}| {:<8}| {:<12}| {:<12}| {:<12}| {}",
            "Date/Time", "s.Acct", "d.Acct", "Amount", "s.Balance", "d.Balance", "User"
        ));
        console.print(&RULE.repeat(100));
        for record in &records {
            console.print(&format!(
                "| {:<23}| {:<8}| {:<8}| {:<12}| {:<12}| {:<12}| {}",
                record.timestamp,
                record.source_account,
                record.destination_account,
                record.amount.to_string(),
                record.source_balance.to_string(),
                record.destination_balance.to_string(),
                record.operator
            ));
        }
        Ok(())
    }
}

const RULE: &str = "_";
const MASKED_PASSWORD: &str = "****";

fn header(console: &mut dyn Console, title: &str) {
    let line = "=".repeat(60);
    console.print(&format!("\n{line}\n\t\t{title}\n{line}"));
}

/// Print a numbered menu and read a choice from it, starting at 1.
fn choose(console: &mut dyn Console, title: &str, options: &[&str]) -> Result<u8, BankError> {
    header(console, title);
    for (idx, option) in options.iter().enumerate() {
        console.print(&format!("\t[{}] {option}.", idx + 1));
    }
    // menus have at most nine entries
    let max = options.len() as u8;
    let choice = read_number_between(
        console,
        &format!("Choose what do you want to do [1 to {max}]"),
        1,
        max,
    )?;
    Ok(choice)
}

/// Keep the menu running after a failed action unless the terminal is gone.
fn finish_action(console: &mut dyn Console, result: Result<(), BankError>) -> Result<(), BankError> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_input() => Err(e),
        Err(e) => {
            error!(error = %e, "action failed");
            console.print(&format!("\nError: {e}"));
            Ok(())
        }
    }
}

fn print_balance(console: &mut dyn Console, balance: Option<Amount>) {
    match balance {
        Some(balance) => console.print(&format!("\nDone successfully, new balance is: {balance}")),
        None => console.print("\nTransaction cancelled."),
    }
}

fn client_in<'a>(clients: &'a [Client], account: &str) -> Result<&'a Client, BankError> {
    clients
        .iter()
        .find(|c| c.account_number() == account)
        .ok_or_else(|| BankError::NotFound {
            kind: "client",
            key: account.to_string(),
        })
}
