//! Self-service session for account holders, logged in by account number and PIN.

use tracing::{error, info, warn};

use crate::Amount;
use crate::console::{self, Console, InputError};
use crate::engine::{self, Engine};
use crate::error::BankError;
use crate::model::Client;
use crate::session::MAX_LOGIN_ATTEMPTS;

/// Amounts offered by the quick-withdraw screen, in menu order.
pub const QUICK_AMOUNTS: [i64; 10] = [20, 50, 100, 200, 400, 600, 800, 1000, 2000, 5000];

/// Normal withdrawals must be a multiple of this many units.
pub const WITHDRAW_STEP: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AtmOption {
    QuickWithdraw,
    Withdraw,
    Deposit,
    CheckBalance,
    Logout,
    Exit,
}

impl AtmOption {
    const MENU: [AtmOption; 6] = [
        AtmOption::QuickWithdraw,
        AtmOption::Withdraw,
        AtmOption::Deposit,
        AtmOption::CheckBalance,
        AtmOption::Logout,
        AtmOption::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            AtmOption::QuickWithdraw => "Quick Withdraw",
            AtmOption::Withdraw => "Withdraw",
            AtmOption::Deposit => "Deposit",
            AtmOption::CheckBalance => "Check Balance",
            AtmOption::Logout => "Logout",
            AtmOption::Exit => "Exit",
        }
    }
}

/// How a client session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Logout,
    Exit,
}

pub struct Atm {
    engine: Engine,
}

impl Atm {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// Login screen and client menu until a login fails or the client exits.
    pub fn run(&self, console: &mut dyn Console) -> Result<(), BankError> {
        loop {
            banner(console, "Login Screen");
            let Some(client) = self.login(console)? else {
                return Ok(());
            };
            let end = self.client_menu(client.account_number(), console)?;
            info!(account = %client.account_number(), "client logged out");
            if end == SessionEnd::Exit {
                banner(console, "Thanks For Using Our Service :-)");
                return Ok(());
            }
        }
    }

    /// Ask for account number and PIN up to [`MAX_LOGIN_ATTEMPTS`] times.
    pub fn login(&self, console: &mut dyn Console) -> Result<Option<Client>, BankError> {
        let mut remaining = MAX_LOGIN_ATTEMPTS;
        loop {
            let account = console.read_line("Enter account number")?.trim().to_string();
            let pin_code = console.read_secret("Enter PIN code")?;

            if let Some(client) = self.engine.clients().find_by_pin(&account, &pin_code)? {
                info!(account = %account, "client logged in");
                return Ok(Some(client));
            }

            warn!(account = %account, "invalid account number or PIN");
            console.print("\nInvalid account number/PIN code!");
            remaining -= 1;
            if remaining == 0 {
                console.print("No more tries left, please try again later.");
                return Ok(None);
            }
            let tries = if remaining == 1 { "try" } else { "tries" };
            console.print(&format!("You have {remaining} {tries} left."));
        }
    }

    fn client_menu(&self, account: &str, console: &mut dyn Console) -> Result<SessionEnd, BankError> {
        loop {
            banner(console, "ATM Menu Screen");
            for (idx, option) in AtmOption::MENU.iter().enumerate() {
                console.print(&format!("\t[{}] {}.", idx + 1, option.label()));
            }
            let choice = console::read_number_between(
                console,
                "Choose what do you want to do [1 to 6]",
                1,
                AtmOption::MENU.len() as u8,
            )?;

            let result = match AtmOption::MENU[usize::from(choice) - 1] {
                AtmOption::QuickWithdraw => self.quick_withdraw(account, console),
                AtmOption::Withdraw => self.withdraw(account, console),
                AtmOption::Deposit => self.deposit(account, console),
                AtmOption::CheckBalance => self.check_balance(account, console),
                AtmOption::Logout => return Ok(SessionEnd::Logout),
                AtmOption::Exit => return Ok(SessionEnd::Exit),
            };
            match result {
                Ok(()) => {}
                Err(e) if e.is_input() => return Err(e),
                Err(e) => {
                    error!(error = %e, account, "atm action failed");
                    console.print(&format!("\nError: {e}"));
                }
            }
        }
    }

    fn quick_withdraw(&self, account: &str, console: &mut dyn Console) -> Result<(), BankError> {
        let balance = self.balance(account)?;
        banner(console, "Quick Withdraw Screen");
        for (idx, amount) in QUICK_AMOUNTS.iter().enumerate() {
            console.print(&format!("\t[{}] {amount}", idx + 1));
        }
        let exit = QUICK_AMOUNTS.len() as u8 + 1;
        console.print(&format!("\t[{exit}] Exit"));
        console.print(&format!("Your balance is {balance}"));

        let choice = console::read_number_between(
            console,
            &format!("Choose what to withdraw [1 to {exit}]"),
            1,
            exit,
        )?;
        let Some(&units) = QUICK_AMOUNTS.get(usize::from(choice) - 1) else {
            return Ok(());
        };

        let amount = Amount::from_units(units);
        if amount > balance {
            console.print(&format!(
                "\nAmount exceeds the balance, you can withdraw up to: {balance}"
            ));
            return Ok(());
        }
        self.apply(account, -amount, console)
    }

    fn withdraw(&self, account: &str, console: &mut dyn Console) -> Result<(), BankError> {
        let balance = self.balance(account)?;
        banner(console, "Withdraw Screen");
        let amount = read_multiple_of_step(console, balance)?;
        self.apply(account, -amount, console)
    }

    fn deposit(&self, account: &str, console: &mut dyn Console) -> Result<(), BankError> {
        banner(console, "Deposit Screen");
        let amount = engine::read_positive_amount(console, "Please enter deposit amount")?;
        self.apply(account, amount, console)
    }

    fn check_balance(&self, account: &str, console: &mut dyn Console) -> Result<(), BankError> {
        let balance = self.balance(account)?;
        banner(console, "Check Balance Screen");
        console.print(&format!("\nYour balance is {balance}."));
        Ok(())
    }

    fn apply(&self, account: &str, delta: Amount, console: &mut dyn Console) -> Result<(), BankError> {
        let mut clients = self.engine.clients().load_all()?;
        match self.engine.apply_delta(console, &mut clients, account, delta)? {
            Some(balance) => console.print(&format!("\nDone successfully, account balance: {balance}")),
            None => console.print("\nTransaction cancelled."),
        }
        Ok(())
    }

    /// Current stored balance of the logged-in account.
    fn balance(&self, account: &str) -> Result<Amount, BankError> {
        self.engine
            .clients()
            .find_by_key(account)?
            .map(|client| client.balance())
            .ok_or_else(|| BankError::NotFound {
                kind: "client",
                key: account.to_string(),
            })
    }
}

/// Read a positive multiple of [`WITHDRAW_STEP`] not above `balance`.
fn read_multiple_of_step(console: &mut dyn Console, balance: Amount) -> Result<Amount, InputError> {
    let prompt = format!("Please enter withdraw amount, multiple of {WITHDRAW_STEP}");
    loop {
        let amount = engine::read_positive_amount(console, &prompt)?;
        if !amount.is_multiple_of_units(WITHDRAW_STEP) {
            console.print("\nInvalid amount of money, please try again.");
        } else if amount > balance {
            console.print(&format!(
                "\nAmount exceeds the balance, you can withdraw up to: {balance}"
            ));
        } else {
            return Ok(amount);
        }
    }
}

fn banner(console: &mut dyn Console, title: &str) {
    let line = "-".repeat(60);
    console.print(&format!("\n{line}\n\t\t{title}\n{line}"));
}
