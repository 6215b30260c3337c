use std::io;
use std::path::PathBuf;

use bank_records::atm::Atm;
use bank_records::audit::{LoginLogger, SystemClock, TransferLogger};
use bank_records::console::TerminalConsole;
use bank_records::menu::App;
use bank_records::report::write_balances;
use bank_records::repository::ClientRepository;
use bank_records::{BankError, Config, Engine};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Console manager for bank clients, staff users and their audit logs
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Directory holding Clients.txt, Users.txt, Logins.txt and Transfer.txt
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Staff login and menus (default)
    Staff,
    /// Client self-service by account number and PIN
    Atm,
    /// Print every client's balance as csv
    Balances,
    /// Empty one of the audit logs
    ClearLog {
        #[arg(value_enum)]
        log: AuditLog,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AuditLog {
    Logins,
    Transfers,
}

fn main() -> Result<(), BankError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let result = run(args);
    if let Err(e) = &result {
        error!(error = %e, "bank-records failed");
    }
    result
}

fn run(args: Args) -> Result<(), BankError> {
    let config = Config::in_dir(&args.data_dir);

    match args.command.unwrap_or(Command::Staff) {
        Command::Staff => {
            let app = App::new(&config, Box::new(SystemClock));
            app.ensure_admin()?;
            app.run(&mut TerminalConsole::new())
        }
        Command::Atm => {
            let engine = Engine::new(ClientRepository::new(config.clients));
            Atm::new(engine).run(&mut TerminalConsole::new())
        }
        Command::Balances => {
            let clients = ClientRepository::new(config.clients).load_all()?;
            write_balances(io::stdout().lock(), &clients)?;
            Ok(())
        }
        Command::ClearLog { log } => {
            match log {
                AuditLog::Logins => LoginLogger::new(config.logins).clear()?,
                AuditLog::Transfers => TransferLogger::new(config.transfers).clear()?,
            }
            info!(?log, "audit log cleared");
            Ok(())
        }
    }
}
