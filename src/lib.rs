pub mod amount;
pub mod atm;
pub mod audit;
pub mod codec;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod menu;
pub mod model;
pub mod permission;
pub mod report;
pub mod repository;
pub mod session;
pub mod store;
pub mod workflow;

pub use amount::Amount;
pub use config::Config;
pub use engine::Engine;
pub use error::BankError;
pub use model::{Client, LoginRecord, Person, TransferRecord, User};
pub use permission::{Capability, Permissions};
