pub mod args;
pub mod calc;
pub mod commands;
mod config;
mod error;
mod home;
pub mod ledger;
pub mod model;
pub mod persist;
pub mod serial;
#[cfg(test)]
mod test;
mod utils;

pub use config::Config;
pub use error::{Error, FormatError, Result, ValidationError};
pub use home::Home;
pub use ledger::{IdPolicy, Ledger, Total};
