// Declare all our modules
mod client;
mod config;
mod crypto;
mod error;
mod form;
mod models;
mod parsers;
mod reporter;
mod run;

// Publicly export the parts of the library that users will need
pub use client::DakaClient;
pub use config::{EmailServerConfig, PortalConfig, Settings};
pub use crypto::rsa_encrypt;
pub use error::{DakaError, Result};
pub use models::*;
pub use reporter::{Notifier, RunLog, SmtpNotifier};
pub use run::run_user;
