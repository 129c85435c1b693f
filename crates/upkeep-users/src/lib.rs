//! `upkeep-users`: account registration, validation and login.
//!
//! Accounts live in the `users` table of the shared SQLite file. New accounts
//! start unvalidated and cannot log in until a Super Admin validates them.
//! A successful login yields an explicit [`upkeep_core::SessionContext`].

pub mod accounts;
pub mod db;
pub mod error;
pub mod password;
pub mod types;

pub use accounts::UserDirectory;
pub use error::{Result, UserError};
pub use types::User;
