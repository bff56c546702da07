//! Data layer module
//!
//! Handles all data persistence:
//! - Users and password verification
//! - Session tokens (the production session store)
//! - Notes

mod database;
mod models;

pub use database::Database;
pub use models::*;
