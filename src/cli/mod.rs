//! Command-line front end over the ledger engine

pub mod commands;

pub use commands::*;
