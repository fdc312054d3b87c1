//! CLI module for fileledger
//!
//! Each subcommand lives in its own module with an `Args` struct and a `run`
//! entry point returning `anyhow::Result`.

pub mod error;
pub mod output;
pub mod roots;
pub mod run;
pub mod verify;
