//! `pwrec` command-line front end.
//!
//! Validates flags, gets a browser (launched or attached), records the first
//! page and tees the script to stdout and an optional file.

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod record;
