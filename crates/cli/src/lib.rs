//! Command-line shell over the `bes` client library.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod shell;
