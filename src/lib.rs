//! Summaries of personal expenses kept in a Google sheet with one tab per year.
//!
//! The `aggregate` module is the pure pipeline: monthly totals, a daily running total and a
//! category breakdown, each computed from a slice of `model::ExpenseRecord`. The `commands`
//! module wires that pipeline to the sheet.

pub mod aggregate;
mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
mod utils;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
