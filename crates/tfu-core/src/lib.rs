//! Core domain + application logic for the Translate For U Telegram bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the translation
//! provider live behind ports (traits) implemented in adapter crates.

pub mod broadcast;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod gateway;
pub mod intent;
pub mod languages;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod resolver;
pub mod router;
pub mod session;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
