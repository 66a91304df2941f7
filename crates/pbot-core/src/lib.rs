//! Core domain + application logic for the persona bot.
//!
//! This crate is framework-agnostic. Telegram and the generation service live
//! behind ports (traits) implemented in adapter crates.

pub mod app;
pub mod config;
pub mod conversation;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod panel;
pub mod ports;
pub mod registry;
pub mod security;
pub mod utils;

pub use errors::{Error, Result};
