//! Core domain + application logic for confbot, a conference IRC bot.
//!
//! This crate is intentionally transport-agnostic. The IRC connection and the
//! need persistence live behind ports (traits); the IRC adapter crate drives
//! the session controller with inbound events.

pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fault;
pub mod handlers;
pub mod identity;
pub mod logging;
pub mod ports;
pub mod router;
pub mod session;
pub mod store;
pub mod utils;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
