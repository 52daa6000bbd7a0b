//! # corredor-core
//!
//! Core types, traits, configuration, and error handling for the Corredor
//! listing intake agent.

pub mod cache;
pub mod config;
pub mod error;
pub mod message;
pub mod record;
pub mod traits;

pub use config::shellexpand;
