//! # corredor-channels
//!
//! Messaging transports behind the `Channel` trait. WhatsApp is the only
//! transport; the wire protocol (session, pairing, encryption) lives in an
//! external bridge process that this crate talks to over HTTP.

pub mod whatsapp;

pub use whatsapp::WhatsAppChannel;
