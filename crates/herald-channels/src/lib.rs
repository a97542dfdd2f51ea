//! # herald-channels
//!
//! Messaging transports for Herald.

pub mod whatsapp;
