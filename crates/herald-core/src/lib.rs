//! # herald-core
//!
//! Core types, traits, configuration, and error handling for Herald.

pub mod config;
pub mod contact;
pub mod error;
pub mod phone;
pub mod render;
pub mod template;
pub mod traits;
