//! # Haven Core
//!
//! The domain layer of the Haven storefront.
//! This crate holds the throttling model, input sanitizers and the ports
//! that infrastructure adapters implement. It performs no I/O.

pub mod domain;
pub mod error;
pub mod ports;
pub mod sanitize;

pub use error::DomainError;
