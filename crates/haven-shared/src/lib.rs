//! # Haven Shared
//!
//! Wire types shared between the storefront API and its clients.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
