//! # Haven Infrastructure
//!
//! Concrete implementations of the ports defined in `haven-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No network adapters, in-memory only
//! - `webhook` - Forward leads and password resets to an HTTP endpoint

pub mod forward;
pub mod listings;
pub mod rate_limit;

// Re-exports - In-Memory
pub use forward::{InMemoryLeadSink, InMemoryPasswordResetSender};
pub use listings::InMemoryListingIndex;
pub use rate_limit::InMemoryRateLimiter;

// Re-exports - Webhook
#[cfg(feature = "webhook")]
pub use forward::{WebhookConfig, WebhookForwarder};
