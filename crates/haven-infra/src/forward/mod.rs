//! Lead and password-reset forwarding - webhook and in-memory fallback.

mod memory;

pub use memory::{InMemoryLeadSink, InMemoryPasswordResetSender};

#[cfg(feature = "webhook")]
mod webhook;
#[cfg(feature = "webhook")]
pub use self::webhook::{WebhookConfig, WebhookForwarder};
