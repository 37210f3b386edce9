//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod forward;
mod listing;
mod rate_limit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use forward::{ForwardError, LeadSink, PasswordResetSender};
pub use listing::{ListingError, ListingSearch};
pub use rate_limit::{RateLimitResult, RateLimiter, Throttle};
