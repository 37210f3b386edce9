//! Domain entities - the core business objects.

mod lead;
mod listing;
mod password_reset;
mod rate_limit;
mod requirement;

pub use lead::{ContactLead, LeadSubmission};
pub use listing::{Listing, ListingQuery};
pub use password_reset::PasswordReset;
pub use rate_limit::{
    MAX_POLICY_SPAN, PolicyTable, RateLimitEntry, RateLimitPolicy, ThrottleScope, ceil_secs,
};
pub use requirement::PropertyRequirement;
