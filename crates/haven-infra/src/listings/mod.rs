//! Listing search implementations.

mod memory;

pub use memory::InMemoryListingIndex;
