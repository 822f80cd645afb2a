//! Application-level configuration.
//!
//! - [`DiscussionParams`]: round loop control (rounds, window, retry, repair, streaming)

pub mod discussion_params;

pub use discussion_params::DiscussionParams;
