//! Wikipedia adapter for the knowledge lookup port.

mod lookup;
mod response;

pub use lookup::{DEFAULT_USER_AGENT, WikipediaLookup};
