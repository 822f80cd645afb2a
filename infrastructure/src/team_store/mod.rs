//! Team definition storage.

mod json;

pub use json::JsonTeamRepository;
