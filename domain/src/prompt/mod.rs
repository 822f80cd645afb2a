//! Prompt templates for participant turns, coordinator phases, repair
//! cycles and team generation.

mod coordinator;
mod discussion;
mod repair;
mod team;

pub use coordinator::CoordinatorPrompt;
pub use discussion::DiscussionPrompt;
pub use repair::RepairPrompt;
pub use team::TeamPrompt;
