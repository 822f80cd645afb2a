//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod agent_responder;
pub mod coordinator;
pub mod generate_team;
pub mod retry;
pub mod run_discussion;
pub(crate) mod shared;
pub mod structured_output;

#[cfg(test)]
pub(crate) mod test_support;
