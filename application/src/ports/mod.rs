//! Ports (interfaces) for external collaborators

pub mod conversation_logger;
pub mod knowledge;
pub mod llm_gateway;
pub mod progress;
pub mod team_repository;
