//! Agents, coordinator archetypes and team assembly.

pub mod archetype;
pub mod entities;
pub mod team;
