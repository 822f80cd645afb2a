//! Rendering of finished sessions.

pub mod console;
