//! Turns, the conversation ledger and the discussion session.

pub mod context;
pub mod ledger;
pub mod session;
pub mod stream;
pub mod turn;
