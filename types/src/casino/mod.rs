//! Tài Xỉu domain types.
//!
//! Defines table/round state, dice, history records and constants used by the execution layer
//! and clients.

mod constants;
mod format;
mod game;
mod record;

pub use constants::*;
pub use format::format_chips;
pub use game::*;
pub use record::*;
