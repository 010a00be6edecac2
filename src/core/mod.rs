//! Core status machine types and logic.
//!
//! This module contains the pure foundation shared by every workflow
//! machine:
//! - Status definitions via the `State` trait and `status_enum!`
//! - Tables of allowed transitions
//! - Immutable status change history
//!
//! Nothing here performs I/O.

#[macro_use]
mod macros;
mod history;
mod state;
mod table;

pub use history::{StatusChange, StatusHistory};
pub use state::State;
pub use table::TransitionTable;
