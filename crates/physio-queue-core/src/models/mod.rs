//! Domain models for the queue board.

mod config;
mod event;
mod patient;

pub use config::*;
pub use event::*;
pub use patient::*;
