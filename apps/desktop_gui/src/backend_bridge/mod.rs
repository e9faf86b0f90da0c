//! Bridge between the immediate-mode UI and the async backend worker.

pub mod commands;
pub mod runtime;
