//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Child process output inspection
//! - `io` - File I/O with consistent error handling
//! - `logger` - Tracing subscriber setup
//! - `shell` - Shell quoting for display

pub mod command;
pub mod io;
pub mod logger;
pub mod shell;
