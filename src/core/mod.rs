// Public modules
pub mod defaults;
pub mod doctor;
pub mod error;
pub mod paths;
pub mod project;
pub mod requirements;
pub mod runner;
pub mod shortcut;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
