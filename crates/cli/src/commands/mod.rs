//! Command handlers for the docqa CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod serve;
pub mod voice;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use serve::ServeCommand;
pub use voice::VoiceCommand;
