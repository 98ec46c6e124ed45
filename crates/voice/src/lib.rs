//! Voice-driven task and reminder agent.
//!
//! The agent listens for utterances through a [`SpeechInput`], answers through
//! a [`SpeechOutput`], and keeps its tasks in a JSON file. Recognized commands:
//! - "quit": stop the agent
//! - "remind me to <task> in <n> minutes": store a task with a reminder
//! - "note": ask for a task and store it
//!
//! Anything else goes to the optional chat backend.

pub mod agent;
pub mod command;
pub mod io;
pub mod task;

pub use agent::{announce_due, ChatBackend, VoiceAgent, DEFAULT_REMINDER_INTERVAL};
pub use command::{Command, CommandParser};
pub use io::{ConsoleInput, ConsoleOutput, Heard, SpeechInput, SpeechOutput};
pub use task::{Task, TaskStore, DEFAULT_TASKS_FILE};
