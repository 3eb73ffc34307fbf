//! Event handling and user interactions for poll-translate-bot.
//!
//! Each handler comes in two flavours:
//! - `handle_*` spawns the work on its own task and logs any failure, so the
//!   receiver can acknowledge Slack immediately.
//! - `process_*` does the work inline and returns the result.

pub mod greeting;
pub mod poll_shortcut;
pub mod poll_submission;
pub mod reaction_translation;
