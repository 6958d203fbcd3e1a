//! Chat module - orchestration phases, stream events, and prompt constants.

mod event;
mod phase;
mod prompt;

pub use event::{ChatEvent, FinishReason};
pub use phase::ChatPhase;
pub use prompt::{CHAT_TEMPERATURE, MAX_STEPS, SYSTEM_PROMPT};
