//! Conversation session and the controller driving it
//!
//! - `session`: the model-side history and the timed completion call
//! - `controller`: lifecycle, persistence and the one-submission-at-a-time rule

pub mod controller;
pub mod session;

pub use controller::{
    ChatController, ChatOptions, ChatState, IgnoreReason, InitOutcome, SubmitOutcome,
};
pub use session::ChatSession;
