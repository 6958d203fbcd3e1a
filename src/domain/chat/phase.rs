//! Chat orchestration phase.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a chat request is in its model/tool loop.
///
/// ```text
/// AwaitingModel ──▶ StreamingText ──▶ Done
///       ▲                 │
///       │                 ▼
///       └──────── AwaitingToolResult ──▶ Done (step limit)
/// ```
/// Every non-terminal phase may also move to `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatPhase {
    /// Waiting for the model to start responding.
    AwaitingModel,
    /// Relaying model output.
    StreamingText,
    /// Running tool calls requested by the model.
    AwaitingToolResult,
    /// Finished normally or by step limit.
    Done,
    /// Aborted by an error.
    Error,
}

impl StateMachine for ChatPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ChatPhase::*;
        matches!(
            (self, target),
            (AwaitingModel, StreamingText)
                | (AwaitingModel, Error)
                | (StreamingText, AwaitingToolResult)
                | (StreamingText, Done)
                | (StreamingText, Error)
                | (AwaitingToolResult, AwaitingModel)
                | (AwaitingToolResult, Done)
                | (AwaitingToolResult, Error)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ChatPhase::*;
        match self {
            AwaitingModel => vec![StreamingText, Error],
            StreamingText => vec![AwaitingToolResult, Done, Error],
            AwaitingToolResult => vec![AwaitingModel, Done, Error],
            Done | Error => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_round_trip_is_valid() {
        let phase = ChatPhase::AwaitingModel
            .transition_to(ChatPhase::StreamingText)
            .and_then(|p| p.transition_to(ChatPhase::AwaitingToolResult))
            .and_then(|p| p.transition_to(ChatPhase::AwaitingModel))
            .and_then(|p| p.transition_to(ChatPhase::StreamingText))
            .and_then(|p| p.transition_to(ChatPhase::Done));

        assert_eq!(phase, Ok(ChatPhase::Done));
    }

    #[test]
    fn cannot_skip_the_model() {
        assert!(ChatPhase::AwaitingModel.transition_to(ChatPhase::AwaitingToolResult).is_err());
        assert!(ChatPhase::AwaitingModel.transition_to(ChatPhase::Done).is_err());
    }

    #[test]
    fn terminal_phases() {
        assert!(ChatPhase::Done.is_terminal());
        assert!(ChatPhase::Error.is_terminal());
        assert!(!ChatPhase::StreamingText.is_terminal());
    }

    #[test]
    fn done_cannot_restart() {
        assert!(ChatPhase::Done.transition_to(ChatPhase::AwaitingModel).is_err());
    }
}
