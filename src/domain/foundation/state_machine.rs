//! State machine trait for status enums.
//!
//! Provides a consistent interface for validating and performing state transitions
//! for lifecycle enums such as the chat orchestration phase.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors define valid state transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for ChatPhase {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!(
///             (self, target),
///             (AwaitingModel, StreamingText) |
///             (StreamingText, Done) |
///             // ... etc
///         )
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             AwaitingModel => vec![StreamingText, Error],
///             StreamingText => vec![AwaitingToolResult, Done, Error],
///             // ... etc
///         }
///     }
/// }
///
/// // Usage:
/// let next = phase.transition_to(ChatPhase::Done)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    ///
    /// This is the preferred way to change state, as it ensures
    /// the transition is valid according to the state machine rules.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum LinkState {
        Requested,
        Signed,
        Degraded,
        Delivered,
    }

    impl StateMachine for LinkState {
        fn can_transition_to(&self, target: &Self) -> bool {
            use LinkState::*;
            matches!(
                (self, target),
                (Requested, Signed)
                    | (Requested, Degraded)
                    | (Signed, Delivered)
                    | (Degraded, Delivered)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use LinkState::*;
            match self {
                Requested => vec![Signed, Degraded],
                Signed | Degraded => vec![Delivered],
                Delivered => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        let result = LinkState::Requested.transition_to(LinkState::Degraded);
        assert_eq!(result, Ok(LinkState::Degraded));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        let result = LinkState::Requested.transition_to(LinkState::Delivered);
        assert!(matches!(result, Err(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn is_terminal_only_for_delivered() {
        assert!(LinkState::Delivered.is_terminal());
        assert!(!LinkState::Requested.is_terminal());
        assert!(!LinkState::Signed.is_terminal());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for state in [
            LinkState::Requested,
            LinkState::Signed,
            LinkState::Degraded,
            LinkState::Delivered,
        ] {
            for target in state.valid_transitions() {
                assert!(
                    state.can_transition_to(&target),
                    "{:?} -> {:?} should be allowed",
                    state,
                    target
                );
            }
        }
    }
}
