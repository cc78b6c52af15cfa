//! State machines for session resolution and role changes
//!
//! - `ResolverStateMachine`: Uninitialized → Resolving → Resolved(role),
//!   back to Resolving on identity change and Resolved(None) on sign-out.
//! - `RoleStateMachine`: promote/demote between `user` and `admin`.
//!   The super-admin role never transitions.

use energram_common::StateError;

use crate::types::Role;

// ============================================================================
// Resolver State Machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Uninitialized,
    Resolving,
    /// `None` means signed out
    Resolved(Option<Role>),
}

impl ResolverState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Resolving)
    }
}

impl std::fmt::Display for ResolverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Resolving => write!(f, "resolving"),
            Self::Resolved(None) => write!(f, "resolved(signed_out)"),
            Self::Resolved(Some(role)) => write!(f, "resolved({})", role),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverEvent {
    /// Provider reported a signed-in identity
    SignedIn,
    /// Provider reported no identity
    SignedOut,
    /// Role lookup/seed finished for the current identity
    RoleResolved(Role),
}

impl std::fmt::Display for ResolverEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignedIn => write!(f, "signed_in"),
            Self::SignedOut => write!(f, "signed_out"),
            Self::RoleResolved(role) => write!(f, "role_resolved({})", role),
        }
    }
}

pub struct ResolverStateMachine;

impl ResolverStateMachine {
    pub fn transition(
        current: ResolverState,
        event: ResolverEvent,
    ) -> Result<ResolverState, StateError> {
        match (current, event) {
            // Any state: identity changes restart resolution, sign-out settles
            (_, ResolverEvent::SignedIn) => Ok(ResolverState::Resolving),
            (_, ResolverEvent::SignedOut) => Ok(ResolverState::Resolved(None)),

            (ResolverState::Resolving, ResolverEvent::RoleResolved(role)) => {
                Ok(ResolverState::Resolved(Some(role)))
            }

            (ResolverState::Uninitialized | ResolverState::Resolved(_), event) => {
                Err(StateError::invalid(current, event))
            }
        }
    }

    pub fn can_transition(current: ResolverState, event: ResolverEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}

// ============================================================================
// Role State Machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleEvent {
    Promote,
    Demote,
}

impl std::fmt::Display for RoleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Promote => write!(f, "promote"),
            Self::Demote => write!(f, "demote"),
        }
    }
}

pub struct RoleStateMachine;

impl RoleStateMachine {
    pub fn transition(current: Role, event: RoleEvent) -> Result<Role, StateError> {
        match (current, event) {
            (Role::SuperAdmin, _) => Err(StateError::TerminalState(current.to_string())),
            (Role::User, RoleEvent::Promote) => Ok(Role::Admin),
            (Role::Admin, RoleEvent::Demote) => Ok(Role::User),
            _ => Err(StateError::invalid(current, event)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod resolver_state_machine {
        use super::*;

        #[test]
        fn test_first_identity_starts_resolving() {
            assert_eq!(
                ResolverStateMachine::transition(
                    ResolverState::Uninitialized,
                    ResolverEvent::SignedIn
                ),
                Ok(ResolverState::Resolving)
            );
        }

        #[test]
        fn test_no_identity_settles_signed_out() {
            for state in [
                ResolverState::Uninitialized,
                ResolverState::Resolving,
                ResolverState::Resolved(Some(Role::Admin)),
                ResolverState::Resolved(None),
            ] {
                assert_eq!(
                    ResolverStateMachine::transition(state, ResolverEvent::SignedOut),
                    Ok(ResolverState::Resolved(None))
                );
            }
        }

        #[test]
        fn test_resolving_to_resolved() {
            assert_eq!(
                ResolverStateMachine::transition(
                    ResolverState::Resolving,
                    ResolverEvent::RoleResolved(Role::SuperAdmin)
                ),
                Ok(ResolverState::Resolved(Some(Role::SuperAdmin)))
            );
        }

        #[test]
        fn test_identity_change_after_resolution_resolves_again() {
            assert_eq!(
                ResolverStateMachine::transition(
                    ResolverState::Resolved(Some(Role::User)),
                    ResolverEvent::SignedIn
                ),
                Ok(ResolverState::Resolving)
            );
        }

        #[test]
        fn test_role_result_outside_resolving_is_invalid() {
            assert!(!ResolverStateMachine::can_transition(
                ResolverState::Uninitialized,
                ResolverEvent::RoleResolved(Role::User)
            ));
            let result = ResolverStateMachine::transition(
                ResolverState::Resolved(None),
                ResolverEvent::RoleResolved(Role::Admin),
            );
            assert!(matches!(result, Err(StateError::InvalidTransition { .. })));
        }

        #[test]
        fn test_is_loading() {
            assert!(ResolverState::Uninitialized.is_loading());
            assert!(ResolverState::Resolving.is_loading());
            assert!(!ResolverState::Resolved(None).is_loading());
            assert!(!ResolverState::Resolved(Some(Role::User)).is_loading());
        }
    }

    mod role_state_machine {
        use super::*;

        #[test]
        fn test_promote_user_and_demote_admin() {
            assert_eq!(
                RoleStateMachine::transition(Role::User, RoleEvent::Promote),
                Ok(Role::Admin)
            );
            assert_eq!(
                RoleStateMachine::transition(Role::Admin, RoleEvent::Demote),
                Ok(Role::User)
            );
        }

        #[test]
        fn test_super_admin_is_immutable() {
            for event in [RoleEvent::Promote, RoleEvent::Demote] {
                assert!(matches!(
                    RoleStateMachine::transition(Role::SuperAdmin, event),
                    Err(StateError::TerminalState(_))
                ));
            }
        }

        #[test]
        fn test_redundant_changes_are_invalid() {
            assert!(matches!(
                RoleStateMachine::transition(Role::Admin, RoleEvent::Promote),
                Err(StateError::InvalidTransition { .. })
            ));
            assert!(matches!(
                RoleStateMachine::transition(Role::User, RoleEvent::Demote),
                Err(StateError::InvalidTransition { .. })
            ));
        }
    }
}
