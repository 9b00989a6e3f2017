//! Two-state control flow between the sign-in screen and the dashboard.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Auth,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A persisted token was found at startup.
    SessionRestored,
    /// Login succeeded (optionally after registration).
    SignedIn,
    SignedOut,
}

/// Work the orchestrator must perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    RefreshAssessments,
    ClearSession,
}

impl View {
    pub fn apply(self, transition: Transition) -> (View, Effect) {
        match (self, transition) {
            (View::Auth, Transition::SessionRestored) => {
                (View::Dashboard, Effect::RefreshAssessments)
            }
            (View::Dashboard, Transition::SessionRestored) => (View::Dashboard, Effect::None),
            (_, Transition::SignedIn) => (View::Dashboard, Effect::RefreshAssessments),
            (_, Transition::SignedOut) => (View::Auth, Effect::ClearSession),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            View::Auth => "auth",
            View::Dashboard => "dashboard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_dashboard_always_requests_one_refresh() {
        assert_eq!(
            View::Auth.apply(Transition::SignedIn),
            (View::Dashboard, Effect::RefreshAssessments)
        );
        assert_eq!(
            View::Auth.apply(Transition::SessionRestored),
            (View::Dashboard, Effect::RefreshAssessments)
        );
    }

    #[test]
    fn restoring_twice_does_not_refresh_again() {
        assert_eq!(
            View::Dashboard.apply(Transition::SessionRestored),
            (View::Dashboard, Effect::None)
        );
    }

    #[test]
    fn sign_out_returns_to_auth_and_clears_session() {
        assert_eq!(
            View::Dashboard.apply(Transition::SignedOut),
            (View::Auth, Effect::ClearSession)
        );
        assert_eq!(
            View::Auth.apply(Transition::SignedOut),
            (View::Auth, Effect::ClearSession)
        );
    }
}
