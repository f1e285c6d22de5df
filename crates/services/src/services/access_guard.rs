//! Role-based session gate for protected views.
//!
//! The guard consumes session snapshots from an injected [`SessionProvider`]
//! and decides whether a protected view may render. An unauthenticated
//! session is sent to the configured redirect target immediately; a session
//! whose role does not match the required one is sent to its own dashboard
//! after a short debounce, so a transient session update cannot cause a
//! redirect flicker. Protected content is never rendered while the role does
//! not match.

use std::{sync::Arc, time::Duration};

use db::models::user::Role;
use strum_macros::Display;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Where the session provider currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Identity carried by an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub role: Role,
}

/// Point-in-time view of the session provider's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub user: Option<SessionUser>,
}

impl SessionSnapshot {
    pub fn loading() -> Self {
        Self {
            status: SessionStatus::Loading,
            user: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            user: None,
        }
    }

    pub fn authenticated(id: Uuid, role: Role) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            user: Some(SessionUser { id, role }),
        }
    }
}

/// Source of session snapshots. Injected rather than ambient so the guard
/// can be driven by synthetic session states in tests.
pub trait SessionProvider: Send + Sync {
    fn snapshot(&self) -> SessionSnapshot;
}

/// Client-side navigation primitive. Fire and forget.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GuardState {
    Loading,
    Unauthenticated,
    RoleMismatchTransitioning,
    Authorized,
}

/// What the caller should put on screen for the current inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Redirect(String),
    ShowLoading(LoadingReason),
    Render,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingReason {
    SessionResolving,
    SwitchingRole,
}

/// Dashboard route for a role. Unknown roles fall back to the home path.
pub fn canonical_path(role: Role) -> &'static str {
    match role {
        Role::Donor => "/donor",
        Role::Receiver => "/receiver",
        Role::Ngo => "/ngo",
        Role::Admin => "/admin",
        Role::Unknown => "/",
    }
}

/// Pure classification of a snapshot against a required role. This is the
/// guard's final answer for the given inputs; the stateful [`AccessGuard`]
/// adds the debounce and once-only navigation on top of it.
pub fn decide(
    snapshot: &SessionSnapshot,
    required_role: Option<Role>,
    redirect_target: &str,
) -> GuardDecision {
    if snapshot.status == SessionStatus::Loading {
        return GuardDecision::ShowLoading(LoadingReason::SessionResolving);
    }
    let Some(user) = snapshot.user else {
        return GuardDecision::Redirect(redirect_target.to_string());
    };
    match required_role {
        Some(required) if user.role != required => {
            GuardDecision::Redirect(canonical_path(user.role).to_string())
        }
        _ => GuardDecision::Render,
    }
}

struct PendingRedirect {
    path: String,
    handle: JoinHandle<()>,
}

/// Stateful gate in front of a protected view.
///
/// Drive it by calling [`AccessGuard::refresh`] (or [`AccessGuard::apply`]
/// with an explicit snapshot) whenever the session may have changed. Each
/// call returns what to render right now; navigation happens as a side
/// effect, at most once per state entered.
pub struct AccessGuard {
    provider: Arc<dyn SessionProvider>,
    navigator: Arc<dyn Navigator>,
    required_role: Option<Role>,
    redirect_target: String,
    debounce: Duration,
    state: GuardState,
    pending: Option<PendingRedirect>,
}

impl AccessGuard {
    /// Delay between detecting a role mismatch and navigating away. Absorbs
    /// transient role updates so a settling session does not bounce the user
    /// between dashboards.
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);
    pub const DEFAULT_REDIRECT_TARGET: &'static str = "/login";

    pub fn new(
        provider: Arc<dyn SessionProvider>,
        navigator: Arc<dyn Navigator>,
        required_role: Option<Role>,
    ) -> Self {
        Self {
            provider,
            navigator,
            required_role,
            redirect_target: Self::DEFAULT_REDIRECT_TARGET.to_string(),
            debounce: Self::DEFAULT_DEBOUNCE,
            state: GuardState::Loading,
            pending: None,
        }
    }

    pub fn with_redirect_target(mut self, target: impl Into<String>) -> Self {
        self.redirect_target = target.into();
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Pull the current snapshot from the provider and apply it.
    pub fn refresh(&mut self) -> GuardDecision {
        let snapshot = self.provider.snapshot();
        self.apply(&snapshot)
    }

    /// Feed the next snapshot through the state machine.
    pub fn apply(&mut self, snapshot: &SessionSnapshot) -> GuardDecision {
        if snapshot.status == SessionStatus::Loading {
            self.transition(GuardState::Loading);
            return GuardDecision::ShowLoading(LoadingReason::SessionResolving);
        }

        let Some(user) = snapshot.user else {
            let entered = self.state != GuardState::Unauthenticated;
            self.transition(GuardState::Unauthenticated);
            if entered {
                self.navigator.navigate(&self.redirect_target);
            }
            return GuardDecision::Redirect(self.redirect_target.clone());
        };

        match self.required_role {
            Some(required) if user.role != required => {
                let path = canonical_path(user.role).to_string();
                self.arm_redirect(path);
                self.state = GuardState::RoleMismatchTransitioning;
                GuardDecision::ShowLoading(LoadingReason::SwitchingRole)
            }
            _ => {
                self.transition(GuardState::Authorized);
                GuardDecision::Render
            }
        }
    }

    fn transition(&mut self, next: GuardState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "access guard state change");
            // Leaving the mismatch state invalidates any scheduled redirect.
            self.cancel_pending();
            self.state = next;
        }
    }

    fn arm_redirect(&mut self, path: String) {
        if self.state == GuardState::RoleMismatchTransitioning {
            if let Some(pending) = &self.pending {
                // Same mismatch, redirect already in flight (or already
                // fired): do not schedule another one.
                if pending.path == path {
                    return;
                }
            }
        }
        self.cancel_pending();

        let navigator = Arc::clone(&self.navigator);
        let debounce = self.debounce;
        let target = path.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            debug!(path = %target, "role mismatch settled, redirecting");
            navigator.navigate(&target);
        });
        self.pending = Some(PendingRedirect { path, handle });
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

impl Drop for AccessGuard {
    // Teardown during the debounce window must not produce a late navigation.
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
