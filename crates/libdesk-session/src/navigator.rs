//! Location tracking with guard enforcement.
//!
//! The [`Navigator`] is the only place a redirect happens. Lower layers
//! report an ended session through [`ClientError::SessionExpired`] or
//! [`SessionEvent::Expired`] and the navigator moves to the login page,
//! remembering where the user was.

use std::sync::Arc;

use libdesk_client::{ClientError, SessionEvent};
use tokio::sync::broadcast;

use crate::context::SessionContext;
use crate::guard::{DEFAULT_LANDING, GuardDecision, LOGIN_PATH, ROOT_PATH, RouteTable};

pub struct Navigator {
    context: Arc<SessionContext>,
    routes: RouteTable,
    location: String,
    return_to: Option<String>,
    events: broadcast::Receiver<SessionEvent>,
}

impl Navigator {
    pub fn new(context: Arc<SessionContext>) -> Self {
        Self::with_routes(context, RouteTable::default())
    }

    pub fn with_routes(context: Arc<SessionContext>, routes: RouteTable) -> Self {
        let events = context.client().subscribe();
        Self {
            context,
            routes,
            location: ROOT_PATH.to_string(),
            return_to: None,
            events,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Destination to resume after the next login.
    pub fn return_to(&self) -> Option<&str> {
        self.return_to.as_deref()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Try to open `path`, following the guard's redirect if any.
    ///
    /// While the session is loading the location does not change.
    pub fn navigate(&mut self, path: &str) -> GuardDecision {
        let decision = self.routes.decide(path, &self.context.state());
        match &decision {
            GuardDecision::Loading => {}
            GuardDecision::Allowed => self.location = path.to_string(),
            GuardDecision::RedirectLogin { from } => {
                self.return_to = Some(from.clone());
                self.location = LOGIN_PATH.to_string();
            }
            GuardDecision::RedirectUnauthorized | GuardDecision::RedirectHome => {
                if let Some(target) = decision.redirect_target() {
                    self.location = target.to_string();
                }
            }
        }
        tracing::debug!(requested = path, location = %self.location, ?decision, "navigate");
        decision
    }

    /// Navigate to the remembered destination, or the landing page.
    pub fn after_login(&mut self) -> GuardDecision {
        let target = self
            .return_to
            .take()
            .unwrap_or_else(|| DEFAULT_LANDING.to_string());
        self.navigate(&target)
    }

    /// Go to the login page, remembering the current location.
    pub fn session_expired(&mut self) -> GuardDecision {
        let from = self.location.clone();
        if from != LOGIN_PATH {
            self.return_to = Some(from.clone());
        }
        self.location = LOGIN_PATH.to_string();
        GuardDecision::RedirectLogin { from }
    }

    /// Redirect to login if `err` means the session is gone.
    pub fn handle_error(&mut self, err: &ClientError) -> Option<GuardDecision> {
        err.is_session_expired().then(|| self.session_expired())
    }

    /// Apply pending session events. Returns the redirect if the session
    /// expired since the last call.
    pub fn poll_events(&mut self) -> Option<GuardDecision> {
        let mut expired = false;
        loop {
            match self.events.try_recv() {
                Ok(SessionEvent::Expired { .. }) => expired = true,
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "navigator missed session events");
                }
                Err(_) => break,
            }
        }
        expired.then(|| self.session_expired())
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("location", &self.location)
            .field("return_to", &self.return_to)
            .finish()
    }
}
