//! Owned session state shared by everything that renders or navigates.
//!
//! [`SessionContext`] pairs the [`SessionClient`] with a `watch` channel of
//! [`SessionState`]. The state starts unresolved; [`SessionContext::bootstrap`]
//! resolves it exactly once per process start.

use std::sync::{Arc, Weak};

use libdesk_client::{ClientError, Result, SessionClient, SessionEvent};
use libdesk_core::{LoginRequest, RegisterRequest, Role, UserProfile};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::oracle::Authorization;

/// Volatile view of the session. The profile is never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// `false` until the startup check has finished.
    pub resolved: bool,
    pub profile: Option<UserProfile>,
}

impl SessionState {
    pub fn authorization(&self) -> Authorization {
        Authorization::new(self.profile.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }
}

pub struct SessionContext {
    client: Arc<SessionClient>,
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    pub fn new(client: Arc<SessionClient>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { client, state }
    }

    pub fn client(&self) -> &Arc<SessionClient> {
        &self.client
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn authorization(&self) -> Authorization {
        self.state.borrow().authorization()
    }

    fn set_profile(&self, profile: Option<UserProfile>) {
        self.state.send_replace(SessionState {
            resolved: true,
            profile,
        });
    }

    /// Drop stored credentials without announcing a logout.
    fn discard_credentials(&self) {
        if let Err(e) = self.client.store().clear() {
            tracing::warn!(error = %e, "failed to clear credentials");
        }
    }

    /// Resolve the session from stored credentials.
    ///
    /// With a stored token the profile is fetched from `/auth/me`. Any
    /// failure clears the credentials and leaves the user logged out. The
    /// state is resolved when this returns.
    pub async fn bootstrap(&self) -> SessionState {
        let profile = match self.client.stored_credentials() {
            None => None,
            Some(_) => match self.client.current_user().await {
                Ok(profile) => {
                    tracing::info!(username = %profile.username, role = %profile.role, "session restored");
                    Some(profile)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored session rejected, clearing credentials");
                    self.discard_credentials();
                    None
                }
            },
        };
        self.set_profile(profile);
        self.state()
    }

    /// Log in, persist the tokens and load the profile.
    pub async fn login(&self, username_or_email: &str, password: &str) -> Result<UserProfile> {
        let credentials = self
            .client
            .login(&LoginRequest::new(username_or_email, password))
            .await?;
        self.client.establish_session(&credentials)?;
        self.load_profile().await
    }

    /// Create a USER account, persist its tokens and load the profile.
    ///
    /// Any role on `request` is replaced: self-registration never grants
    /// staff roles.
    pub async fn register(&self, mut request: RegisterRequest) -> Result<UserProfile> {
        request.role = Some(Role::User);
        let credentials = self.client.register(&request).await?;
        self.client.establish_session(&credentials)?;
        self.load_profile().await
    }

    async fn load_profile(&self) -> Result<UserProfile> {
        match self.client.current_user().await {
            Ok(profile) => {
                self.set_profile(Some(profile.clone()));
                Ok(profile)
            }
            Err(e) => {
                self.discard_credentials();
                self.set_profile(None);
                Err(e)
            }
        }
    }

    /// Local logout. The server is not contacted.
    pub fn logout(&self) -> Result<()> {
        let cleared = self.client.logout();
        self.set_profile(None);
        cleared
    }

    /// Reload the profile; a failure logs the user out.
    pub async fn refresh_user(&self) -> Result<UserProfile> {
        match self.client.current_user().await {
            Ok(profile) => {
                self.set_profile(Some(profile.clone()));
                Ok(profile)
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile refresh failed, logging out");
                if let Err(logout_err) = self.logout() {
                    tracing::warn!(error = %logout_err, "logout after failed refresh");
                }
                Err(e)
            }
        }
    }

    /// Clear the profile whenever the client reports the session ended.
    ///
    /// The task stops once the context is dropped.
    pub fn watch_expiry(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.client.subscribe();
        let context: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::Expired { reason }) => {
                        let Some(context) = context.upgrade() else { break };
                        tracing::info!(%reason, "session expired, clearing profile");
                        context.set_profile(None);
                    }
                    Ok(SessionEvent::LoggedOut) => {
                        let Some(context) = context.upgrade() else { break };
                        context.set_profile(None);
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "session event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("client", &self.client)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// True when `err` means the user has to log in again.
pub fn requires_login(err: &ClientError) -> bool {
    err.is_session_expired()
}
