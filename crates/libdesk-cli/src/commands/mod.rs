pub mod admin;
pub mod auth;
pub mod books;
pub mod config;
pub mod loans;
pub mod members;
pub mod user;

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use libdesk_client::{ClientConfig, ClientError, FileCredentialStore, SessionClient};
use libdesk_core::{Role, RoleSet};
use libdesk_session::{Access, GuardDecision, Navigator, SessionContext};
use serde::de::DeserializeOwned;

use crate::cli::OutputFormat;

/// Everything a command needs: the session, the navigator guarding it and
/// the output format.
pub struct App {
    pub config: ClientConfig,
    pub format: OutputFormat,
    context: Arc<SessionContext>,
    navigator: Navigator,
}

impl App {
    pub fn new(config: ClientConfig, format: OutputFormat) -> Result<Self> {
        let dir = config.credentials_dir()?;
        let store = Arc::new(FileCredentialStore::for_profile(&dir, &config.profile));
        let client = SessionClient::new(&config, store)?;
        let context = Arc::new(SessionContext::new(Arc::new(client)));
        let navigator = Navigator::new(context.clone());
        Ok(Self {
            config,
            format,
            context,
            navigator,
        })
    }

    pub fn client(&self) -> Arc<SessionClient> {
        self.context.client().clone()
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    pub fn navigator(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    /// Restore the stored session and open `route`; `roles` narrows the
    /// route's own requirement further for write operations.
    pub async fn enter(&mut self, route: &str, roles: &[Role]) -> Result<()> {
        self.context.bootstrap().await;
        self.navigator.poll_events();
        match self.navigator.navigate(route) {
            GuardDecision::Allowed => {}
            GuardDecision::RedirectLogin { .. } => bail!(
                "Not logged in (profile \"{}\"). Run `libdesk login` first.",
                self.config.profile
            ),
            GuardDecision::RedirectUnauthorized => {
                let required = match self.navigator.routes().access_for(route) {
                    Access::Protected(required) => required,
                    Access::Public | Access::PublicOnly => RoleSet::empty(),
                };
                return Err(self.unauthorized(route, required));
            }
            GuardDecision::RedirectHome => bail!(
                "Already logged in as {}. Run `libdesk logout` first.",
                self.username()
            ),
            GuardDecision::Loading => bail!("Session could not be resolved"),
        }
        if !roles.is_empty() && !self.context.authorization().has_any_role(roles) {
            return Err(self.unauthorized(route, RoleSet::of(roles)));
        }
        Ok(())
    }

    fn username(&self) -> String {
        self.context
            .state()
            .profile
            .map(|p| p.username)
            .unwrap_or_default()
    }

    fn unauthorized(&self, route: &str, required: RoleSet) -> anyhow::Error {
        let role = self
            .context
            .authorization()
            .role()
            .map(|r| r.to_string())
            .unwrap_or_default();
        anyhow!("Access denied: role {role} cannot use {route} (requires {required})")
    }

    /// Turn a client error into a user-facing one, redirecting to login when
    /// the session has expired.
    pub fn fail(&mut self, err: ClientError) -> anyhow::Error {
        tracing::debug!(category = %err.category(), error = %err, "request failed");
        if self.navigator.handle_error(&err).is_some() {
            anyhow!("Session expired. Run `libdesk login` to sign in again.")
        } else {
            err.into()
        }
    }
}

/// Read a JSON body from `file`, or stdin when no file is given.
pub fn read_body<T: DeserializeOwned>(file: Option<&Path>) -> Result<T> {
    let content = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Invalid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use libdesk_core::BookInput;

    #[test]
    fn test_read_body_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");
        fs::write(&path, r#"{"title": "Dune", "author": "Frank Herbert"}"#).unwrap();

        let book: BookInput = read_body(Some(&path)).unwrap();
        assert_eq!(book.title, "Dune");
        assert!(book.available);

        fs::write(&path, "{").unwrap();
        let err = read_body::<BookInput>(Some(&path)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON");
    }

    #[test]
    fn test_read_body_missing_file() {
        let err = read_body::<BookInput>(Some(Path::new("/nonexistent/book.json"))).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read file"));
    }

    #[tokio::test]
    async fn test_enter_without_session_asks_for_login() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            base_url: "http://127.0.0.1:9/api".into(),
            credentials_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mut app = App::new(config, OutputFormat::Json).unwrap();
        let err = app.enter("/books", &[]).await.unwrap_err();
        assert!(err.to_string().contains("libdesk login"));
        assert!(app.enter("/login", &[]).await.is_ok());
    }

    #[test]
    fn test_unauthorized_names_required_roles() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            credentials_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let app = App::new(config, OutputFormat::Table).unwrap();
        let err = app.unauthorized("/members", RoleSet::of(Role::staff()));
        assert!(
            err.to_string().ends_with("cannot use /members (requires LIBRARIAN, ADMIN)"),
            "{err}"
        );
    }
}
