//! Authentication payloads and the persisted credential record.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Token bundle returned by login, register and refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    /// Empty when the refresh endpoint does not rotate the refresh token.
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Access token lifetime as reported by the server.
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub username: String,
    /// Role claim at issue time. Informational only; authorization uses the
    /// loaded [`UserProfile`].
    #[serde(default)]
    pub role: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// The four entries the credential store persists.
///
/// Field names on disk are fixed (`accessToken`, `refreshToken`, `userRole`,
/// `username`) and carry no schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "userRole", default)]
    pub role: String,
    #[serde(default)]
    pub username: String,
}

impl StoredCredentials {
    /// A record is usable only when both tokens are present.
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }

    /// Builds the record to persist after a successful refresh.
    ///
    /// The refresh token is replaced only when the server rotated it; the
    /// role and username fall back to the previous record when the refresh
    /// response leaves them empty.
    pub fn renewed(&self, refreshed: &Credentials) -> Self {
        let pick = |new: &str, old: &str| {
            if new.is_empty() {
                old.to_string()
            } else {
                new.to_string()
            }
        };
        Self {
            access_token: refreshed.access_token.clone(),
            refresh_token: pick(&refreshed.refresh_token, &self.refresh_token),
            role: pick(&refreshed.role, &self.role),
            username: pick(&refreshed.username, &self.username),
        }
    }

    /// Shortened access token for display, never the full secret.
    pub fn token_preview(&self) -> String {
        let token = &self.access_token;
        if token.len() > 20 && token.is_ascii() {
            format!("{}...{}", &token[..8], &token[token.len() - 8..])
        } else {
            "********".to_string()
        }
    }
}

impl From<&Credentials> for StoredCredentials {
    fn from(creds: &Credentials) -> Self {
        Self {
            access_token: creds.access_token.clone(),
            refresh_token: creds.refresh_token.clone(),
            role: creds.role.clone(),
            username: creds.username.clone(),
        }
    }
}

/// `POST /auth/login` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
        }
    }
}

/// `POST /auth/register` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// `POST /auth/refresh` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Current user as returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl UserProfile {
    /// "First Last", or the username when no name is set.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}
