//! User administration and per-user dashboard payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Body for `POST /admin/users` and `PUT /admin/users/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserInput {
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleChange {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub new_password: String,
}

/// `GET /admin/users/stats`. Unknown counters are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub admin_count: u64,
    #[serde(default)]
    pub librarian_count: u64,
    #[serde(default)]
    pub user_count: u64,
    #[serde(default)]
    pub enabled_users: u64,
    #[serde(default)]
    pub disabled_users: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl UserStats {
    /// Number of accounts holding `role`.
    pub fn count_for(&self, role: Role) -> u64 {
        match role {
            Role::User => self.user_count,
            Role::Librarian => self.librarian_count,
            Role::Admin => self.admin_count,
        }
    }
}

/// Body for `PUT /user/profile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Body for `POST /user/change-password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub old_password: String,
    pub new_password: String,
}

/// `GET /user/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub full_name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<String>,
}

/// `GET /user/navigation`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationData {
    #[serde(default)]
    pub menu_items: Vec<String>,
    #[serde(default)]
    pub allowed_pages: Vec<String>,
}

/// Plain `{"message": "..."}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_stats_keeps_unknown_counters() {
        let stats: UserStats = serde_json::from_value(json!({
            "totalUsers": 5,
            "adminCount": 1,
            "librarianCount": 1,
            "userCount": 3,
            "enabledUsers": 4,
            "disabledUsers": 1,
            "lockedUsers": 0
        }))
        .unwrap();
        assert_eq!(stats.count_for(Role::User), 3);
        assert_eq!(stats.count_for(Role::Admin), 1);
        assert_eq!(stats.extra.get("lockedUsers"), Some(&json!(0)));
    }

    #[test]
    fn test_dashboard_type_field() {
        let dashboard: DashboardData = serde_json::from_value(json!({
            "username": "lib",
            "role": "LIBRARIAN",
            "fullName": "Lib Rarian",
            "type": "LIBRARIAN_DASHBOARD",
            "features": ["manage_books", "manage_members"]
        }))
        .unwrap();
        assert_eq!(dashboard.kind, "LIBRARIAN_DASHBOARD");
        assert_eq!(dashboard.features.len(), 2);
    }

    #[test]
    fn test_role_change_body() {
        let body = serde_json::to_value(RoleChange { role: Role::Librarian }).unwrap();
        assert_eq!(body, json!({"role": "LIBRARIAN"}));
        let body = serde_json::to_value(PasswordReset {
            new_password: "s3cret".into(),
        })
        .unwrap();
        assert_eq!(body, json!({"newPassword": "s3cret"}));
    }
}
