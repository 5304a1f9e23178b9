use libdesk_core::{
    Acknowledgement, AdminUserInput, PasswordReset, Role, RoleChange, StatusChange, UserProfile,
    UserStats,
};

use crate::client::SessionClient;
use crate::error::Result;

/// `/admin/users` endpoints. ADMIN only.
#[derive(Debug, Clone, Copy)]
pub struct AdminApi<'a> {
    client: &'a SessionClient,
}

impl<'a> AdminApi<'a> {
    pub(crate) fn new(client: &'a SessionClient) -> Self {
        Self { client }
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>> {
        self.client.get("/admin/users").await
    }

    pub async fn get_user(&self, id: i64) -> Result<UserProfile> {
        self.client.get(&format!("/admin/users/{id}")).await
    }

    pub async fn create_user(&self, user: &AdminUserInput) -> Result<UserProfile> {
        self.client.post("/admin/users", user).await
    }

    pub async fn update_user(&self, id: i64, user: &AdminUserInput) -> Result<UserProfile> {
        self.client.put(&format!("/admin/users/{id}"), user).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/admin/users/{id}")).await
    }

    pub async fn change_role(&self, id: i64, role: Role) -> Result<Acknowledgement> {
        self.client
            .put(&format!("/admin/users/{id}/role"), &RoleChange { role })
            .await
    }

    /// Enable or disable an account.
    pub async fn set_status(&self, id: i64, enabled: bool) -> Result<Acknowledgement> {
        self.client
            .put(&format!("/admin/users/{id}/status"), &StatusChange { enabled })
            .await
    }

    pub async fn reset_password(&self, id: i64, new_password: &str) -> Result<Acknowledgement> {
        let body = PasswordReset {
            new_password: new_password.to_string(),
        };
        self.client
            .post(&format!("/admin/users/{id}/reset-password"), &body)
            .await
    }

    pub async fn stats(&self) -> Result<UserStats> {
        self.client.get("/admin/users/stats").await
    }

    pub async fn users_by_role(&self, role: Role) -> Result<Vec<UserProfile>> {
        self.client
            .get(&format!("/admin/users/role/{}", role.as_str()))
            .await
    }
}
