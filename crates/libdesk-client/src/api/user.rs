use libdesk_core::{Acknowledgement, ChangePassword, DashboardData, NavigationData, ProfileUpdate, UserProfile};

use crate::client::SessionClient;
use crate::error::Result;

/// `/user` endpoints for the logged-in account.
#[derive(Debug, Clone, Copy)]
pub struct UserApi<'a> {
    client: &'a SessionClient,
}

impl<'a> UserApi<'a> {
    pub(crate) fn new(client: &'a SessionClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        self.client.get("/user/profile").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        self.client.put("/user/profile", update).await
    }

    pub async fn change_password(&self, request: &ChangePassword) -> Result<Acknowledgement> {
        self.client.post("/user/change-password", request).await
    }

    pub async fn dashboard(&self) -> Result<DashboardData> {
        self.client.get("/user/dashboard").await
    }

    pub async fn navigation(&self) -> Result<NavigationData> {
        self.client.get("/user/navigation").await
    }
}
