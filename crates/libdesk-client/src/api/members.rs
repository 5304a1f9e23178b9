use libdesk_core::{Member, MemberInput, MemberSearch};

use crate::client::SessionClient;
use crate::error::Result;

/// `/members` endpoints. All but `my_profile` need LIBRARIAN or ADMIN.
#[derive(Debug, Clone, Copy)]
pub struct MembersApi<'a> {
    client: &'a SessionClient,
}

impl<'a> MembersApi<'a> {
    pub(crate) fn new(client: &'a SessionClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Member>> {
        self.client.get("/members").await
    }

    pub async fn get(&self, id: i64) -> Result<Member> {
        self.client.get(&format!("/members/{id}")).await
    }

    pub async fn create(&self, member: &MemberInput) -> Result<Member> {
        self.client.post("/members", member).await
    }

    pub async fn update(&self, id: i64, member: &MemberInput) -> Result<Member> {
        self.client.put(&format!("/members/{id}"), member).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/members/{id}")).await
    }

    pub async fn search(&self, query: &MemberSearch) -> Result<Vec<Member>> {
        self.client.get_with_query("/members/search", query).await
    }

    /// Member record of the logged-in user.
    pub async fn my_profile(&self) -> Result<Member> {
        self.client.get("/members/my-profile").await
    }
}
