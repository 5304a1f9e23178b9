use libdesk_core::{Loan, LoanInput};

use crate::client::SessionClient;
use crate::error::Result;

/// `/loans` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct LoansApi<'a> {
    client: &'a SessionClient,
}

impl<'a> LoansApi<'a> {
    pub(crate) fn new(client: &'a SessionClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Loan>> {
        self.client.get("/loans").await
    }

    pub async fn get(&self, id: i64) -> Result<Loan> {
        self.client.get(&format!("/loans/{id}")).await
    }

    pub async fn create(&self, loan: &LoanInput) -> Result<Loan> {
        self.client.post("/loans", loan).await
    }

    pub async fn update(&self, id: i64, loan: &LoanInput) -> Result<Loan> {
        self.client.put(&format!("/loans/{id}"), loan).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/loans/{id}")).await
    }

    /// Mark a borrowed loan as returned.
    pub async fn return_book(&self, id: i64) -> Result<Loan> {
        self.client.post_empty(&format!("/loans/{id}/return")).await
    }

    pub async fn by_member(&self, member_id: i64) -> Result<Vec<Loan>> {
        self.client.get(&format!("/loans/member/{member_id}")).await
    }

    pub async fn by_book(&self, book_id: i64) -> Result<Vec<Loan>> {
        self.client.get(&format!("/loans/book/{book_id}")).await
    }

    pub async fn overdue(&self) -> Result<Vec<Loan>> {
        self.client.get("/loans/overdue").await
    }

    /// Loans of the logged-in user.
    pub async fn my_loans(&self) -> Result<Vec<Loan>> {
        self.client.get("/loans/my-loans").await
    }
}
