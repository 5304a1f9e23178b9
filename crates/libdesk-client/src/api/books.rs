use libdesk_core::{Book, BookInput, BookSearch};

use crate::client::SessionClient;
use crate::error::Result;

/// `/books` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct BooksApi<'a> {
    client: &'a SessionClient,
}

impl<'a> BooksApi<'a> {
    pub(crate) fn new(client: &'a SessionClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Book>> {
        self.client.get("/books").await
    }

    pub async fn get(&self, id: i64) -> Result<Book> {
        self.client.get(&format!("/books/{id}")).await
    }

    pub async fn create(&self, book: &BookInput) -> Result<Book> {
        self.client.post("/books", book).await
    }

    pub async fn update(&self, id: i64, book: &BookInput) -> Result<Book> {
        self.client.put(&format!("/books/{id}"), book).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/books/{id}")).await
    }

    /// Server-side search; an empty query lists everything.
    pub async fn search(&self, query: &BookSearch) -> Result<Vec<Book>> {
        if query.is_empty() {
            return self.list().await;
        }
        self.client.get_with_query("/books/search", query).await
    }

    pub async fn available(&self) -> Result<Vec<Book>> {
        self.client.get("/books/available").await
    }
}
