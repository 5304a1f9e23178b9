//! Client-side filtering and pagination over a fetched collection.
//!
//! The server returns whole collections; narrowing by text and paging
//! happen locally. Writes go through [`Listing::mutate_then_reload`], which
//! only refetches after the write has completed.

use std::collections::BTreeMap;
use std::future::Future;

use libdesk_core::{Book, Loan, Member, UserProfile};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Exposes named text fields for filtering.
pub trait ListItem {
    /// Field value by name; `None` when the item has no such field or it is
    /// unset.
    fn field(&self, name: &str) -> Option<String>;
}

impl ListItem for Book {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "title" => Some(self.title.clone()),
            "author" => Some(self.author.clone()),
            "genre" => self.genre.clone(),
            "category" => self.category.clone(),
            "isbn" => self.isbn.clone(),
            "available" => Some(self.available.to_string()),
            _ => None,
        }
    }
}

impl ListItem for Member {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "name" => Some(self.name.clone()),
            "email" => Some(self.email.clone()),
            "phone" => self.phone.clone(),
            "address" => self.address.clone(),
            _ => None,
        }
    }
}

impl ListItem for Loan {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status.to_string()),
            "book" => self.book.as_ref().map(|b| b.title.clone()),
            "member" => self.member.as_ref().map(|m| m.name.clone()),
            _ => None,
        }
    }
}

impl ListItem for UserProfile {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "username" => Some(self.username.clone()),
            "email" => Some(self.email.clone()),
            "name" => Some(self.full_name()),
            "role" => Some(self.role.to_string()),
            _ => None,
        }
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// One page of a filtered listing.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: Vec<&'a T>,
    /// Items matching the filters, across all pages.
    pub total: usize,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone)]
struct Search {
    needle: String,
    fields: Vec<String>,
}

/// Fetched collection plus filter and page state.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    items: Vec<T>,
    search: Option<Search>,
    filters: BTreeMap<String, String>,
    page: usize,
    page_size: usize,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Listing<T> {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// A page size of 0 is treated as 1.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            search: None,
            filters: BTreeMap::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Every fetched item, unfiltered.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Refetch the collection. On error the current items are kept.
    pub async fn reload<F, Fut, E>(&mut self, fetch: F) -> Result<(), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        let items = fetch().await?;
        tracing::debug!(count = items.len(), "listing reloaded");
        self.items = items;
        Ok(())
    }

    /// Run a write, then reload. The reload starts only after the write
    /// succeeded; a failed write is returned and the items stay as they were.
    pub async fn mutate_then_reload<M, R, F, Fut, E>(&mut self, mutate: M, fetch: F) -> Result<R, E>
    where
        M: Future<Output = Result<R, E>>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        let outcome = mutate.await?;
        self.reload(fetch).await?;
        Ok(outcome)
    }
}

impl<T: ListItem> Listing<T> {
    /// Free-text search matched against any of `fields`. An empty term
    /// clears it. Resets to page 1.
    pub fn set_search(&mut self, term: &str, fields: &[&str]) {
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| Search {
            needle: term.to_lowercase(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        self.page = 1;
    }

    /// Require `field` to contain `value`. An empty value removes the
    /// filter. Resets to page 1.
    pub fn set_filter(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.filters.remove(field);
        } else {
            self.filters
                .insert(field.to_string(), value.to_lowercase());
        }
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.search = None;
        self.filters.clear();
        self.page = 1;
    }

    fn matches(&self, item: &T) -> bool {
        if let Some(search) = &self.search {
            let hit = search
                .fields
                .iter()
                .filter_map(|f| item.field(f))
                .any(|v| contains_ci(&v, &search.needle));
            if !hit {
                return false;
            }
        }
        self.filters.iter().all(|(field, needle)| {
            item.field(field)
                .is_some_and(|v| contains_ci(&v, needle))
        })
    }

    /// Items passing every filter, in fetch order.
    pub fn filtered(&self) -> Vec<&T> {
        self.items.iter().filter(|item| self.matches(item)).collect()
    }

    /// Current page of the filtered items. Out-of-range pages are clamped.
    pub fn page(&self) -> Page<'_, T> {
        let matching = self.filtered();
        let total = matching.len();
        let total_pages = total.div_ceil(self.page_size);
        let page = self.page.min(total_pages.max(1));
        let items = matching
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect();
        Page {
            items,
            total,
            page,
            page_size: self.page_size,
            total_pages,
        }
    }
}
