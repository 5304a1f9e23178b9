//! Books, members and loans as exchanged with the library API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::CoreError;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> crate::Result<Date> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Ok(Date::parse(s.trim(), &format)?)
}

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Body for creating or updating a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

/// Query for `GET /books/search`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl BookSearch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.genre.is_none()
    }
}

/// A library member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Body for creating or updating a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInput {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Query for `GET /members/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Loan lifecycle. `BORROWED → RETURNED` is the only transition the client
/// requests directly; `OVERDUE` is assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Borrowed => "BORROWED",
            Self::Returned => "RETURNED",
            Self::Overdue => "OVERDUE",
        }
    }

    /// Whether `POST /loans/{id}/return` is meaningful for this status.
    pub fn can_return(&self) -> bool {
        match self {
            Self::Borrowed | Self::Overdue => true,
            Self::Returned => false,
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BORROWED" => Ok(Self::Borrowed),
            "RETURNED" => Ok(Self::Returned),
            "OVERDUE" => Ok(Self::Overdue),
            _ => Err(CoreError::invalid_loan_status(s.trim())),
        }
    }
}

/// A loan of one book to one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: i64,
    #[serde(default)]
    pub member_id: Option<i64>,
    #[serde(default)]
    pub book_id: Option<i64>,
    #[serde(with = "iso_date")]
    pub borrow_date: Date,
    /// Due date while borrowed, actual return date once returned.
    #[serde(default, with = "iso_date::option", skip_serializing_if = "Option::is_none")]
    pub return_date: Option<Date>,
    pub status: LoanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}

impl Loan {
    /// Book id, from the flat field or the embedded book.
    pub fn book_id(&self) -> Option<i64> {
        self.book_id.or_else(|| self.book.as_ref().map(|b| b.id))
    }

    /// Member id, from the flat field or the embedded member.
    pub fn member_id(&self) -> Option<i64> {
        self.member_id.or_else(|| self.member.as_ref().map(|m| m.id))
    }

    /// Overdue as of `today`: flagged by the server, or still borrowed past
    /// its return date.
    pub fn is_overdue_on(&self, today: Date) -> bool {
        match self.status {
            LoanStatus::Overdue => true,
            LoanStatus::Borrowed => self.return_date.is_some_and(|due| due < today),
            LoanStatus::Returned => false,
        }
    }
}

/// Body for creating or updating a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanInput {
    pub member_id: i64,
    pub book_id: i64,
    #[serde(with = "iso_date")]
    pub borrow_date: Date,
    pub status: LoanStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-15").unwrap(), date!(2024 - 03 - 15));
        assert!(parse_date("15/03/2024").is_err());
    }

    #[test]
    fn test_book_from_server() {
        let book: Book = serde_json::from_value(json!({
            "id": 7,
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "Science Fiction",
            "publishedYear": 1965,
            "available": true
        }))
        .unwrap();
        assert_eq!(book.published_year, Some(1965));
        assert!(book.available);
        assert_eq!(book.isbn, None);
    }

    #[test]
    fn test_book_search_skips_unset_fields() {
        let search = BookSearch {
            author: Some("Herbert".into()),
            ..Default::default()
        };
        assert!(!search.is_empty());
        assert_eq!(serde_json::to_value(&search).unwrap(), json!({"author": "Herbert"}));
        assert!(BookSearch::default().is_empty());
    }

    #[test]
    fn test_loan_status() {
        assert_eq!("returned".parse::<LoanStatus>().unwrap(), LoanStatus::Returned);
        assert!("LOST".parse::<LoanStatus>().is_err());
        assert!(LoanStatus::Borrowed.can_return());
        assert!(!LoanStatus::Returned.can_return());
    }

    #[test]
    fn test_loan_with_embedded_entities() {
        let loan: Loan = serde_json::from_value(json!({
            "id": 3,
            "borrowDate": "2024-01-10",
            "returnDate": "2024-01-24",
            "status": "BORROWED",
            "book": {"id": 7, "title": "Dune", "author": "Frank Herbert", "available": false},
            "member": {"id": 2, "name": "Ann", "email": "ann@example.com"}
        }))
        .unwrap();
        assert_eq!(loan.book_id(), Some(7));
        assert_eq!(loan.member_id(), Some(2));
        assert_eq!(loan.borrow_date, date!(2024 - 01 - 10));
        assert!(loan.is_overdue_on(date!(2024 - 02 - 01)));
        assert!(!loan.is_overdue_on(date!(2024 - 01 - 20)));
    }

    #[test]
    fn test_returned_loan_is_never_overdue() {
        let loan: Loan = serde_json::from_value(json!({
            "id": 4,
            "memberId": 1,
            "bookId": 1,
            "borrowDate": "2024-01-10",
            "returnDate": "2024-01-12",
            "status": "RETURNED"
        }))
        .unwrap();
        assert!(!loan.is_overdue_on(date!(2025 - 01 - 01)));
    }

    #[test]
    fn test_loan_input_serializes_iso_date() {
        let input = LoanInput {
            member_id: 1,
            book_id: 2,
            borrow_date: date!(2024 - 05 - 01),
            status: LoanStatus::Borrowed,
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"memberId": 1, "bookId": 2, "borrowDate": "2024-05-01", "status": "BORROWED"})
        );
    }
}
