use colored::Colorize;
use libdesk_client::Page;
use libdesk_core::{Book, Loan, Member, UserProfile, UserStats};
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

/// A type that renders as one table row.
pub trait Tabular {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

impl Tabular for Book {
    fn headers() -> &'static [&'static str] {
        &["ID", "Title", "Author", "Genre", "ISBN", "Available"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.author.clone(),
            opt(&self.genre),
            opt(&self.isbn),
            if self.available { "yes" } else { "no" }.to_string(),
        ]
    }
}

impl Tabular for Member {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Email", "Phone"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            opt(&self.phone),
        ]
    }
}

impl Tabular for Loan {
    fn headers() -> &'static [&'static str] {
        &["ID", "Book", "Member", "Borrowed", "Return", "Status"]
    }

    fn row(&self) -> Vec<String> {
        let book = match (&self.book, self.book_id()) {
            (Some(book), _) => book.title.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => "-".to_string(),
        };
        let member = match (&self.member, self.member_id()) {
            (Some(member), _) => member.name.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => "-".to_string(),
        };
        vec![
            self.id.to_string(),
            book,
            member,
            self.borrow_date.to_string(),
            self.return_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.status.to_string(),
        ]
    }
}

impl Tabular for UserProfile {
    fn headers() -> &'static [&'static str] {
        &["ID", "Username", "Name", "Email", "Role", "Enabled"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.username.clone(),
            self.full_name(),
            self.email.clone(),
            self.role.to_string(),
            if self.enabled { "yes" } else { "no" }.to_string(),
        ]
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("Cannot render output: {e}")),
    }
}

/// Print a single record: JSON, or a two-column field table.
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(item),
        OutputFormat::Table => match serde_json::to_value(item) {
            Ok(Value::Object(map)) => {
                let mut builder = Builder::default();
                for (key, value) in map {
                    builder.push_record([key, scalar(&value)]);
                }
                println!("{}", builder.build().with(Style::rounded()));
            }
            _ => print_json(item),
        },
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("title")
            .or_else(|| map.get("name"))
            .or_else(|| map.get("username"))
            .map(scalar)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

pub fn print_list<T: Tabular + Serialize>(items: &[T], format: OutputFormat) {
    let refs: Vec<&T> = items.iter().collect();
    print_rows(&refs, format);
}

fn print_rows<T: Tabular + Serialize>(items: &[&T], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(items),
        OutputFormat::Table => {
            if items.is_empty() {
                println!("Nothing found.");
                return;
            }
            let mut builder = Builder::default();
            builder.push_record(T::headers().iter().copied());
            for item in items {
                builder.push_record(item.row());
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
}

/// Print one page of a listing with a page footer.
pub fn print_page<T: Tabular + Serialize>(page: &Page<'_, T>, format: OutputFormat) {
    print_rows(&page.items, format);
    if format == OutputFormat::Table && page.total_pages > 1 {
        println!(
            "Page {} of {} ({} total)",
            page.page, page.total_pages, page.total
        );
    }
}

pub fn print_stats(stats: &UserStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(stats),
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Total", "Admins", "Librarians", "Users", "Enabled", "Disabled"]);
            builder.push_record([
                stats.total_users.to_string(),
                stats.admin_count.to_string(),
                stats.librarian_count.to_string(),
                stats.user_count.to_string(),
                stats.enabled_users.to_string(),
                stats.disabled_users.to_string(),
            ]);
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}
