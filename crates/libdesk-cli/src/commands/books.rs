use anyhow::Result;
use colored::Colorize;
use libdesk_client::Listing;
use libdesk_core::{BookInput, BookSearch, Role};

use super::{App, read_body};
use crate::cli::BookCommands;
use crate::output::{print_item, print_list, print_page, print_success};

const BOOKS_PATH: &str = "/books";
const NO_EXTRA_ROLES: &[Role] = &[];

pub async fn run(app: &mut App, command: &BookCommands) -> Result<()> {
    // Reading is open to every role; changing the catalogue is staff work.
    let roles = match command {
        BookCommands::Create(_) | BookCommands::Update { .. } | BookCommands::Delete { .. } => {
            Role::staff()
        }
        _ => NO_EXTRA_ROLES,
    };
    app.enter(BOOKS_PATH, roles).await?;
    let client = app.client();
    let books = client.books();

    match command {
        BookCommands::List(args) => {
            let mut listing = Listing::with_page_size(args.page_size);
            listing
                .reload(|| books.list())
                .await
                .map_err(|e| app.fail(e))?;
            if let Some(term) = &args.search {
                listing.set_search(term, &["title", "author"]);
            }
            listing.set_page(args.page);
            print_page(&listing.page(), app.format);
        }
        BookCommands::Get { id } => {
            let book = books.get(*id).await.map_err(|e| app.fail(e))?;
            print_item(&book, app.format);
        }
        BookCommands::Available => {
            let available = books.available().await.map_err(|e| app.fail(e))?;
            print_list(&available, app.format);
        }
        BookCommands::Search {
            title,
            author,
            genre,
        } => {
            let query = BookSearch {
                title: title.clone(),
                author: author.clone(),
                genre: genre.clone(),
            };
            let found = books.search(&query).await.map_err(|e| app.fail(e))?;
            print_list(&found, app.format);
        }
        BookCommands::Create(body) => {
            let input: BookInput = read_body(body.file.as_deref())?;
            let created = books.create(&input).await.map_err(|e| app.fail(e))?;
            print_success(&format!("Created book #{} {}", created.id, created.title.cyan()));
            print_item(&created, app.format);
        }
        BookCommands::Update { id, body } => {
            let input: BookInput = read_body(body.file.as_deref())?;
            let updated = books.update(*id, &input).await.map_err(|e| app.fail(e))?;
            print_success(&format!("Updated book #{id}"));
            print_item(&updated, app.format);
        }
        BookCommands::Delete { id } => {
            books.delete(*id).await.map_err(|e| app.fail(e))?;
            print_success(&format!("Deleted book #{id}"));
        }
    }
    Ok(())
}
