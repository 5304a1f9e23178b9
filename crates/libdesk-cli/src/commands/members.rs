use anyhow::Result;
use colored::Colorize;
use libdesk_client::Listing;
use libdesk_core::{MemberInput, MemberSearch};

use super::{App, read_body};
use crate::cli::MemberCommands;
use crate::output::{print_item, print_list, print_page, print_success};

const MEMBERS_PATH: &str = "/members";

pub async fn run(app: &mut App, command: &MemberCommands) -> Result<()> {
    app.enter(MEMBERS_PATH, &[]).await?;
    let client = app.client();
    let members = client.members();

    match command {
        MemberCommands::List(args) => {
            let mut listing = Listing::with_page_size(args.page_size);
            listing
                .reload(|| members.list())
                .await
                .map_err(|e| app.fail(e))?;
            if let Some(term) = &args.search {
                listing.set_search(term, &["name", "email"]);
            }
            listing.set_page(args.page);
            print_page(&listing.page(), app.format);
        }
        MemberCommands::Get { id } => {
            let member = members.get(*id).await.map_err(|e| app.fail(e))?;
            print_item(&member, app.format);
        }
        MemberCommands::Search { name, email } => {
            let query = MemberSearch {
                name: name.clone(),
                email: email.clone(),
            };
            let found = members.search(&query).await.map_err(|e| app.fail(e))?;
            print_list(&found, app.format);
        }
        MemberCommands::Create(body) => {
            let input: MemberInput = read_body(body.file.as_deref())?;
            let created = members.create(&input).await.map_err(|e| app.fail(e))?;
            print_success(&format!("Created member #{} {}", created.id, created.name.cyan()));
            print_item(&created, app.format);
        }
        MemberCommands::Update { id, body } => {
            let input: MemberInput = read_body(body.file.as_deref())?;
            let updated = members.update(*id, &input).await.map_err(|e| app.fail(e))?;
            print_success(&format!("Updated member #{id}"));
            print_item(&updated, app.format);
        }
        MemberCommands::Delete { id } => {
            members.delete(*id).await.map_err(|e| app.fail(e))?;
            print_success(&format!("Deleted member #{id}"));
        }
    }
    Ok(())
}
