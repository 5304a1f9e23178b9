use anyhow::Result;
use colored::Colorize;
use libdesk_client::Listing;
use libdesk_core::{Acknowledgement, AdminUserInput};

use super::{App, read_body};
use crate::cli::AdminCommands;
use crate::output::{print_item, print_list, print_page, print_stats, print_success};

const ADMIN_PATH: &str = "/admin/users";

fn acknowledge(ack: &Acknowledgement, fallback: &str) {
    if ack.message.is_empty() {
        print_success(fallback);
    } else {
        print_success(&ack.message);
    }
}

pub async fn run(app: &mut App, command: &AdminCommands) -> Result<()> {
    app.enter(ADMIN_PATH, &[]).await?;
    let client = app.client();
    let admin = client.admin();

    match command {
        AdminCommands::Users(args) => {
            let mut listing = Listing::with_page_size(args.page_size);
            listing
                .reload(|| admin.list_users())
                .await
                .map_err(|e| app.fail(e))?;
            if let Some(term) = &args.search {
                listing.set_search(term, &["username", "name", "email"]);
            }
            listing.set_page(args.page);
            print_page(&listing.page(), app.format);
        }
        AdminCommands::User { id } => {
            let user = admin.get_user(*id).await.map_err(|e| app.fail(e))?;
            print_item(&user, app.format);
        }
        AdminCommands::Create(body) => {
            let input: AdminUserInput = read_body(body.file.as_deref())?;
            let created = admin.create_user(&input).await.map_err(|e| app.fail(e))?;
            print_success(&format!(
                "Created user #{} {} ({})",
                created.id,
                created.username.cyan(),
                created.role
            ));
        }
        AdminCommands::Update { id, body } => {
            let input: AdminUserInput = read_body(body.file.as_deref())?;
            let updated = admin.update_user(*id, &input).await.map_err(|e| app.fail(e))?;
            print_success(&format!("Updated user #{id}"));
            print_item(&updated, app.format);
        }
        AdminCommands::Delete { id } => {
            admin.delete_user(*id).await.map_err(|e| app.fail(e))?;
            print_success(&format!("Deleted user #{id}"));
        }
        AdminCommands::Role { id, role } => {
            let ack = admin.change_role(*id, *role).await.map_err(|e| app.fail(e))?;
            acknowledge(&ack, &format!("User #{id} is now {role}"));
        }
        AdminCommands::Enable { id } => {
            let ack = admin.set_status(*id, true).await.map_err(|e| app.fail(e))?;
            acknowledge(&ack, &format!("User #{id} enabled"));
        }
        AdminCommands::Disable { id } => {
            let ack = admin.set_status(*id, false).await.map_err(|e| app.fail(e))?;
            acknowledge(&ack, &format!("User #{id} disabled"));
        }
        AdminCommands::ResetPassword { id, password } => {
            let ack = admin
                .reset_password(*id, password)
                .await
                .map_err(|e| app.fail(e))?;
            acknowledge(&ack, &format!("Password reset for user #{id}"));
        }
        AdminCommands::Stats => {
            let stats = admin.stats().await.map_err(|e| app.fail(e))?;
            print_stats(&stats, app.format);
        }
        AdminCommands::ByRole { role } => {
            let users = admin.users_by_role(*role).await.map_err(|e| app.fail(e))?;
            print_list(&users, app.format);
        }
    }
    Ok(())
}
