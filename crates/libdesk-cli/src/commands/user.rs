use anyhow::{Result, bail};
use libdesk_core::{ChangePassword, ProfileUpdate};
use libdesk_session::DEFAULT_LANDING;

use super::App;
use crate::cli::ProfileCommands;
use crate::output::{print_item, print_success};

const PROFILE_PATH: &str = "/profile";

pub async fn dashboard(app: &mut App) -> Result<()> {
    app.enter(DEFAULT_LANDING, &[]).await?;
    let client = app.client();
    let dashboard = client.user().dashboard().await.map_err(|e| app.fail(e))?;
    print_item(&dashboard, app.format);
    if app.format == crate::cli::OutputFormat::Table {
        let nav = client.user().navigation().await.map_err(|e| app.fail(e))?;
        println!("Pages: {}", nav.allowed_pages.join(", "));
    }
    Ok(())
}

pub async fn profile(app: &mut App, command: &ProfileCommands) -> Result<()> {
    app.enter(PROFILE_PATH, &[]).await?;
    let client = app.client();
    match command {
        ProfileCommands::Show => {
            let profile = client.user().profile().await.map_err(|e| app.fail(e))?;
            print_item(&profile, app.format);
        }
        ProfileCommands::Update {
            email,
            first_name,
            last_name,
        } => {
            let update = ProfileUpdate {
                email: email.clone(),
                first_name: first_name.clone(),
                last_name: last_name.clone(),
            };
            if update.email.is_none() && update.first_name.is_none() && update.last_name.is_none() {
                bail!("Nothing to update: pass --email, --first-name or --last-name");
            }
            let profile = client
                .user()
                .update_profile(&update)
                .await
                .map_err(|e| app.fail(e))?;
            // Keep the cached profile in step with the server.
            app.context().refresh_user().await.map_err(|e| app.fail(e))?;
            print_success("Profile updated");
            print_item(&profile, app.format);
        }
        ProfileCommands::Password { old, new } => {
            let request = ChangePassword {
                old_password: old.clone(),
                new_password: new.clone(),
            };
            let ack = client
                .user()
                .change_password(&request)
                .await
                .map_err(|e| app.fail(e))?;
            print_success(if ack.message.is_empty() {
                "Password changed"
            } else {
                ack.message.as_str()
            });
        }
    }
    Ok(())
}
