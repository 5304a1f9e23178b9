use anyhow::Result;
use colored::Colorize;
use libdesk_core::RegisterRequest;
use libdesk_session::{LOGIN_PATH, REGISTER_PATH};

use super::App;
use crate::cli::{LoginArgs, RegisterArgs};
use crate::output::{print_error, print_item, print_success};

pub async fn login(app: &mut App, args: &LoginArgs) -> Result<()> {
    app.enter(LOGIN_PATH, &[]).await?;
    let context = app.context().clone();
    let profile = context
        .login(&args.username, &args.password)
        .await
        .map_err(|e| app.fail(e))?;
    app.navigator().after_login();
    print_success(&format!(
        "Logged in to {} as {} ({})",
        app.config.base_url.cyan(),
        profile.username.cyan(),
        profile.role
    ));
    Ok(())
}

pub async fn register(app: &mut App, args: &RegisterArgs) -> Result<()> {
    app.enter(REGISTER_PATH, &[]).await?;
    let request = RegisterRequest {
        username: args.username.clone(),
        email: args.email.clone(),
        password: args.password.clone(),
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        role: None,
    };
    let context = app.context().clone();
    let profile = context.register(request).await.map_err(|e| app.fail(e))?;
    print_success(&format!(
        "Registered and logged in as {}",
        profile.username.cyan()
    ));
    Ok(())
}

pub fn logout(app: &mut App) -> Result<()> {
    let had_session = app.client().stored_credentials().is_some();
    app.context().logout()?;
    if had_session {
        print_success("Logged out (credentials removed)");
    } else {
        println!("No credentials found for profile \"{}\"", app.config.profile);
    }
    Ok(())
}

pub async fn whoami(app: &mut App) -> Result<()> {
    let state = app.context().bootstrap().await;
    let stored = app.client().stored_credentials();
    match (state.profile, stored) {
        (Some(profile), Some(stored)) => {
            println!("{}: {}", "Profile".cyan(), app.config.profile);
            println!("{}: {}", "Server".cyan(), app.config.base_url.cyan());
            println!("{}: {}", "Token".cyan(), stored.token_preview());
            print_item(&profile, app.format);
        }
        _ => print_error(&format!(
            "Not logged in (profile: \"{}\")",
            app.config.profile
        )),
    }
    Ok(())
}
