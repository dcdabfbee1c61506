use std::{io, process::ExitCode};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::{
    ClientConfig, UserApi, UserContext,
    views::{UserForm, render_detail, render_form_errors, render_list},
};
use common::{models::Role, validation::validate_role};
use dialoguer::{Confirm, console::Term};
use tracing_subscriber::EnvFilter;

/// Terminal front end for the user directory
#[derive(Debug, Parser)]
#[command(name = "users", version, about)]
struct Cli {
    /// API base URL (overrides API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all users, newest first
    List,
    /// Show one user
    Show { id: String },
    /// Create a user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = validate_role, default_value = "user")]
        role: Role,
    },
    /// Edit a user; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, value_parser = validate_role)]
        role: Option<Role>,
    },
    /// Delete a user
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config = ClientConfig {
            timeout_seconds: config.timeout_seconds,
            ..ClientConfig::new(url)
        };
    }
    let context = UserContext::new(UserApi::new(&config)?);

    let ok = match cli.command {
        Command::List => list(&context).await,
        Command::Show { id } => show(&context, &id).await,
        Command::Create { name, email, role } => {
            create(&context, UserForm { name, email, role }).await
        }
        Command::Edit {
            id,
            name,
            email,
            role,
        } => edit(&context, &id, name, email, role).await,
        Command::Delete { id, yes } => delete(&context, &id, yes).await?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn list(context: &UserContext) -> bool {
    context.fetch_users().await;
    let state = context.snapshot().await;
    print!("{}", render_list(&state));
    state.error.is_none()
}

async fn show(context: &UserContext, id: &str) -> bool {
    match context.api().get_user_by_id(id).await {
        Ok(user) => {
            print!("{}", render_detail(&user));
            true
        }
        Err(err) => {
            eprintln!("{}", err.user_message("Failed to fetch user"));
            false
        }
    }
}

async fn create(context: &UserContext, form: UserForm) -> bool {
    if let Err(errors) = form.validate() {
        eprint!("{}", render_form_errors(&errors));
        return false;
    }

    match context
        .create_user(&form.name, &form.email, Some(form.role))
        .await
    {
        Ok(()) => {
            println!("User created successfully!");
            true
        }
        Err(message) => {
            eprintln!("{message}");
            false
        }
    }
}

async fn edit(
    context: &UserContext,
    id: &str,
    name: Option<String>,
    email: Option<String>,
    role: Option<Role>,
) -> bool {
    let user = match context.api().get_user_by_id(id).await {
        Ok(user) => user,
        Err(err) => {
            eprintln!("Failed to load user: {}", err.user_message("User not found"));
            return false;
        }
    };

    let mut form = UserForm::from_user(&user);
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(email) = email {
        form.email = email;
    }
    if let Some(role) = role {
        form.role = role;
    }

    if let Err(errors) = form.validate() {
        eprint!("{}", render_form_errors(&errors));
        return false;
    }

    match context.update_user(id, form.to_update_request()).await {
        Ok(()) => {
            println!("User updated successfully!");
            true
        }
        Err(message) => {
            eprintln!("{message}");
            false
        }
    }
}

async fn delete(context: &UserContext, id: &str, yes: bool) -> Result<bool> {
    let user = match context.api().get_user_by_id(id).await {
        Ok(user) => user,
        Err(err) => {
            eprintln!("{}", err.user_message("User not found"));
            return Ok(false);
        }
    };

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Are you sure you want to delete {}?", user.name))
            .default(false)
            .interact_on(&Term::stderr())?;
        if !confirmed {
            return Ok(true);
        }
    }

    match context.delete_user(id).await {
        Ok(()) => {
            println!("User deleted successfully");
            Ok(true)
        }
        Err(message) => {
            eprintln!("{message}");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_role_to_user() {
        let cli = Cli::try_parse_from([
            "users",
            "create",
            "--name",
            "Jane",
            "--email",
            "jane@example.com",
        ])
        .unwrap();

        match cli.command {
            Command::Create { role, .. } => assert_eq!(role, Role::User),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn edit_rejects_unknown_role() {
        let result = Cli::try_parse_from(["users", "edit", "abc", "--role", "root"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_api_url_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["users", "list", "--api-url", "http://api:8080"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://api:8080"));
    }

    #[test]
    fn delete_prompts_unless_yes_is_given() {
        let cli = Cli::try_parse_from(["users", "delete", "abc"]).unwrap();
        assert!(matches!(cli.command, Command::Delete { yes: false, .. }));

        let cli = Cli::try_parse_from(["users", "delete", "abc", "-y"]).unwrap();
        assert!(matches!(cli.command, Command::Delete { yes: true, .. }));
    }
}
