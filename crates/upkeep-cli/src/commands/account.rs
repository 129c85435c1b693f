use clap::Subcommand;
use serde::Serialize;
use tracing::info;
use upkeep_core::{Role, SessionContext};
use upkeep_users::{User, UserError};

use crate::app::App;
use crate::output::{emit, print_table};

#[derive(Debug, Subcommand)]
pub(crate) enum UserCommand {
    /// Register an account (starts unvalidated unless --validate is given)
    Add {
        username: String,
        /// Initial password
        #[arg(value_name = "PASSWORD")]
        initial_password: String,
        /// User, Admin or "Super Admin"
        #[arg(long, default_value = "User")]
        role: Role,
        /// Validate the account straight away
        #[arg(long)]
        validate: bool,
    },
    /// List all accounts
    List,
    /// Allow an account to log in
    Validate {
        /// User id or username
        account: String,
    },
    /// Delete an account; its work orders become unassigned
    Delete {
        /// User id or username
        account: String,
    },
}

#[derive(Serialize)]
struct InitReport<'a> {
    database: &'a str,
    bootstrap_user: Option<&'a str>,
}

pub(crate) fn init(app: &App) -> anyhow::Result<()> {
    let bootstrap = &app.config.bootstrap;
    let report = InitReport {
        database: &app.config.database.path,
        bootstrap_user: bootstrap.enabled.then_some(bootstrap.username.as_str()),
    };
    emit(app.output, &report, |r| {
        println!("Database ready at {}", r.database);
        if let Some(user) = r.bootstrap_user {
            println!("Super Admin account: {user}");
        }
    })
}

pub(crate) fn login(app: &App, session: &SessionContext) -> anyhow::Result<()> {
    emit(app.output, session, |s| println!("Logged in as {s}"))
}

pub(crate) fn run(app: &App, session: &SessionContext, command: UserCommand) -> anyhow::Result<()> {
    session.require_user_admin()?;

    match command {
        UserCommand::Add {
            username,
            initial_password,
            role,
            validate,
        } => {
            let mut user = app.users.add_user(&username, &initial_password, role)?;
            if validate {
                app.users.validate_user(&user.id)?;
                user.is_validated = true;
            }
            info!(by = %session.username, user_id = %user.id, "account registered");
            emit(app.output, &user, |u| {
                println!("Added {} ({}) as {}", u.username, u.id, u.role);
                if !u.is_validated {
                    println!("The account must be validated before it can log in.");
                }
            })
        }
        UserCommand::List => {
            let users = app.users.list_users()?;
            emit(app.output, &users, |users| {
                let rows: Vec<_> = users
                    .iter()
                    .map(|u| {
                        vec![
                            u.id.clone(),
                            u.username.clone(),
                            u.role.to_string(),
                            if u.is_validated { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();
                print_table(&["ID", "USERNAME", "ROLE", "VALIDATED"], &rows);
            })
        }
        UserCommand::Validate { account } => {
            let target = resolve_user(app, &account)?;
            app.users.validate_user(&target.id)?;
            emit(app.output, &serde_json::json!({ "validated": target.id }), |_| {
                println!("Validated {}", target.username)
            })
        }
        UserCommand::Delete { account } => {
            let target = resolve_user(app, &account)?;
            if target.id == session.user_id {
                anyhow::bail!("refusing to delete the account you are logged in with");
            }
            app.users.delete_user(&target.id)?;
            emit(app.output, &serde_json::json!({ "deleted": target.id }), |_| {
                println!("Deleted {}", target.username)
            })
        }
    }
}

/// Look an account up by id first, then by username.
pub(crate) fn resolve_user(app: &App, key: &str) -> anyhow::Result<User> {
    if let Some(user) = app.users.get_user(key)? {
        return Ok(user);
    }
    app.users
        .find_by_username(key)?
        .ok_or_else(|| UserError::NotFound(key.to_string()).into())
}
