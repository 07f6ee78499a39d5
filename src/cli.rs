//! # Command Line
//!
//! Thin driver over the repository and the reconciler. Each subcommand
//! performs one repository flow (or one local diff) and prints the result.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Subcommand;
use log::info;

use crate::core::config::ResolvedConfig;
use crate::core::list::{UserList, UserRow};
use crate::core::reconciler;
use crate::core::repository::{RepositoryError, UserRepository};
use crate::core::user::User;
use crate::gateway::HttpUserApi;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(flatten)]
    Remote(RemoteCommand),
    /// Print the edits that turn one JSON user list into another
    Diff { old: PathBuf, new: PathBuf },
}

/// Commands that talk to the users API.
#[derive(Subcommand, Debug, Clone)]
pub enum RemoteCommand {
    /// List every user
    List,
    /// Fetch one or more users by id (fetched concurrently)
    Get {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Search users by free text
    Search { query: String },
    /// Create a user; the server assigns the id
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Change fields of an existing user
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, conflicts_with = "clear_phone")]
        phone: Option<String>,
        /// Remove the stored phone number
        #[arg(long)]
        clear_phone: bool,
    },
    /// Delete a user
    Delete { id: u64 },
}

pub type CliResult = Result<(), Box<dyn Error>>;

/// What `update` does to the phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneChange {
    Keep,
    Set(String),
    Clear,
}

impl PhoneChange {
    pub fn from_flags(phone: Option<String>, clear: bool) -> Self {
        match (phone, clear) {
            (_, true) => PhoneChange::Clear,
            (Some(phone), false) => PhoneChange::Set(phone),
            (None, false) => PhoneChange::Keep,
        }
    }
}

/// Field changes for `update`. Unset fields keep the server's current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: PhoneChange,
}

impl UserChanges {
    /// Builds the new user value; `user` itself is consumed, never mutated in place.
    pub fn apply_to(self, user: User) -> User {
        let mut user = user;
        if let Some(name) = self.name {
            user = user.with_name(name);
        }
        if let Some(email) = self.email {
            user = user.with_email(email);
        }
        match self.phone {
            PhoneChange::Keep => user,
            PhoneChange::Set(phone) => user.with_phone(Some(phone)),
            PhoneChange::Clear => user.with_phone(None),
        }
    }
}

/// Formats a row the way the list view shows it.
pub fn format_row(row: &UserRow) -> String {
    format!("{} <{}> {}", row.display_name, row.email, row.formatted_phone)
}

fn print_user(user: &User) {
    println!("#{} {}", user.id, format_row(&UserRow::from(user)));
    if !user.is_valid_email() {
        println!("   (email looks invalid)");
    }
}

fn print_users(users: Vec<User>) -> CliResult {
    let mut list = UserList::new();
    list.submit(users)?;
    if list.is_empty() {
        println!("No users.");
    }
    for row in list.rows() {
        println!("{}", format_row(&row));
    }
    Ok(())
}

fn read_users(path: &Path) -> Result<Vec<User>, Box<dyn Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let users = serde_json::from_str(&contents)
        .map_err(|e| format!("failed to parse {}: {e}", path.display()))?;
    Ok(users)
}

/// Runs a local diff between two JSON files. No network involved.
pub fn diff_files(old: &Path, new: &Path) -> Result<Vec<reconciler::Edit>, Box<dyn Error>> {
    let old = read_users(old)?;
    let new = read_users(new)?;
    Ok(reconciler::diff(&old, &new))
}

/// Fetches every id concurrently. Results come back in the order of `ids`.
pub async fn get_users(
    repository: &UserRepository,
    ids: &[u64],
) -> Vec<(u64, Result<User, RepositoryError>)> {
    let results =
        futures::future::join_all(ids.iter().map(|&id| repository.get_user(id))).await;
    ids.iter().copied().zip(results).collect()
}

/// Fetches the current user, applies `changes` and puts the result back.
pub async fn update_user(
    repository: &UserRepository,
    id: u64,
    changes: UserChanges,
) -> Result<User, RepositoryError> {
    let current = repository.get_user(id).await?;
    let changed = changes.apply_to(current);
    repository.update_user(id, &changed).await
}

pub async fn run(command: Command, config: &ResolvedConfig) -> CliResult {
    match command {
        Command::Diff { old, new } => {
            let edits = diff_files(&old, &new)?;
            if edits.is_empty() {
                println!("No changes.");
            }
            for edit in &edits {
                println!("{edit}");
            }
            Ok(())
        }
        Command::Remote(remote) => {
            let api = HttpUserApi::new(config.base_url.clone(), config.timeout)?;
            run_remote(remote, &UserRepository::new(Arc::new(api))).await
        }
    }
}

async fn run_remote(command: RemoteCommand, repository: &UserRepository) -> CliResult {
    info!("Running {:?}", command);

    match command {
        RemoteCommand::List => print_users(repository.list_users().await?),
        RemoteCommand::Search { query } => print_users(repository.search_users(&query).await?),
        RemoteCommand::Get { ids } => {
            let mut first_error = None;
            for (id, result) in get_users(repository, &ids).await {
                match result {
                    Ok(user) => print_user(&user),
                    Err(e) => {
                        eprintln!("#{id}: {e}");
                        first_error.get_or_insert(e);
                    }
                }
            }
            match first_error {
                Some(e) => Err(e.into()),
                None => Ok(()),
            }
        }
        RemoteCommand::Create { name, email, phone } => {
            let created = repository
                .create_user(&User::create(name, email, phone))
                .await?;
            print_user(&created);
            Ok(())
        }
        RemoteCommand::Update {
            id,
            name,
            email,
            phone,
            clear_phone,
        } => {
            let changes = UserChanges {
                name,
                email,
                phone: PhoneChange::from_flags(phone, clear_phone),
            };
            let updated = update_user(repository, id, changes).await?;
            print_user(&updated);
            Ok(())
        }
        RemoteCommand::Delete { id } => {
            repository.delete_user(id).await?;
            println!("Deleted user #{id}");
            Ok(())
        }
    }
}
