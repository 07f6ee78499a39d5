//! # User Repository
//!
//! The one place where gateway outcomes are classified. Every call returns a
//! `Result`; nothing escapes as a panic.
//!
//! ```text
//! gateway outcome                     →  repository result
//! ─────────────────────────────────────────────────────────────
//! Err(GatewayError)                   →  Err(Transport)
//! status outside 2xx                  →  Err(Status { operation, status })
//! 2xx, list expected, no body         →  Ok(vec![])
//! 2xx, entity expected, no body       →  Err(EmptyBody(operation))
//! 2xx, delete                         →  Ok(())
//! ```
//!
//! Gateway calls are spawned onto the tokio runtime and awaited, so the
//! calling task only suspends. Dropping a pending repository future detaches
//! the spawned request; it runs to completion and its result is discarded.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};

use crate::core::user::User;
use crate::gateway::{ApiResponse, GatewayError, UserApi};

/// The repository call an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    Search,
}

impl Operation {
    /// Prefix used in status-code failures, e.g. `Failed to fetch users: 404`.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::List => "Failed to fetch users",
            Operation::Get => "Failed to fetch user",
            Operation::Create => "Failed to create user",
            Operation::Update => "Failed to update user",
            Operation::Delete => "Failed to delete user",
            Operation::Search => "Failed to search users",
        }
    }

    /// Message used when a 2xx response carries no entity.
    pub fn missing_body_message(self) -> &'static str {
        match self {
            Operation::Get => "User not found",
            other => other.failure_message(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list users",
            Operation::Get => "get user",
            Operation::Create => "create user",
            Operation::Update => "update user",
            Operation::Delete => "delete user",
            Operation::Search => "search users",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No response exists: network, timeout, decode or client failure.
    Transport(GatewayError),
    /// A well-formed response with a failing status code.
    Status { operation: Operation, status: u16 },
    /// A 2xx response without the entity the operation needs.
    EmptyBody(Operation),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Transport(e) => write!(f, "{e}"),
            RepositoryError::Status { operation, status } => {
                write!(f, "{}: {status}", operation.failure_message())
            }
            RepositoryError::EmptyBody(operation) => {
                f.write_str(operation.missing_body_message())
            }
        }
    }
}

impl std::error::Error for RepositoryError {}

// ============================================================================
// Normalization
// ============================================================================

fn check_status<T>(
    operation: Operation,
    response: &ApiResponse<T>,
) -> Result<(), RepositoryError> {
    if response.is_success() {
        return Ok(());
    }
    warn!("{} failed with status {}", operation, response.status);
    Err(RepositoryError::Status {
        operation,
        status: response.status,
    })
}

fn list_body(
    operation: Operation,
    response: ApiResponse<Vec<User>>,
) -> Result<Vec<User>, RepositoryError> {
    check_status(operation, &response)?;
    let users = response.body.unwrap_or_default();
    debug!("{} returned {} users", operation, users.len());
    Ok(users)
}

fn entity_body(operation: Operation, response: ApiResponse<User>) -> Result<User, RepositoryError> {
    check_status(operation, &response)?;
    match response.body {
        Some(user) => {
            debug!("{} returned user id={}", operation, user.id);
            Ok(user)
        }
        None => {
            warn!("{} succeeded with status {} but no body", operation, response.status);
            Err(RepositoryError::EmptyBody(operation))
        }
    }
}

/// Runs a gateway call on the runtime and waits for it without blocking.
async fn on_io<T, F>(operation: Operation, call: F) -> Result<ApiResponse<T>, RepositoryError>
where
    T: Send + 'static,
    F: Future<Output = Result<ApiResponse<T>, GatewayError>> + Send + 'static,
{
    match tokio::spawn(call).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) => {
            warn!("{} transport failure: {}", operation, e);
            Err(RepositoryError::Transport(e))
        }
        Err(e) => {
            warn!("{} task did not complete: {}", operation, e);
            Err(RepositoryError::Transport(GatewayError::Network(format!(
                "request task did not complete: {e}"
            ))))
        }
    }
}

// ============================================================================
// Repository
// ============================================================================

/// Stateless facade over a [`UserApi`]. Cheap to clone; clones share the gateway.
#[derive(Clone)]
pub struct UserRepository {
    api: Arc<dyn UserApi>,
}

impl UserRepository {
    pub fn new(api: Arc<dyn UserApi>) -> Self {
        Self { api }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let api = Arc::clone(&self.api);
        let response = on_io(Operation::List, async move { api.list_users().await }).await?;
        list_body(Operation::List, response)
    }

    pub async fn get_user(&self, id: u64) -> Result<User, RepositoryError> {
        let api = Arc::clone(&self.api);
        let response = on_io(Operation::Get, async move { api.get_user(id).await }).await?;
        entity_body(Operation::Get, response)
    }

    /// Creates `user` on the server. The returned user carries the assigned id.
    pub async fn create_user(&self, user: &User) -> Result<User, RepositoryError> {
        let api = Arc::clone(&self.api);
        let user = user.clone();
        let response =
            on_io(Operation::Create, async move { api.create_user(&user).await }).await?;
        entity_body(Operation::Create, response)
    }

    pub async fn update_user(&self, id: u64, user: &User) -> Result<User, RepositoryError> {
        let api = Arc::clone(&self.api);
        let user = user.clone();
        let response =
            on_io(Operation::Update, async move { api.update_user(id, &user).await }).await?;
        entity_body(Operation::Update, response)
    }

    /// Any 2xx counts as deleted; the body is ignored.
    pub async fn delete_user(&self, id: u64) -> Result<(), RepositoryError> {
        let api = Arc::clone(&self.api);
        let response = on_io(Operation::Delete, async move { api.delete_user(id).await }).await?;
        check_status(Operation::Delete, &response)?;
        debug!("{} id={} succeeded", Operation::Delete, id);
        Ok(())
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<User>, RepositoryError> {
        let api = Arc::clone(&self.api);
        let query = query.to_string();
        let response =
            on_io(Operation::Search, async move { api.search_users(&query).await }).await?;
        list_body(Operation::Search, response)
    }
}
