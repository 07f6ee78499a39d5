//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::core::user::User;
use crate::gateway::{ApiResponse, GatewayError, UserApi};

/// An in-memory gateway that answers every call with the same scripted outcome.
///
/// `users` answers the list-shaped calls, `user` the entity-shaped ones.
/// When gated, each call waits for [`StubApi::release`] before answering.
pub struct StubApi {
    status: u16,
    users: Option<Vec<User>>,
    user: Option<User>,
    failure: Option<GatewayError>,
    gate: Option<Notify>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl StubApi {
    pub fn ok(status: u16) -> Self {
        Self {
            status,
            users: None,
            user: None,
            failure: None,
            gate: None,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: GatewayError) -> Self {
        Self {
            failure: Some(error),
            ..Self::ok(0)
        }
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        Self {
            users: Some(users),
            ..self
        }
    }

    pub fn with_user(self, user: User) -> Self {
        Self {
            user: Some(user),
            ..self
        }
    }

    pub fn gated(self) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..self
        }
    }

    /// Lets one gated call through.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Number of calls that reached the stub.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of calls that produced an outcome.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    async fn answer<T>(&self, body: Option<T>) -> Result<ApiResponse<T>, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(ApiResponse::new(self.status, body)),
        }
    }
}

#[async_trait]
impl UserApi for StubApi {
    async fn list_users(&self) -> Result<ApiResponse<Vec<User>>, GatewayError> {
        self.answer(self.users.clone()).await
    }

    async fn get_user(&self, _id: u64) -> Result<ApiResponse<User>, GatewayError> {
        self.answer(self.user.clone()).await
    }

    async fn create_user(&self, _user: &User) -> Result<ApiResponse<User>, GatewayError> {
        self.answer(self.user.clone()).await
    }

    async fn update_user(&self, _id: u64, _user: &User) -> Result<ApiResponse<User>, GatewayError> {
        self.answer(self.user.clone()).await
    }

    async fn delete_user(&self, _id: u64) -> Result<ApiResponse<()>, GatewayError> {
        self.answer(self.users.as_ref().map(|_| ())).await
    }

    async fn search_users(&self, _query: &str) -> Result<ApiResponse<Vec<User>>, GatewayError> {
        self.answer(self.users.clone()).await
    }
}

/// Builds a user with the given id, name and a derived email.
pub fn user(id: u64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: None,
    }
}

/// Three users with ids 1..=3.
pub fn sample_users() -> Vec<User> {
    vec![user(1, "Ada"), user(2, "Brian"), user(3, "Carol")]
}
