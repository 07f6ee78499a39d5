use std::fmt;

use async_trait::async_trait;

use crate::core::user::User;

/// Errors raised before a well-formed response exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The HTTP client could not be built (bad base URL, TLS backend, ...).
    Config(String),
    /// Network-level failure (DNS, connection refused, reset).
    Network(String),
    /// The request did not complete within the configured timeout.
    Timeout(String),
    /// The response body could not be decoded into the expected shape.
    Decode(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Config(msg) => write!(f, "config error: {msg}"),
            GatewayError::Network(msg) => write!(f, "network error: {msg}"),
            GatewayError::Timeout(msg) => write!(f, "timeout: {msg}"),
            GatewayError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// A response as the server sent it: status code plus an optional decoded body.
/// No interpretation happens here; the repository decides what a status means.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub body: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, body: Option<T>) -> Self {
        Self { status, body }
    }

    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The remote `users` resource.
///
/// | call           | verb   | path                |
/// |----------------|--------|---------------------|
/// | `list_users`   | GET    | `users`             |
/// | `get_user`     | GET    | `users/{id}`        |
/// | `create_user`  | POST   | `users`             |
/// | `update_user`  | PUT    | `users/{id}`        |
/// | `delete_user`  | DELETE | `users/{id}`        |
/// | `search_users` | GET    | `users/search?q=`   |
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self) -> Result<ApiResponse<Vec<User>>, GatewayError>;

    async fn get_user(&self, id: u64) -> Result<ApiResponse<User>, GatewayError>;

    /// The `id` of `user` is not sent; the server assigns one.
    async fn create_user(&self, user: &User) -> Result<ApiResponse<User>, GatewayError>;

    async fn update_user(&self, id: u64, user: &User) -> Result<ApiResponse<User>, GatewayError>;

    async fn delete_user(&self, id: u64) -> Result<ApiResponse<()>, GatewayError>;

    async fn search_users(&self, query: &str) -> Result<ApiResponse<Vec<User>>, GatewayError>;
}
