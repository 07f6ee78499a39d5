//! HTTP binding of [`UserApi`] over `reqwest`.
//!
//! Each trait method maps to one verb/path pair under the configured base URL.
//! Status codes are passed through untouched; only transport failures and
//! undecodable success bodies become errors.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::user::User;
use crate::gateway::{ApiResponse, GatewayError, UserApi};

// ============================================================================
// Wire Types
// ============================================================================

/// Create payload: the user object minus `id`.
#[derive(Serialize, Debug)]
struct NewUser<'a> {
    name: &'a str,
    email: &'a str,
    phone: Option<&'a str>,
}

impl<'a> From<&'a User> for NewUser<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            name: &user.name,
            email: &user.email,
            phone: user.phone.as_deref(),
        }
    }
}

// ============================================================================
// Translation Layer
// ============================================================================

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout(e.to_string())
    } else if e.is_decode() {
        GatewayError::Decode(e.to_string())
    } else {
        GatewayError::Network(e.to_string())
    }
}

/// Decodes a success body. Empty text and a literal `null` both mean "no body".
fn decode_body<T: DeserializeOwned>(text: &str) -> Result<Option<T>, GatewayError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<T>>(text).map_err(|e| GatewayError::Decode(e.to_string()))
}

// ============================================================================
// Gateway Implementation
// ============================================================================

pub struct HttpUserApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpUserApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        info!("HTTP gateway ready: base_url={}, timeout={:?}", base_url, timeout);
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends the request and decodes the body only when the status is 2xx.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, GatewayError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        debug!("{} -> {}", response.url(), status);

        if !status.is_success() {
            warn!("Users API returned {}", status);
            return Ok(ApiResponse::new(status.as_u16(), None));
        }

        let text = response.text().await.map_err(transport_error)?;
        let body = decode_body(&text)?;
        Ok(ApiResponse::new(status.as_u16(), body))
    }

    /// Sends the request and reports the status only.
    async fn send_without_body(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<()>, GatewayError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        debug!("{} -> {}", response.url(), status);
        Ok(ApiResponse::new(status.as_u16(), None))
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn list_users(&self) -> Result<ApiResponse<Vec<User>>, GatewayError> {
        self.send(self.client.get(self.url("users"))).await
    }

    async fn get_user(&self, id: u64) -> Result<ApiResponse<User>, GatewayError> {
        self.send(self.client.get(self.url(&format!("users/{id}"))))
            .await
    }

    async fn create_user(&self, user: &User) -> Result<ApiResponse<User>, GatewayError> {
        let payload = NewUser::from(user);
        self.send(self.client.post(self.url("users")).json(&payload))
            .await
    }

    async fn update_user(&self, id: u64, user: &User) -> Result<ApiResponse<User>, GatewayError> {
        self.send(self.client.put(self.url(&format!("users/{id}"))).json(user))
            .await
    }

    async fn delete_user(&self, id: u64) -> Result<ApiResponse<()>, GatewayError> {
        self.send_without_body(self.client.delete(self.url(&format!("users/{id}"))))
            .await
    }

    async fn search_users(&self, query: &str) -> Result<ApiResponse<Vec<User>>, GatewayError> {
        self.send(
            self.client
                .get(self.url("users/search"))
                .query(&[("q", query)]),
        )
        .await
    }
}
