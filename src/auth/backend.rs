//! HTTP client for the backend claims endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::claims::RoleClaims;
use super::error::{Error, Result};

/// Response body of `GET /api/auth/me`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeResponse {
    /// Authorization flags for the presented token. Absent means the empty
    /// claim set.
    #[serde(default)]
    pub claims: Option<RoleClaims>,
}

/// Source of role claims for a session token.
///
/// The resolver depends on this seam rather than a concrete transport, so
/// tests can script responses without a network.
#[async_trait]
pub trait ClaimsSource: Send + Sync + std::fmt::Debug {
    /// Exchange a session token for role claims.
    async fn fetch(&self, token: &str) -> Result<MeResponse>;
}

/// HTTP client for the claims endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use localserv::auth::backend::ClaimsClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ClaimsClient::new("http://localhost:8081")?;
/// let me = client.me("session-token").await?;
/// println!("{:?}", me.claims);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClaimsClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ClaimsClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the backend (e.g., "http://localhost:8081")
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchange a session token for role claims.
    pub async fn me(&self, token: &str) -> Result<MeResponse> {
        let response = self
            .http
            .get(self.url("/api/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    fn url(&self, path: &str) -> Url {
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ClaimsSource for ClaimsClient {
    async fn fetch(&self, token: &str) -> Result<MeResponse> {
        self.me(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_claims_field() {
        let me: MeResponse = serde_json::from_str(r#"{"user_id": "u1"}"#).unwrap();
        assert!(me.claims.is_none());

        let me: MeResponse = serde_json::from_str(r#"{"claims": {"provider": true}}"#).unwrap();
        assert!(me.claims.unwrap().provider);
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(ClaimsClient::new("not a url").is_err());
    }
}
