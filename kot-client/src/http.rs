//! HTTP transport
//!
//! [`HttpClient`] is the seam between the typed backend API and the wire.
//! Every request reads the backend address and bearer token from the
//! [`SessionStore`] first, so a rotated token or a new address is picked
//! up by the next call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult, error_from_status};
use crate::session::SessionStore;

/// HTTP client trait
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T>;

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;

    /// Session the client reads credentials from
    fn session(&self) -> &Arc<dyn SessionStore>;
}

/// Decode a 2xx body, treating an empty body as JSON `null`
pub(crate) fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> ClientResult<T> {
    let trimmed = bytes.trim_ascii();
    let body = if trimmed.is_empty() { b"null".as_slice() } else { trimmed };
    serde_json::from_slice(body)
        .map_err(|e| ClientError::InvalidResponse(format!("JSON parse error: {e}")))
}

/// Drop the stored token when the backend rejected it
pub(crate) fn on_auth_failure(session: &dyn SessionStore, err: &ClientError) {
    if err.is_auth_failure() {
        tracing::warn!("Backend rejected the session token, invalidating it");
        if let Err(e) = session.invalidate_token() {
            tracing::error!(error = %e, "Failed to invalidate session token");
        }
    }
}

/// Network HTTP client (reqwest)
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    session: Arc<dyn SessionStore>,
}

impl NetworkHttpClient {
    /// Create a client; `timeout` of `None` keeps reqwest's default
    pub fn new(session: Arc<dyn SessionStore>, timeout: Option<Duration>) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            session,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> ClientResult<reqwest::RequestBuilder> {
        let url = format!("{}/{}", self.session.base_url()?, path.trim_start_matches('/'));
        let mut req = self.client.request(method, url);
        if let Some(token) = self.session.token()? {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> ClientResult<T> {
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = error_from_status(status, text);
            on_auth_failure(self.session.as_ref(), &err);
            return Err(err);
        }
        let bytes = response.bytes().await?;
        decode_body(&bytes)
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let req = self.request(reqwest::Method::GET, path)?;
        self.send(req).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.request(reqwest::Method::POST, path)?.json(body);
        self.send(req).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.request(reqwest::Method::PUT, path)?.json(body);
        self.send(req).await
    }

    fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }
}
