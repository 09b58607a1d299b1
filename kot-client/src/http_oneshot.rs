//! Oneshot HTTP client - in-memory transport
//!
//! Requires the "in-process" feature (always available to unit tests).

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Method, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use crate::error::{ClientError, ClientResult, error_from_status};
use crate::http::{HttpClient, decode_body, on_auth_failure};
use crate::session::SessionStore;

/// Oneshot HTTP client
///
/// Calls an axum `Router` directly through Tower's `oneshot`, with the
/// same authentication and response handling as the network client.
/// The session's server address is not used; the token is.
///
/// # Example
///
/// ```ignore
/// let client = OneshotHttpClient::new(router, session);
/// let settings: TaxSettings = client.get("/api/tax/tax-get-settings").await?;
/// ```
#[derive(Clone)]
pub struct OneshotHttpClient {
    router: Router,
    session: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for OneshotHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneshotHttpClient")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl OneshotHttpClient {
    pub fn new(router: Router, session: Arc<dyn SessionStore>) -> Self {
        Self { router, session }
    }

    fn build_request(&self, method: Method, path: &str, body: Body) -> ClientResult<Request<Body>> {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("/{}", path.trim_start_matches('/')))
            .header(http::header::CONTENT_TYPE, "application/json");

        if let Some(token) = self.session.token()? {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }

        builder
            .body(body)
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to build request: {e}")))
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request<Body>) -> ClientResult<T> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("Oneshot call failed: {e}")))?;

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to read body: {e}")))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body_bytes).to_string();
            let err = error_from_status(status, text);
            on_auth_failure(self.session.as_ref(), &err);
            return Err(err);
        }

        decode_body(&body_bytes)
    }

    async fn with_body<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let bytes = serde_json::to_vec(body)?;
        let request = self.build_request(method, path, Body::from(bytes))?;
        self.execute(request).await
    }
}

#[async_trait]
impl HttpClient for OneshotHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.build_request(Method::GET, path, Body::empty())?;
        self.execute(request).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.with_body(Method::POST, path, body).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.with_body(Method::PUT, path, body).await
    }

    fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }
}
