//! Authenticated HTTP client
//!
//! Wraps every outgoing request with the stored bearer token. On a 401 the
//! client attempts exactly one token refresh and retries the original
//! request once; a failed refresh tears the session down immediately so
//! subsequent requests fail fast, and the original failure is what the
//! caller sees. No retry loops, no backoff.

use crate::session::{SessionManager, SessionStore};
use amlak_shared::types::{AuthResponse, AuthTokens, LoginRequest, PublicUser, RegisterRequest};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Client-side request failures
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid request body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No valid session; the caller should route to login
    #[error("not authenticated")]
    NotAuthenticated,
}

/// HTTP client bound to a session manager
pub struct ApiClient<S: SessionStore> {
    http: reqwest::Client,
    base_url: String,
    session: SessionManager<S>,
}

impl<S: SessionStore> ApiClient<S> {
    pub fn new(base_url: impl Into<String>, session: SessionManager<S>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    pub fn session(&self) -> &SessionManager<S> {
        &self.session
    }

    /// Login and store the resulting token pair and profile
    pub async fn login(&self, username: &str, password: &str) -> Result<PublicUser, ClientError> {
        let response = self
            .http
            .post(self.url("/api/users/login"))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let auth: AuthResponse = Self::into_json(response).await?;
        self.store_session(&auth);
        Ok(auth.user)
    }

    /// Register and store the resulting token pair and profile
    pub async fn register(&self, req: &RegisterRequest) -> Result<PublicUser, ClientError> {
        let response = self
            .http
            .post(self.url("/api/users/register"))
            .json(req)
            .send()
            .await?;

        let auth: AuthResponse = Self::into_json(response).await?;
        self.store_session(&auth);
        Ok(auth.user)
    }

    /// Clear the session unconditionally
    pub fn logout(&self) {
        self.session.logout();
    }

    /// Authenticated GET returning JSON
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send_authed(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    /// Authenticated POST with a JSON body
    pub async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        let body = serde_json::to_value(body)?;
        self.send_authed(Method::POST, path, Some(body)).await?;
        Ok(())
    }

    /// Authenticated PATCH with a JSON body
    pub async fn patch_json<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        let body = serde_json::to_value(body)?;
        self.send_authed(Method::PATCH, path, Some(body)).await?;
        Ok(())
    }

    /// Authenticated DELETE
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send_authed(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Send with the current token; on 401, refresh once and retry once.
    async fn send_authed(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, ClientError> {
        let token = self.session.token().ok_or(ClientError::NotAuthenticated)?;

        let response = self
            .build(method.clone(), path, body.as_ref(), &token)
            .send()
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check(response).await;
        }

        // One refresh attempt, then hard failure
        let original = ClientError::Api {
            status: StatusCode::UNAUTHORIZED.as_u16(),
            message: "Unauthorized".to_string(),
        };

        if self.try_refresh().await {
            if let Some(token) = self.session.token() {
                debug!("token refreshed, retrying original request");
                let retry = self.build(method, path, body.as_ref(), &token).send().await?;
                return Self::check(retry).await;
            }
        }

        self.session.logout();
        Err(original)
    }

    /// Exchange the stored refresh token for a new pair.
    /// Any failure clears the session and reports false.
    async fn try_refresh(&self) -> bool {
        let Some(refresh_token) = self.session.refresh_token() else {
            return false;
        };

        let result = self
            .http
            .post(self.url("/api/users/refresh"))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => match response.json::<AuthTokens>().await {
                Ok(tokens) => {
                    self.session.set_token(&tokens.access_token);
                    self.session.set_refresh_token(&tokens.refresh_token);
                    true
                }
                Err(e) => {
                    debug!("token refresh produced an unreadable body: {e}");
                    self.session.logout();
                    false
                }
            },
            Ok(response) => {
                debug!(status = %response.status(), "token refresh refused");
                self.session.logout();
                false
            }
            Err(e) => {
                debug!("token refresh failed: {e}");
                self.session.logout();
                false
            }
        }
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.url(path))
            .bearer_auth(token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn store_session(&self, auth: &AuthResponse) {
        self.session.set_token(&auth.tokens.access_token);
        self.session.set_refresh_token(&auth.tokens.refresh_token);
        self.session.set_user(&auth.user);
    }

    /// Surface non-success statuses as typed errors with the server's
    /// message when one is present
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| status.to_string());

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn into_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}
