//! The API client and its token-refresh protocol.
//!
//! Every request carries the stored bearer token. A 401 response triggers
//! one refresh followed by one retry of the original request. Concurrent
//! 401s share a single refresh call: the first caller performs it, later
//! callers queue on the gate and are woken with the outcome.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, Mutex};

use crate::envelope;
use crate::error::{ClientError, ClientResult};
use crate::token::{StoredTokens, TokenStore};

/// Single-flight state for the refresh protocol. `in_flight` is true
/// while a refresh call is outstanding; `waiters` holds callers queued
/// behind it.
#[derive(Default)]
struct RefreshGate {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<Result<String, ()>>>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenStore>,
    gate: Mutex<RefreshGate>,
}

/// Authenticated API client
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

/// Token fields of an auth response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl ApiClient {
    /// Create a client with a session-only token store
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_token_store(base_url, Arc::new(TokenStore::new()))
    }

    /// Create a client around an existing token store
    pub fn with_token_store(base_url: impl Into<String>, tokens: Arc<TokenStore>) -> Self {
        let base_url = base_url.into();
        Self {
            inner: Arc::new(Inner {
                http: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                tokens,
                gate: Mutex::new(RefreshGate::default()),
            }),
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Log in and store the returned token pair. `remember` controls
    /// whether the pair is persisted beyond the session.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> ClientResult<serde_json::Value> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct LoginRequest<'a> {
            email: &'a str,
            password: &'a str,
            remember_me: bool,
        }

        let response = self
            .inner
            .http
            .post(self.url("/api/auth/login"))
            .json(&LoginRequest {
                email,
                password,
                remember_me: remember,
            })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }

        let tokens: TokenResponse = envelope::decode(&body)?;
        self.inner.tokens.set(
            StoredTokens {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
            remember,
        );

        Ok(envelope::decode(&body)?)
    }

    /// Log out locally by wiping all stored credentials
    pub fn logout(&self) {
        self.inner.tokens.clear();
    }

    /// GET a JSON resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// POST a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// PUT a JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// DELETE a resource
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    /// GET a plain-text resource, such as a CSV export. Follows the same
    /// 401 refresh-and-retry protocol as the JSON verbs.
    pub async fn get_text(&self, path: &str) -> ClientResult<String> {
        let token = self.inner.tokens.access_token();
        let mut response = self
            .send(Method::GET, path, None::<&()>, token.as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let new_token = self.refreshed_access_token().await?;
            response = self
                .send(Method::GET, path, None::<&()>, Some(&new_token))
                .await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(ClientError::Unauthorized);
            }
        }

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Send a request with the current token. On 401, refresh once and
    /// retry once; a retried request never starts a second refresh.
    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<T> {
        let token = self.inner.tokens.access_token();
        let response = self
            .send(method.clone(), path, body, token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode_response(response).await;
        }

        let new_token = self.refreshed_access_token().await?;
        let retry = self.send(method, path, body, Some(&new_token)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            // Already retried; do not refresh again
            return Err(ClientError::Unauthorized);
        }
        Self::decode_response(retry).await
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> ClientResult<reqwest::Response> {
        let mut builder = self.inner.http.request(method, self.url(path));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    /// Obtain a fresh access token, sharing one refresh call among all
    /// concurrent 401s.
    async fn refreshed_access_token(&self) -> ClientResult<String> {
        let waiter = {
            let mut gate = self.inner.gate.lock().await;
            if gate.in_flight {
                let (tx, rx) = oneshot::channel();
                gate.waiters.push(tx);
                Some(rx)
            } else {
                gate.in_flight = true;
                None
            }
        };

        if let Some(rx) = waiter {
            return match rx.await {
                Ok(Ok(token)) => Ok(token),
                _ => Err(ClientError::Unauthorized),
            };
        }

        let result = self.perform_refresh().await;

        let mut gate = self.inner.gate.lock().await;
        gate.in_flight = false;
        let broadcast = match &result {
            Ok(token) => Ok(token.clone()),
            Err(_) => Err(()),
        };
        for tx in gate.waiters.drain(..) {
            let _ = tx.send(broadcast.clone());
        }

        result
    }

    /// Call the refresh endpoint with the stored refresh token. A missing
    /// token rejects immediately without a network call; an endpoint
    /// failure wipes all credentials.
    async fn perform_refresh(&self) -> ClientResult<String> {
        let refresh_token = self
            .inner
            .tokens
            .refresh_token()
            .ok_or(ClientError::MissingRefreshToken)?;

        let response = self
            .inner
            .http
            .post(self.url("/api/auth/refresh-token"))
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await;

        let outcome = async {
            let response = response?;
            let status = response.status();
            let body = response.bytes().await?;
            if !status.is_success() {
                return Err(ClientError::Unauthorized);
            }
            let tokens: TokenResponse = envelope::decode(&body)?;
            Ok(tokens)
        }
        .await;

        match outcome {
            Ok(tokens) => {
                // Rotation keeps the scope the pair was stored with, so a
                // remembered pair is rewritten on disk and never goes stale
                let remember = self.inner.tokens.is_remembered();
                let access = tokens.access_token.clone();
                self.inner.tokens.set(
                    StoredTokens {
                        access_token: tokens.access_token,
                        refresh_token: tokens.refresh_token,
                    },
                    remember,
                );
                tracing::debug!("access token refreshed");
                Ok(access)
            }
            Err(err) => {
                tracing::warn!("token refresh failed, clearing credentials");
                self.inner.tokens.clear();
                Err(err)
            }
        }
    }

    async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }
        Ok(envelope::decode(&body)?)
    }

    fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
        #[derive(Deserialize)]
        struct ErrorBody {
            error: ErrorDetail,
        }
        #[derive(Deserialize)]
        struct ErrorDetail {
            message: String,
        }

        let message = serde_json::from_slice::<ErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());

        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }
}
