//! HTTP client for a remote Nim engine.

use super::api::{RemoteEngine, RemoveParams, WireGameState, WireInitialPiles, WireMove};
use crate::config::ClientConfig;
use crate::error::NetworkError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// [`RemoteEngine`] over plain HTTP + JSON.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    /// Base URL of the engine, without trailing slash.
    base_url: String,
    /// HTTP client.
    client: reqwest::Client,
}

impl HttpEngine {
    /// Creates a client for the engine at `base_url`.
    ///
    /// With a `timeout`, any request running longer fails as a
    /// [`NetworkError`].
    #[instrument(skip_all, fields(base_url = %base_url.as_ref()))]
    pub fn new(
        base_url: impl AsRef<str>,
        timeout: Option<Duration>,
    ) -> Result<Self, NetworkError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let base_url = base_url.as_ref().trim_end_matches('/').to_string();
        info!(base_url = %base_url, ?timeout, "Created engine client");
        Ok(Self { base_url, client })
    }

    /// Creates a client from loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, NetworkError> {
        Self::new(
            config.server_url(),
            config.request_timeout_ms().map(Duration::from_millis),
        )
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Checks the status and decodes the JSON body.
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
    ) -> Result<T, NetworkError> {
        let status = response.status();
        debug!(operation, status = %status, "Engine responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(operation, status = %status, body = %body, "Engine returned failure status");
            return Err(NetworkError::new(format!(
                "{} failed: HTTP {} - {}",
                operation, status, body
            )));
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            error!(operation, error = %e, body = %body, "Failed to decode engine response");
            NetworkError::new(format!(
                "{} returned an invalid body ({}): {}",
                operation, e, body
            ))
        })
    }
}

#[async_trait]
impl RemoteEngine for HttpEngine {
    #[instrument(skip(self))]
    async fn start(&self, piles: &[u64]) -> Result<bool, NetworkError> {
        let response = self.client.post(self.url("/start")).json(piles).send().await?;
        Self::decode(response, "start").await
    }

    #[instrument(skip(self))]
    async fn game_state(&self) -> Result<WireGameState, NetworkError> {
        let response = self.client.get(self.url("/get_game_state")).send().await?;
        Self::decode(response, "get_game_state").await
    }

    #[instrument(skip(self))]
    async fn remove(
        &self,
        pile_index: usize,
        number_to_remove: u64,
    ) -> Result<bool, NetworkError> {
        let params = RemoveParams {
            pile_index: i64::try_from(pile_index)
                .map_err(|_| NetworkError::new("pile index does not fit the wire format"))?,
            number_to_remove: i64::try_from(number_to_remove)
                .map_err(|_| NetworkError::new("count does not fit the wire format"))?,
        };
        let response = self
            .client
            .post(self.url("/remove"))
            .query(&params)
            .send()
            .await?;
        Self::decode(response, "remove").await
    }

    #[instrument(skip(self))]
    async fn find_optimal_move(&self) -> Result<Option<WireMove>, NetworkError> {
        let response = self.client.get(self.url("/find_optimal_move")).send().await?;
        Self::decode(response, "find_optimal_move").await
    }

    #[instrument(skip(self))]
    async fn undo_move(&self) -> Result<bool, NetworkError> {
        let response = self.client.post(self.url("/undo_move")).send().await?;
        Self::decode(response, "undo_move").await
    }

    #[instrument(skip(self))]
    async fn initial_piles(&self) -> Result<WireInitialPiles, NetworkError> {
        let response = self
            .client
            .get(self.url("/get_initial_piles_for_restart"))
            .send()
            .await?;
        Self::decode(response, "get_initial_piles_for_restart").await
    }
}
