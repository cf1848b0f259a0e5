//! HTTP Accounts Client
//!
//! `reqwest`-based [`AccountsApi`] for the accounts REST service:
//!
//! | Operation                    | Request                                  |
//! |------------------------------|------------------------------------------|
//! | `get_accounts`               | `GET  {base}/accounts`                   |
//! | `transfer_by_account_id`     | `POST {base}/accounts/transfer` (ids)    |
//! | `transfer_by_account_number` | `POST {base}/accounts/transfer` (numbers)|
//!
//! Error responses carry `{"error": "..."}`; that text becomes the message.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AccountsApi, ApiError};
use crate::account::{AccountId, AccountList, AccountNumber};
use crate::config::ApiConfig;
use crate::transfer::TransferResult;

/// API request body for `POST /accounts/transfer`
///
/// Exactly one addressing pair (ids or numbers) is set.
#[derive(Debug, Serialize, PartialEq)]
struct TransferBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from_account_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_account_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_account_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_account_number: Option<&'a str>,
    /// Amount as string (to avoid float precision issues)
    amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Accounts API over HTTP
pub struct HttpAccountsApi {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpAccountsApi {
    /// Create a new client from config
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn post_transfer(&self, body: &TransferBody<'_>) -> Result<TransferResult, ApiError> {
        let url = self.url("/accounts/transfer");
        debug!(url = %url, amount = %body.amount, "POST transfer");

        let response = self
            .authorize(self.client.post(&url).json(body))
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("HTTP request failed: {}", e)))?;

        read_json(response).await
    }
}

/// Decode a success body, or turn an error status into [`ApiError::Rejected`]
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body.error.or(body.message).unwrap_or_default();
        warn!(status = status.as_u16(), error = %message, "Accounts service rejected request");
        return Err(ApiError::rejected(status.as_u16(), message));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl AccountsApi for HttpAccountsApi {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get_accounts(&self) -> Result<AccountList, ApiError> {
        let url = self.url("/accounts");
        debug!(url = %url, "GET accounts");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("HTTP request failed: {}", e)))?;

        read_json(response).await
    }

    async fn transfer_by_account_id(
        &self,
        source_id: &AccountId,
        destination_id: &AccountId,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<TransferResult, ApiError> {
        self.post_transfer(&TransferBody {
            from_account_id: Some(source_id.as_str()),
            to_account_id: Some(destination_id.as_str()),
            from_account_number: None,
            to_account_number: None,
            amount,
            description,
        })
        .await
    }

    async fn transfer_by_account_number(
        &self,
        source_number: &AccountNumber,
        destination_number: &AccountNumber,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<TransferResult, ApiError> {
        self.post_transfer(&TransferBody {
            from_account_id: None,
            to_account_id: None,
            from_account_number: Some(source_number.as_str()),
            to_account_number: Some(destination_number.as_str()),
            amount,
            description,
        })
        .await
    }
}
