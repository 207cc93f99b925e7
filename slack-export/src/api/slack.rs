use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Params;
use crate::error::{ExportError, Result};
use crate::models::*;

pub const DEFAULT_API_URL: &str = "https://slack.com/api";

#[async_trait]
pub trait SlackApi: Send + Sync {
    async fn conversations_list(&self, params: &Params) -> Result<ChannelsPage>;
    async fn users_list(&self, params: &Params) -> Result<UsersPage>;
    async fn conversations_history(&self, params: &Params) -> Result<MessagesPage>;
    async fn conversations_replies(&self, params: &Params) -> Result<MessagesPage>;
    async fn users_info(&self, user_id: &str) -> Result<UserInfo>;
    async fn chat_post_message(&self, message: &OutgoingMessage) -> Result<PostedMessage>;
}

pub struct SlackClient {
    client: Client,
    base_url: String,
}

impl SlackClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let auth = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ExportError::InvalidToken(e.to_string()))?;
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn get<T: DeserializeOwned>(&self, method: &str, params: &Params) -> Result<T> {
        debug!("GET {} {:?}", method, params);
        let response = self
            .client
            .get(self.url(method))
            .query(params)
            .send()
            .await?;
        read_response(method, response).await
    }
}

async fn read_response<T: DeserializeOwned>(method: &str, response: Response) -> Result<T> {
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(ExportError::RateLimited {
            method: method.to_string(),
            retry_after,
        });
    }

    let response = response.error_for_status()?;
    let text = response.text().await?;
    let body: Value = serde_json::from_str(&text)
        .map_err(|e| ExportError::malformed(method, format!("invalid JSON: {}", e)))?;

    decode_response(method, body)
}

/// Checks the `ok` envelope and decodes the endpoint's payload.
pub fn decode_response<T: DeserializeOwned>(method: &str, body: Value) -> Result<T> {
    match body.get("ok").and_then(Value::as_bool) {
        Some(true) => serde_json::from_value(body)
            .map_err(|e| ExportError::malformed(method, e.to_string())),
        Some(false) => {
            let error = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error")
                .to_string();
            Err(ExportError::Api {
                method: method.to_string(),
                error,
            })
        }
        None => Err(ExportError::malformed(method, "missing ok field")),
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn conversations_list(&self, params: &Params) -> Result<ChannelsPage> {
        self.get("conversations.list", params).await
    }

    async fn users_list(&self, params: &Params) -> Result<UsersPage> {
        self.get("users.list", params).await
    }

    async fn conversations_history(&self, params: &Params) -> Result<MessagesPage> {
        self.get("conversations.history", params).await
    }

    async fn conversations_replies(&self, params: &Params) -> Result<MessagesPage> {
        self.get("conversations.replies", params).await
    }

    async fn users_info(&self, user_id: &str) -> Result<UserInfo> {
        self.get("users.info", &super::params([("user", user_id)])).await
    }

    async fn chat_post_message(&self, message: &OutgoingMessage) -> Result<PostedMessage> {
        let method = "chat.postMessage";
        debug!("POST {} channel={}", method, message.channel);
        let response = self
            .client
            .post(self.url(method))
            .json(message)
            .send()
            .await?;
        read_response(method, response).await
    }
}
