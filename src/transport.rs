use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::Config;
use crate::error::{LeadChatError, Result};
use crate::models::{
    ChatConfig, ContactInfo, FormSchema, LeadDraft, LeadResponse, LeadSubmission, MessageRequest,
    MessageResponse, StreamRequest, ValidationResult, WelcomeMessage,
};

/// Raw body chunks of a streamed reply, in arrival order
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

/// Backend endpoints consumed by the widget
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn chat_config(&self) -> Result<ChatConfig>;
    async fn contact_info(&self) -> Result<ContactInfo>;
    async fn welcome(&self) -> Result<WelcomeMessage>;
    async fn form_schema(&self) -> Result<FormSchema>;
    async fn validate_lead(&self, draft: &LeadDraft) -> Result<ValidationResult>;
    async fn submit_lead(&self, lead: &LeadSubmission) -> Result<LeadResponse>;
    async fn send_message(&self, req: &MessageRequest) -> Result<MessageResponse>;
    async fn legacy_chat(&self, req: &MessageRequest) -> Result<MessageResponse>;
    async fn stream_message(&self, req: &StreamRequest) -> Result<ByteStream>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
    lead_endpoint: String,
    /// Per-request cap for JSON exchanges; streamed bodies are bounded by
    /// the chat timeout instead
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: &str, lead_endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().connect_timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            lead_endpoint: lead_endpoint.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            &cfg.backend.base_url,
            &cfg.backend.lead_endpoint,
            cfg.http_timeout(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn lead_url(&self, suffix: &str) -> String {
        format!("{}{}{}", self.base_url, self.lead_endpoint, suffix)
    }

    async fn get_json<T: DeserializeOwned + Send>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).timeout(self.timeout).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(LeadChatError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn chat_config(&self) -> Result<ChatConfig> {
        self.get_json(&self.url("/v1/chat-config")).await
    }

    async fn contact_info(&self) -> Result<ContactInfo> {
        self.get_json(&self.url("/v1/contact-info")).await
    }

    async fn welcome(&self) -> Result<WelcomeMessage> {
        self.get_json(&self.url("/v1/welcome")).await
    }

    async fn form_schema(&self) -> Result<FormSchema> {
        self.get_json(&self.lead_url("/form-schema")).await
    }

    async fn validate_lead(&self, draft: &LeadDraft) -> Result<ValidationResult> {
        self.post_json(&self.lead_url("/validate"), draft).await
    }

    async fn submit_lead(&self, lead: &LeadSubmission) -> Result<LeadResponse> {
        self.post_json(&self.lead_url(""), lead).await
    }

    async fn send_message(&self, req: &MessageRequest) -> Result<MessageResponse> {
        self.post_json(&self.url("/v1/message"), req).await
    }

    async fn legacy_chat(&self, req: &MessageRequest) -> Result<MessageResponse> {
        self.post_json(&self.url("/v1/chat"), req).await
    }

    async fn stream_message(&self, req: &StreamRequest) -> Result<ByteStream> {
        let url = self.url("/v1/message/stream");
        tracing::debug!("POST {} (stream)", url);
        let response = self.client.post(&url).json(req).send().await?;
        let response = check_status(response).await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(LeadChatError::from))
            .boxed())
    }
}
