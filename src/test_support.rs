//! Scripted backend shared by the dispatcher, lead and widget tests.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Mutex;

use crate::error::{LeadChatError, Result};
use crate::models::{
    ChatConfig, ContactInfo, FormSchema, LeadDraft, LeadResponse, LeadSubmission, MessageRequest,
    MessageResponse, StreamRequest, ValidationResult, WelcomeMessage,
};
use crate::transport::{ByteStream, Transport};

/// What a scripted endpoint does when called
#[derive(Clone)]
pub enum Reply<T> {
    Ok(T),
    /// Answer with a 500
    Fail,
    /// Transport-level failure (connection refused and the like)
    Unreachable,
    /// Never answer
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Fail => Err(LeadChatError::Status {
                status: 500,
                body: "Internal Server Error".to_string(),
            }),
            Reply::Unreachable => Err(LeadChatError::Internal("connection refused".to_string())),
            Reply::Hang => futures::future::pending().await,
        }
    }
}

/// Body of a scripted stream: read chunks, then either end or stall
#[derive(Clone)]
pub struct StreamScript {
    pub chunks: Vec<Vec<u8>>,
    pub then_hang: bool,
}

impl StreamScript {
    pub fn of(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.as_bytes().to_vec()).collect(),
            then_hang: false,
        }
    }

    pub fn hanging(chunks: &[&str]) -> Self {
        Self {
            then_hang: true,
            ..Self::of(chunks)
        }
    }
}

pub struct ScriptedTransport {
    pub chat: Reply<ChatConfig>,
    pub contact: Reply<ContactInfo>,
    pub welcome: Reply<WelcomeMessage>,
    pub schema: Reply<FormSchema>,
    pub message: Reply<MessageResponse>,
    pub legacy: Reply<MessageResponse>,
    pub stream: Reply<StreamScript>,
    pub submit: Reply<LeadResponse>,
    pub validator: Option<fn(&LeadDraft) -> ValidationResult>,
    pub calls: Mutex<Vec<String>>,
    pub drafts: Mutex<Vec<LeadDraft>>,
    pub submissions: Mutex<Vec<LeadSubmission>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self {
            chat: Reply::Fail,
            contact: Reply::Fail,
            welcome: Reply::Fail,
            schema: Reply::Fail,
            message: Reply::Fail,
            legacy: Reply::Fail,
            stream: Reply::Fail,
            submit: Reply::Fail,
            validator: None,
            calls: Mutex::new(Vec::new()),
            drafts: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedTransport {
    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn chat_config(&self) -> Result<ChatConfig> {
        self.record("chat_config");
        self.chat.resolve().await
    }

    async fn contact_info(&self) -> Result<ContactInfo> {
        self.record("contact_info");
        self.contact.resolve().await
    }

    async fn welcome(&self) -> Result<WelcomeMessage> {
        self.record("welcome");
        self.welcome.resolve().await
    }

    async fn form_schema(&self) -> Result<FormSchema> {
        self.record("form_schema");
        self.schema.resolve().await
    }

    async fn validate_lead(&self, draft: &LeadDraft) -> Result<ValidationResult> {
        self.record("validate_lead");
        self.drafts.lock().unwrap().push(draft.clone());
        match self.validator {
            Some(check) => Ok(check(draft)),
            None => Err(LeadChatError::Internal("validation unavailable".to_string())),
        }
    }

    async fn submit_lead(&self, lead: &LeadSubmission) -> Result<LeadResponse> {
        self.record("submit_lead");
        self.submissions.lock().unwrap().push(lead.clone());
        self.submit.resolve().await
    }

    async fn send_message(&self, req: &MessageRequest) -> Result<MessageResponse> {
        self.record(&format!("send_message:{}", req.message));
        self.message.resolve().await
    }

    async fn legacy_chat(&self, req: &MessageRequest) -> Result<MessageResponse> {
        self.record(&format!("legacy_chat:{}", req.message));
        self.legacy.resolve().await
    }

    async fn stream_message(&self, req: &StreamRequest) -> Result<ByteStream> {
        self.record(&format!("stream_message:{}", req.message));
        let script = self.stream.resolve().await?;
        let body = futures::stream::iter(script.chunks.into_iter().map(Ok));
        if script.then_hang {
            Ok(body.chain(futures::stream::pending()).boxed())
        } else {
            Ok(body.boxed())
        }
    }
}
