use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DispatchMode;
use crate::error::{LeadChatError, Result};
use crate::models::{MessageRequest, StreamRequest};
use crate::renderer::{EntryId, Renderer};
use crate::session::Session;
use crate::sse::{SseDecoder, StreamFrame};
use crate::transport::Transport;

/// How one user turn settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Answered {
        follow_up: Option<String>,
        show_lead_form: bool,
    },
    /// The stream carried an `error` frame, already rendered
    BackendError(String),
    /// No terminal response within `timeout_ms`; the request was dropped
    TimedOut,
    /// Network failure or non-success status
    Failed,
}

/// Sends user messages to the chat backend and renders the reply.
pub struct Dispatcher {
    tx: Arc<dyn Transport>,
    mode: DispatchMode,
    developer_context: Option<String>,
}

impl Dispatcher {
    pub fn new(tx: Arc<dyn Transport>, mode: DispatchMode, developer_context: Option<String>) -> Self {
        Self {
            tx,
            mode,
            developer_context,
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Run one turn under the session's cancellation timer. On expiry the
    /// request future is dropped, so nothing from that request reaches the
    /// renderer afterwards.
    pub async fn dispatch(
        &self,
        message: &str,
        session: &Session,
        renderer: &mut Renderer,
    ) -> DispatchOutcome {
        let typing = renderer.show_typing();
        let timeout = Duration::from_millis(session.chat.timeout_ms);

        let settled = tokio::time::timeout(timeout, self.run(message, renderer, typing)).await;

        match settled {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                tracing::warn!(session = %session.id, mode = ?self.mode, "Chat request failed: {}", e);
                renderer.remove(typing);
                renderer.add_bot_message(&session.apology_message(), &[]);
                DispatchOutcome::Failed
            }
            Err(_) => {
                tracing::warn!(
                    session = %session.id,
                    "Chat request exceeded {}ms - cancelled",
                    session.chat.timeout_ms
                );
                renderer.remove(typing);
                renderer.add_bot_message(&session.timeout_message(), &[]);
                DispatchOutcome::TimedOut
            }
        }
    }

    async fn run(
        &self,
        message: &str,
        renderer: &mut Renderer,
        typing: EntryId,
    ) -> Result<DispatchOutcome> {
        match self.mode {
            DispatchMode::SingleShot => {
                let req = MessageRequest {
                    message: message.to_string(),
                    session_id: None,
                };
                let reply = self.tx.send_message(&req).await?;
                renderer.remove(typing);
                renderer.add_bot_message(&reply.answer, &reply.sources);
                Ok(DispatchOutcome::Answered {
                    follow_up: reply.follow_up.filter(|f| !f.is_empty()),
                    show_lead_form: reply.show_lead_form,
                })
            }
            DispatchMode::Legacy => {
                let req = MessageRequest {
                    message: message.to_string(),
                    session_id: None,
                };
                let reply = self.tx.legacy_chat(&req).await?;
                renderer.remove(typing);
                renderer.add_bot_message(&reply.answer, &reply.sources);
                Ok(DispatchOutcome::Answered {
                    follow_up: None,
                    show_lead_form: false,
                })
            }
            DispatchMode::Streaming => self.run_stream(message, renderer, typing).await,
        }
    }

    async fn run_stream(
        &self,
        message: &str,
        renderer: &mut Renderer,
        typing: EntryId,
    ) -> Result<DispatchOutcome> {
        let req = StreamRequest {
            message: message.to_string(),
            session_id: None,
            developer_context: self.developer_context.clone(),
        };
        let mut body = self.tx.stream_message(&req).await?;
        let mut decoder = SseDecoder::new();
        let mut answer = StreamedAnswer::new(typing);

        while let Some(chunk) = body.next().await {
            let bytes = chunk?;
            for frame in decoder.feed(&bytes) {
                if let Some(done) = answer.apply(frame, renderer)? {
                    return Ok(done);
                }
            }
        }

        for frame in decoder.finish() {
            if let Some(done) = answer.apply(frame, renderer)? {
                return Ok(done);
            }
        }

        answer.end_of_body(renderer)
    }
}

/// Accumulates a streamed answer into one in-place bot entry.
struct StreamedAnswer {
    typing: Option<EntryId>,
    entry: Option<EntryId>,
    text: String,
}

impl StreamedAnswer {
    fn new(typing: EntryId) -> Self {
        Self {
            typing: Some(typing),
            entry: None,
            text: String::new(),
        }
    }

    /// Returns the outcome once a terminal frame arrives.
    fn apply(
        &mut self,
        frame: StreamFrame,
        renderer: &mut Renderer,
    ) -> Result<Option<DispatchOutcome>> {
        match frame {
            StreamFrame::Chunk(chunk) => {
                self.text.push_str(&chunk);
                self.show(renderer);
                Ok(None)
            }
            StreamFrame::Final { answer } => {
                if let Some(answer) = answer {
                    self.text = answer;
                }
                self.commit(renderer).map(Some)
            }
            StreamFrame::Error(error) => {
                tracing::warn!("Chat stream reported an error: {}", error);
                self.clear_typing(renderer);
                renderer.add_bot_message(&format!("⚠️ {error}"), &[]);
                Ok(Some(DispatchOutcome::BackendError(error)))
            }
        }
    }

    fn end_of_body(&mut self, renderer: &mut Renderer) -> Result<DispatchOutcome> {
        tracing::debug!("Chat stream ended without a final frame");
        self.commit(renderer)
    }

    fn commit(&mut self, renderer: &mut Renderer) -> Result<DispatchOutcome> {
        if self.text.is_empty() {
            return Err(LeadChatError::Internal(
                "chat stream ended without any answer text".to_string(),
            ));
        }
        let id = self.show(renderer);
        renderer.commit_bot_message(id);
        Ok(DispatchOutcome::Answered {
            follow_up: None,
            show_lead_form: false,
        })
    }

    fn show(&mut self, renderer: &mut Renderer) -> EntryId {
        self.clear_typing(renderer);
        let id = match self.entry {
            Some(id) => id,
            None => {
                let id = renderer.begin_bot_message();
                self.entry = Some(id);
                id
            }
        };
        renderer.update_bot_message(id, &self.text);
        id
    }

    fn clear_typing(&mut self, renderer: &mut Renderer) {
        if let Some(typing) = self.typing.take() {
            renderer.remove(typing);
        }
    }
}
