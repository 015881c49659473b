pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod history;
pub mod intent;
pub mod lead;
pub mod models;
pub mod renderer;
pub mod session;
pub mod sse;
pub mod transport;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::catalog::{DEFAULT_WELCOME, DEFAULT_WELCOME_DELAY_MS};
use crate::config::{Config, ValidationStrategy};
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::Result;
use crate::intent::{Intent, IntentParser, KeywordIntent};
use crate::lead::{BackendValidator, LeadForm, LeadValidator, OpenOutcome, RegexValidator, SubmitOutcome};
use crate::renderer::{RenderEvent, Renderer};
use crate::session::Session;
use crate::transport::Transport;

/// Result of one user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub intent: Intent,
    /// Answered from the local catalog without touching the backend
    pub local: bool,
    pub outcome: DispatchOutcome,
}

/// One visitor's chat: session, transcript, dispatcher and lead form.
pub struct ChatWidget {
    session: Session,
    renderer: Renderer,
    dispatcher: Dispatcher,
    parser: KeywordIntent,
    lead: LeadForm,
    tx: Arc<dyn Transport>,
    local_intents: bool,
}

impl ChatWidget {
    /// Load the remote settings and open a new session.
    pub async fn start(cfg: &Config, tx: Arc<dyn Transport>) -> Result<Self> {
        let session = Session::start(tx.as_ref()).await;
        Self::with_session(cfg, tx, session)
    }

    pub fn with_session(cfg: &Config, tx: Arc<dyn Transport>, session: Session) -> Result<Self> {
        let validator: Box<dyn LeadValidator> = match cfg.widget.validation {
            ValidationStrategy::Backend => Box::new(BackendValidator::new(Arc::clone(&tx))),
            ValidationStrategy::Regex => Box::new(RegexValidator::new()?),
        };

        let renderer = Renderer::new(session.chat.max_history, cfg.widget.show_sources);
        let lead = LeadForm::new(&session.schema, validator, Arc::clone(&tx));
        let dispatcher = Dispatcher::new(
            Arc::clone(&tx),
            cfg.widget.dispatch_mode,
            cfg.widget.developer_context.clone(),
        );

        tracing::info!(
            session = %session.id,
            mode = ?cfg.widget.dispatch_mode,
            validation = ?cfg.widget.validation,
            "Chat widget ready"
        );

        Ok(Self {
            session,
            renderer,
            dispatcher,
            parser: KeywordIntent::default(),
            lead,
            tx,
            local_intents: cfg.widget.local_intents,
        })
    }

    /// Greet the visitor, behind a typing indicator when asked to.
    pub async fn welcome(&mut self) {
        let (message, delay) = match self.tx.welcome().await {
            Ok(w) if !w.message.trim().is_empty() => {
                let delay = w.show_typing.then(|| {
                    w.delay
                        .unwrap_or(self.session.chat.typing_indicator_delay)
                });
                (w.message, delay)
            }
            Ok(_) => (DEFAULT_WELCOME.to_string(), Some(DEFAULT_WELCOME_DELAY_MS)),
            Err(e) => {
                tracing::warn!("Welcome message load failed: {} - using default", e);
                (DEFAULT_WELCOME.to_string(), Some(DEFAULT_WELCOME_DELAY_MS))
            }
        };

        if let Some(ms) = delay {
            let typing = self.renderer.show_typing();
            tokio::time::sleep(Duration::from_millis(ms)).await;
            self.renderer.remove(typing);
        }
        self.renderer.add_bot_message(&message, &[]);
    }

    /// Handle one line of user input. Blank input is ignored.
    pub async fn send(&mut self, input: &str) -> Option<Turn> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        self.renderer.add_user_message(text);
        let intent = self.parser.parse(text);

        let canned = intent.canned_reply().filter(|_| self.local_intents);
        let local = canned.is_some();
        let outcome = match canned {
            Some(reply) => {
                tracing::info!(session = %self.session.id, intent = intent.kind(), "Answered locally");
                self.renderer.add_bot_message(&reply.answer, &[]);
                DispatchOutcome::Answered {
                    follow_up: reply.follow_up,
                    show_lead_form: reply.show_lead_form,
                }
            }
            None => {
                self.dispatcher
                    .dispatch(text, &self.session, &mut self.renderer)
                    .await
            }
        };

        if let DispatchOutcome::Answered {
            follow_up,
            show_lead_form,
        } = &outcome
        {
            if let Some(follow_up) = follow_up {
                let delay = Duration::from_millis(self.session.chat.typing_indicator_delay);
                tokio::time::sleep(delay).await;
                self.renderer.add_bot_message(follow_up, &[]);
            }
            if *show_lead_form || intent == Intent::PricingContact {
                self.offer_enquiry();
            }
        }

        Some(Turn {
            intent,
            local,
            outcome,
        })
    }

    /// Surface the Enquire action, once per session.
    fn offer_enquiry(&mut self) {
        if self.session.lead_shown() {
            return;
        }
        self.renderer.add_enquire();
        self.session.mark_lead_shown();
    }

    /// Open the lead form, or scroll to it if it is already open.
    pub fn enquire(&mut self) -> OpenOutcome {
        self.session.mark_lead_shown();
        self.lead.open(&mut self.renderer)
    }

    pub fn set_lead_value(&mut self, field: &str, value: &str) -> bool {
        self.lead.set_value(field, value)
    }

    pub async fn blur_lead_field(&mut self, field: &str) -> Option<String> {
        self.lead.blur(field).await
    }

    pub async fn submit_lead(&mut self) -> SubmitOutcome {
        self.lead.submit(&mut self.renderer).await
    }

    pub fn cancel_lead(&mut self) {
        self.lead.close(&mut self.renderer);
    }

    pub fn lead_form(&self) -> &LeadForm {
        &self.lead
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RenderEvent> {
        self.renderer.subscribe()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PRICING_REPLY, SERVICES_LIST, SERVICES_LIST_FOLLOW_UP};
    use crate::config::DispatchMode;
    use crate::lead::{LeadState, THANK_YOU};
    use crate::models::{
        ChatConfig, ContactInfo, FormSchema, LeadResponse, MessageResponse, WelcomeMessage,
    };
    use crate::renderer::EntryKind;
    use crate::test_support::{Reply, ScriptedTransport, StreamScript};
    use tokio::time::Instant;

    fn config(mode: DispatchMode) -> Config {
        let mut cfg = Config::default();
        cfg.widget.dispatch_mode = mode;
        cfg
    }

    fn widget(cfg: &Config, tx: ScriptedTransport) -> (Arc<ScriptedTransport>, ChatWidget) {
        let tx = Arc::new(tx);
        let session = Session::with_settings(
            ChatConfig::default(),
            ContactInfo::default(),
            FormSchema::default(),
        );
        let widget = ChatWidget::with_session(cfg, tx.clone(), session).unwrap();
        (tx, widget)
    }

    fn enquire_entries(w: &ChatWidget) -> usize {
        w.renderer().count(|k| matches!(k, EntryKind::Enquire))
    }

    fn backend_calls(tx: &ScriptedTransport) -> usize {
        tx.calls()
            .iter()
            .filter(|c| c.starts_with("send_message") || c.starts_with("stream_message"))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_loads_session_and_greets() {
        let tx: Arc<dyn Transport> = Arc::new(ScriptedTransport {
            chat: Reply::Ok(ChatConfig {
                timeout_ms: 5000,
                typing_indicator_delay: 100,
                max_history: 2,
            }),
            welcome: Reply::Ok(WelcomeMessage {
                message: "Hi there".to_string(),
                show_typing: true,
                delay: None,
            }),
            ..Default::default()
        });
        let mut w = ChatWidget::start(&Config::default(), tx).await.unwrap();
        assert_eq!(w.session().chat.max_history, 2);
        assert_eq!(w.session().contact, ContactInfo::default());

        let started = Instant::now();
        w.welcome().await;
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert_eq!(w.renderer().bot_messages(), vec!["Hi there"]);
        assert_eq!(w.renderer().count(|k| matches!(k, EntryKind::Typing)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_welcome_falls_back_to_default() {
        let (_, mut w) = widget(&Config::default(), ScriptedTransport::default());
        let started = Instant::now();
        w.welcome().await;
        assert!(started.elapsed() >= Duration::from_millis(DEFAULT_WELCOME_DELAY_MS));
        assert_eq!(w.renderer().bot_messages(), vec![DEFAULT_WELCOME]);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let (tx, mut w) = widget(&Config::default(), ScriptedTransport::default());
        assert!(w.send("   ").await.is_none());
        assert!(w.renderer().entries().is_empty());
        assert!(tx.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_services_list_answered_locally() {
        let (tx, mut w) = widget(&Config::default(), ScriptedTransport::default());
        let turn = w.send("What do you offer?").await.unwrap();

        assert_eq!(turn.intent, Intent::ServicesList);
        assert!(turn.local);
        assert_eq!(
            w.renderer().bot_messages(),
            vec![SERVICES_LIST, SERVICES_LIST_FOLLOW_UP]
        );
        assert_eq!(backend_calls(&tx), 0);
        assert_eq!(enquire_entries(&w), 0);
    }

    #[tokio::test]
    async fn test_sub_service_answered_with_detail() {
        let (tx, mut w) = widget(&Config::default(), ScriptedTransport::default());
        let turn = w.send("Need a website").await.unwrap();

        assert_eq!(turn.intent, Intent::SubService { service: "web" });
        let messages = w.renderer().bot_messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Web Development"));
        assert_eq!(backend_calls(&tx), 0);
    }

    #[tokio::test]
    async fn test_pricing_offers_enquiry_once() {
        let (_, mut w) = widget(&Config::default(), ScriptedTransport::default());

        w.send("What is your pricing?").await.unwrap();
        assert_eq!(w.renderer().bot_messages(), vec![PRICING_REPLY]);
        assert_eq!(enquire_entries(&w), 1);
        assert!(w.session().lead_shown());

        w.send("Can I get a quote?").await.unwrap();
        assert_eq!(enquire_entries(&w), 1);
    }

    #[tokio::test]
    async fn test_general_question_streams_from_backend() {
        let (tx, mut w) = widget(
            &config(DispatchMode::Streaming),
            ScriptedTransport {
                stream: Reply::Ok(StreamScript::of(&[
                    "data: {\"chunk\":\"We are \"}\n",
                    "data: {\"chunk\":\"a Delhi agency\"}\ndata: {\"final\":true}\n",
                ])),
                ..Default::default()
            },
        );
        let turn = w.send("Hello").await.unwrap();

        assert_eq!(turn.intent, Intent::General);
        assert!(!turn.local);
        assert_eq!(w.renderer().bot_messages(), vec!["We are a Delhi agency"]);
        assert_eq!(tx.calls(), vec!["stream_message:Hello"]);
        assert_eq!(w.renderer().history().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_follow_up_and_lead_signal() {
        let (_, mut w) = widget(
            &config(DispatchMode::SingleShot),
            ScriptedTransport {
                message: Reply::Ok(MessageResponse {
                    answer: "We run campaigns.".to_string(),
                    sources: vec![],
                    follow_up: Some("Want a proposal?".to_string()),
                    show_lead_form: true,
                }),
                ..Default::default()
            },
        );

        let started = Instant::now();
        w.send("Hello").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(
            w.renderer().bot_messages(),
            vec!["We run campaigns.", "Want a proposal?"]
        );
        assert_eq!(enquire_entries(&w), 1);
    }

    #[tokio::test]
    async fn test_local_intents_disabled_goes_to_backend() {
        let mut cfg = config(DispatchMode::SingleShot);
        cfg.widget.local_intents = false;
        let (tx, mut w) = widget(
            &cfg,
            ScriptedTransport {
                message: Reply::Ok(MessageResponse {
                    answer: "SEO starts with an audit.".to_string(),
                    sources: vec![],
                    follow_up: None,
                    show_lead_form: false,
                }),
                ..Default::default()
            },
        );

        let turn = w.send("Tell me about SEO").await.unwrap();
        assert_eq!(turn.intent, Intent::SubService { service: "seo" });
        assert!(!turn.local);
        assert_eq!(tx.calls(), vec!["send_message:Tell me about SEO"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_turn_does_not_offer_enquiry() {
        let mut cfg = config(DispatchMode::SingleShot);
        cfg.widget.local_intents = false;
        let (_, mut w) = widget(&cfg, ScriptedTransport::default());

        let turn = w.send("What is your pricing?").await.unwrap();
        assert_eq!(turn.outcome, DispatchOutcome::Failed);
        assert_eq!(enquire_entries(&w), 0);
        assert!(!w.session().lead_shown());
    }

    #[tokio::test]
    async fn test_enquire_then_submit_lead() {
        let mut cfg = Config::default();
        cfg.widget.validation = ValidationStrategy::Regex;
        let (tx, mut w) = widget(
            &cfg,
            ScriptedTransport {
                submit: Reply::Ok(LeadResponse {
                    success: true,
                    message: None,
                }),
                ..Default::default()
            },
        );

        assert!(matches!(w.enquire(), OpenOutcome::Created(_)));
        assert!(matches!(w.enquire(), OpenOutcome::Existing(_)));
        assert!(w.session().lead_shown());

        w.set_lead_value("name", "Jo3");
        assert!(w.blur_lead_field("name").await.is_some());

        w.set_lead_value("name", "Jo Smith");
        w.set_lead_value("phone", "9876543210");
        w.set_lead_value("email", "a@b.com");
        w.set_lead_value("service", "Web Development");
        assert_eq!(w.submit_lead().await, SubmitOutcome::Submitted);

        assert_eq!(w.lead_form().state(), LeadState::Closed);
        assert_eq!(w.renderer().bot_messages(), vec![THANK_YOU]);
        assert_eq!(tx.submissions.lock().unwrap().len(), 1);
        // validation ran locally
        assert!(tx.drafts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_lead_removes_form() {
        let (_, mut w) = widget(&Config::default(), ScriptedTransport::default());
        w.enquire();
        w.set_lead_value("name", "Jo Smith");
        w.cancel_lead();
        assert_eq!(w.renderer().count(|k| matches!(k, EntryKind::LeadForm)), 0);
        assert_eq!(w.lead_form().value("name"), "");
    }

    #[tokio::test]
    async fn test_subscribers_see_transcript_events() {
        let (_, mut w) = widget(&Config::default(), ScriptedTransport::default());
        let mut events = w.subscribe();
        w.send("What is your pricing?").await.unwrap();

        let mut appended = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let RenderEvent::Appended(entry) = event {
                appended.push(entry.kind);
            }
        }
        assert_eq!(
            appended,
            vec![
                EntryKind::User("What is your pricing?".to_string()),
                EntryKind::Bot(PRICING_REPLY.to_string()),
                EntryKind::Enquire,
            ]
        );
    }
}
