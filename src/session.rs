use uuid::Uuid;

use crate::lead::fallback_schema;
use crate::models::{ChatConfig, ContactInfo, FormSchema};
use crate::transport::Transport;

/// Per-visit state. Created once when the widget starts and never shared
/// between sessions.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub chat: ChatConfig,
    pub contact: ContactInfo,
    pub schema: FormSchema,
    lead_shown: bool,
}

impl Session {
    /// Fetch the remote settings and open a session. Never fails: every
    /// endpoint that cannot be loaded falls back to its built-in default.
    pub async fn start(tx: &dyn Transport) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(session = %id, "Loading chat configuration");

        let chat = match tx.chat_config().await {
            Ok(cfg) if cfg.timeout_ms > 0 => cfg,
            Ok(cfg) => {
                tracing::warn!("Backend sent timeout_ms=0 - using default chat config");
                ChatConfig {
                    timeout_ms: ChatConfig::default().timeout_ms,
                    ..cfg
                }
            }
            Err(e) => {
                tracing::warn!("Chat config load failed: {} - using defaults", e);
                ChatConfig::default()
            }
        };

        let contact = tx.contact_info().await.unwrap_or_else(|e| {
            tracing::warn!("Contact info load failed: {} - using defaults", e);
            ContactInfo::default()
        });

        let schema = tx.form_schema().await.unwrap_or_else(|e| {
            tracing::warn!("Form schema load failed: {} - using fallback schema", e);
            FormSchema::default()
        });

        let session = Self::with_settings(chat, contact, schema);
        Self { id, ..session }
    }

    pub fn with_settings(chat: ChatConfig, contact: ContactInfo, schema: FormSchema) -> Self {
        let schema = if schema.fields.is_empty() {
            fallback_schema()
        } else {
            schema
        };
        Self {
            id: Uuid::new_v4(),
            chat,
            contact,
            schema,
            lead_shown: false,
        }
    }

    pub fn lead_shown(&self) -> bool {
        self.lead_shown
    }

    pub fn mark_lead_shown(&mut self) {
        self.lead_shown = true;
    }

    pub fn timeout_message(&self) -> String {
        format!(
            "⏳ Taking longer than usual. Try asking about a specific service like 'Digital Marketing' \
             for an instant answer, or contact us directly:\n📞 {}",
            self.contact.phone
        )
    }

    pub fn apology_message(&self) -> String {
        format!(
            "⚠️ Something went wrong. Please try again or contact us:\n📞 {}\n📧 {}",
            self.contact.phone, self.contact.email
        )
    }
}
