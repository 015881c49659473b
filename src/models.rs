use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chat behaviour served by `GET /v1/chat-config`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    pub timeout_ms: u64,
    pub typing_indicator_delay: u64,
    pub max_history: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 12_000,
            typing_indicator_delay: 500,
            max_history: 6,
        }
    }
}

/// Contact details used in fallback and error messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            phone: "+91-7290002168".to_string(),
            email: "info@ritzmediaworld.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub message: String,
    #[serde(default)]
    pub show_typing: bool,
    #[serde(default)]
    pub delay: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Tel,
    Email,
    Select,
    Textarea,
}

/// One lead form control as described by the backend schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Partial lead sent to `<lead>/validate`; absent fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl LeadDraft {
    /// Draft holding a single field, as sent by a blur check.
    pub fn single(field: &str, value: &str) -> Self {
        let mut draft = Self::default();
        let value = Some(value.to_string());
        match field {
            "name" => draft.name = value,
            "phone" => draft.phone = value,
            "email" => draft.email = value,
            "service" => draft.service = value,
            _ => {}
        }
        draft
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: BTreeMap::new(),
        }
    }

    pub fn failed(field: &str, message: &str) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.to_string());
        Self {
            valid: false,
            errors,
        }
    }
}

/// Completed lead posted to `<lead>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /v1/message` and the legacy `POST /v1/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub developer_context: Option<String>,
}

/// Reply from `POST /v1/message`; the legacy endpoint only fills
/// `answer` and `sources`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub follow_up: Option<String>,
    #[serde(default)]
    pub show_lead_form: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_config_ignores_unknown_fields() {
        let cfg: ChatConfig = serde_json::from_str(
            r#"{"timeout_ms": 9000, "typing_indicator_delay": 300, "enable_caching": true, "max_history": 4}"#,
        )
        .unwrap();
        assert_eq!(cfg.timeout_ms, 9000);
        assert_eq!(cfg.max_history, 4);
    }

    #[test]
    fn test_draft_omits_absent_fields() {
        let draft = LeadDraft::single("phone", "9876543210");
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json, serde_json::json!({"phone": "9876543210"}));
    }

    #[test]
    fn test_message_request_sends_null_session() {
        let req = MessageRequest {
            message: "hi".to_string(),
            session_id: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"message":"hi","session_id":null}"#);
    }

    #[test]
    fn test_field_type_uses_wire_names() {
        let field: Field = serde_json::from_str(
            r#"{"id":"service","type":"select","placeholder":"Pick one","options":["SEO"]}"#,
        )
        .unwrap();
        assert_eq!(field.field_type, FieldType::Select);
        assert_eq!(field.options.as_deref(), Some(&["SEO".to_string()][..]));
    }
}
