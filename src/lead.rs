use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::Category;
use crate::error::{LeadChatError, Result};
use crate::models::{
    Field, FieldType, FormSchema, LeadDraft, LeadResponse, LeadSubmission, ValidationResult,
};
use crate::renderer::{EntryId, Renderer};
use crate::transport::Transport;

pub const FORM_TITLE: &str = "Share your details";
pub const THANK_YOU: &str = "✅ Thanks! Our team will reach out soon 🙂";
pub const SUBMISSION_FAILED: &str = "Submission failed";
pub const NETWORK_ERROR: &str = "Network error — please try again.";
pub const VALIDATION_FAILED: &str = "Validation failed";

/// Local schema used when the backend serves none
pub fn fallback_schema() -> FormSchema {
    let field = |id: &str, field_type, placeholder: &str| Field {
        id: id.to_string(),
        field_type,
        placeholder: placeholder.to_string(),
        options: None,
    };
    FormSchema {
        fields: vec![
            field("name", FieldType::Text, "Your Name"),
            field("phone", FieldType::Tel, "Phone Number"),
            field("email", FieldType::Email, "Email Address"),
            Field {
                options: Some(Category::ALL.iter().map(|c| c.label().to_string()).collect()),
                ..field("service", FieldType::Select, "Select Service")
            },
            field("message", FieldType::Textarea, "Your Message (optional)"),
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Input(FieldType),
    /// Options are preceded by an empty-valued placeholder option
    Select {
        placeholder_option: String,
        options: Vec<String>,
    },
    TextArea,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub id: String,
    pub placeholder: String,
    pub control: Control,
    pub required: bool,
    /// Checked when the control loses focus
    pub validate_on_blur: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub title: String,
    pub fields: Vec<FieldView>,
}

impl FormView {
    pub fn field(&self, id: &str) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// Build the form view-model for a schema. An empty schema renders the
/// fallback form.
pub fn render_form(schema: &FormSchema) -> FormView {
    let fallback;
    let schema = if schema.fields.is_empty() {
        fallback = fallback_schema();
        &fallback
    } else {
        schema
    };

    let fields = schema
        .fields
        .iter()
        .map(|field| {
            let control = match field.field_type {
                FieldType::Select => Control::Select {
                    placeholder_option: field.placeholder.clone(),
                    options: field.options.clone().unwrap_or_default(),
                },
                FieldType::Textarea => Control::TextArea,
                other => Control::Input(other),
            };
            let required = field.id != "message";
            FieldView {
                id: field.id.clone(),
                placeholder: field.placeholder.clone(),
                control,
                required,
                validate_on_blur: required,
            }
        })
        .collect();

    FormView {
        title: FORM_TITLE.to_string(),
        fields,
    }
}

#[async_trait]
pub trait LeadValidator: Send + Sync {
    async fn validate_field(&self, field: &str, value: &str) -> ValidationResult;
    async fn validate_all(&self, draft: &LeadDraft) -> ValidationResult;
}

/// Delegates every check to `<lead>/validate`
pub struct BackendValidator {
    tx: Arc<dyn Transport>,
}

impl BackendValidator {
    pub fn new(tx: Arc<dyn Transport>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl LeadValidator for BackendValidator {
    async fn validate_field(&self, field: &str, value: &str) -> ValidationResult {
        match self.tx.validate_lead(&LeadDraft::single(field, value)).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Field validation for '{}' failed: {}", field, e);
                ValidationResult::failed("general", VALIDATION_FAILED)
            }
        }
    }

    async fn validate_all(&self, draft: &LeadDraft) -> ValidationResult {
        self.tx.validate_lead(draft).await.unwrap_or_else(|e| {
            tracing::warn!("Lead validation failed: {}", e);
            ValidationResult::failed("general", VALIDATION_FAILED)
        })
    }
}

/// Local rules: name of at least 3 letters (letters and spaces only), phone
/// of exactly 10 digits, a plausible email, and a chosen service.
pub struct RegexValidator {
    name: Regex,
    phone: Regex,
    email: Regex,
}

impl RegexValidator {
    pub fn new() -> Result<Self> {
        let compile =
            |pattern: &str| Regex::new(pattern).map_err(|e| LeadChatError::Internal(e.to_string()));
        Ok(Self {
            name: compile(r"^[A-Za-z ]+$")?,
            phone: compile(r"^\d{10}$")?,
            email: compile(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")?,
        })
    }

    fn check(&self, field: &str, value: &str) -> Option<&'static str> {
        let value = value.trim();
        match field {
            "name" => {
                let letters = value.chars().filter(|c| c.is_ascii_alphabetic()).count();
                (!self.name.is_match(value) || letters < 3)
                    .then_some("Name must be at least 3 letters and contain only alphabets")
            }
            "phone" => (!self.phone.is_match(value)).then_some("Phone number must be exactly 10 digits"),
            "email" => (!self.email.is_match(value)).then_some("Please enter a valid email address"),
            "service" => value.is_empty().then_some("Please select a service"),
            _ => None,
        }
    }
}

#[async_trait]
impl LeadValidator for RegexValidator {
    async fn validate_field(&self, field: &str, value: &str) -> ValidationResult {
        match self.check(field, value) {
            Some(message) => ValidationResult::failed(field, message),
            None => ValidationResult::ok(),
        }
    }

    async fn validate_all(&self, draft: &LeadDraft) -> ValidationResult {
        let values = [
            ("name", &draft.name),
            ("phone", &draft.phone),
            ("email", &draft.email),
            ("service", &draft.service),
        ];
        let errors: BTreeMap<String, String> = values
            .iter()
            .filter_map(|(field, value)| {
                let value = value.as_deref().unwrap_or("");
                self.check(field, value)
                    .map(|message| (field.to_string(), message.to_string()))
            })
            .collect();
        ValidationResult {
            valid: errors.is_empty(),
            errors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadState {
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Created(EntryId),
    /// Already open; the transcript scrolled to it instead
    Existing(EntryId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// Validation rejected the form; carries the message shown inline
    Invalid(String),
    /// The lead endpoint refused the lead
    Rejected(String),
    NetworkError,
    NotOpen,
}

/// Holds the form in `Submitting` while the POST is awaited and puts it back
/// to `Open` when dropped, including when the submit future itself is dropped.
struct SubmittingGuard<'a> {
    state: &'a mut LeadState,
}

impl<'a> SubmittingGuard<'a> {
    fn enter(state: &'a mut LeadState) -> Self {
        *state = LeadState::Submitting;
        Self { state }
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        *self.state = LeadState::Open;
    }
}

/// Inline lead form: `Closed → Open → Submitting → Closed | Open(error)`
pub struct LeadForm {
    view: FormView,
    values: BTreeMap<String, String>,
    field_errors: BTreeMap<String, String>,
    error: Option<String>,
    state: LeadState,
    entry: Option<EntryId>,
    validator: Box<dyn LeadValidator>,
    tx: Arc<dyn Transport>,
}

impl LeadForm {
    pub fn new(schema: &FormSchema, validator: Box<dyn LeadValidator>, tx: Arc<dyn Transport>) -> Self {
        Self {
            view: render_form(schema),
            values: BTreeMap::new(),
            field_errors: BTreeMap::new(),
            error: None,
            state: LeadState::Closed,
            entry: None,
            validator,
            tx,
        }
    }

    pub fn view(&self) -> &FormView {
        &self.view
    }

    pub fn state(&self) -> LeadState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Open the form, or scroll to it when it is already open.
    pub fn open(&mut self, renderer: &mut Renderer) -> OpenOutcome {
        if let (Some(entry), LeadState::Open | LeadState::Submitting) = (self.entry, self.state) {
            renderer.scroll_to(entry);
            return OpenOutcome::Existing(entry);
        }
        let entry = renderer.add_lead_form();
        self.entry = Some(entry);
        self.state = LeadState::Open;
        self.error = None;
        tracing::info!("Lead form opened");
        OpenOutcome::Created(entry)
    }

    /// Cancel: drop the form and whatever was typed into it.
    pub fn close(&mut self, renderer: &mut Renderer) {
        if let Some(entry) = self.entry.take() {
            renderer.remove(entry);
        }
        self.state = LeadState::Closed;
        self.values.clear();
        self.field_errors.clear();
        self.error = None;
    }

    pub fn set_value(&mut self, field: &str, value: &str) -> bool {
        if self.view.field(field).is_none() {
            return false;
        }
        self.values.insert(field.to_string(), value.to_string());
        true
    }

    /// Lose-focus check for one field. Returns the inline error, if any.
    pub async fn blur(&mut self, field: &str) -> Option<String> {
        let checked = self.view.field(field).is_some_and(|f| f.validate_on_blur);
        let value = self.value(field).trim().to_string();
        if !checked || value.is_empty() {
            return None;
        }

        let result = self.validator.validate_field(field, &value).await;
        if result.valid {
            self.field_errors.remove(field);
            return None;
        }
        // errors may be keyed by another name, e.g. `general`
        match result
            .errors
            .get(field)
            .or_else(|| result.errors.values().next())
        {
            Some(message) => {
                self.field_errors.insert(field.to_string(), message.clone());
                self.error = Some(message.clone());
                Some(message.clone())
            }
            None => {
                self.field_errors.remove(field);
                None
            }
        }
    }

    pub async fn submit(&mut self, renderer: &mut Renderer) -> SubmitOutcome {
        if self.state != LeadState::Open {
            return SubmitOutcome::NotOpen;
        }

        let draft = self.draft();
        let validation = self.validator.validate_all(&draft).await;
        if !validation.valid {
            let message = self
                .first_error(&validation)
                .unwrap_or_else(|| "Please check the form".to_string());
            self.field_errors = validation.errors;
            self.error = Some(message.clone());
            return SubmitOutcome::Invalid(message);
        }
        self.field_errors.clear();
        self.error = None;

        let lead = LeadSubmission {
            name: self.value("name").trim().to_string(),
            phone: self.value("phone").trim().to_string(),
            email: self.value("email").trim().to_string(),
            service: self.value("service").to_string(),
            message: self.value("message").trim().to_string(),
        };

        let response = {
            let _submitting = SubmittingGuard::enter(&mut self.state);
            self.tx.submit_lead(&lead).await
        };
        let outcome = match response {
            Ok(LeadResponse { success: true, .. }) => {
                tracing::info!("Lead submitted");
                self.close(renderer);
                renderer.add_bot_message(THANK_YOU, &[]);
                return SubmitOutcome::Submitted;
            }
            Ok(LeadResponse { message, .. }) => {
                SubmitOutcome::Rejected(message.unwrap_or_else(|| SUBMISSION_FAILED.to_string()))
            }
            Err(LeadChatError::Status { status, body }) => {
                tracing::warn!("Lead endpoint returned {}", status);
                let message = serde_json::from_str::<LeadResponse>(&body)
                    .ok()
                    .and_then(|r| r.message)
                    .unwrap_or_else(|| SUBMISSION_FAILED.to_string());
                SubmitOutcome::Rejected(message)
            }
            Err(e) => {
                tracing::warn!("Lead submission failed: {}", e);
                SubmitOutcome::NetworkError
            }
        };

        self.error = Some(match &outcome {
            SubmitOutcome::Rejected(message) => message.clone(),
            _ => NETWORK_ERROR.to_string(),
        });
        outcome
    }

    fn draft(&self) -> LeadDraft {
        let get = |field: &str| {
            let value = self.value(field).trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        LeadDraft {
            name: get("name"),
            phone: get("phone"),
            email: get("email"),
            service: get("service"),
        }
    }

    /// First error in form order, then any other (e.g. `general`).
    fn first_error(&self, validation: &ValidationResult) -> Option<String> {
        self.view
            .fields
            .iter()
            .find_map(|f| validation.errors.get(&f.id))
            .or_else(|| validation.errors.values().next())
            .cloned()
    }
}
