use crate::catalog::{self, Category};

/// Classified purpose of a user utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    SubService { service: &'static str },
    ServicesList,
    PricingContact,
    General,
}

impl Intent {
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::SubService { .. } => "sub_service",
            Intent::ServicesList => "services_list",
            Intent::PricingContact => "pricing_contact",
            Intent::General => "general",
        }
    }

    /// Instant reply for intents that do not need the backend. `General`
    /// always goes to retrieval-augmented chat.
    pub fn canned_reply(&self) -> Option<CannedReply> {
        match self {
            Intent::SubService { service } => {
                let category = catalog::category_of(service)?;
                Some(CannedReply {
                    answer: category.detail().to_string(),
                    follow_up: None,
                    show_lead_form: false,
                })
            }
            Intent::ServicesList => Some(CannedReply {
                answer: catalog::SERVICES_LIST.to_string(),
                follow_up: Some(catalog::SERVICES_LIST_FOLLOW_UP.to_string()),
                show_lead_form: false,
            }),
            Intent::PricingContact => Some(CannedReply {
                answer: catalog::PRICING_REPLY.to_string(),
                follow_up: None,
                show_lead_form: true,
            }),
            Intent::General => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedReply {
    pub answer: String,
    pub follow_up: Option<String>,
    pub show_lead_form: bool,
}

/// One entry of the ordered rule table. Rules are tried top to bottom and
/// the first one that matches decides the intent.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Substring match of each key against the raw and normalized utterance
    SubServiceTable(&'static [(&'static str, Category)]),
    /// Substring match of any phrase against the raw lowercased utterance
    Phrases {
        phrases: &'static [&'static str],
        yields: Intent,
    },
    Fallback(Intent),
}

impl Rule {
    fn apply(&self, raw: &str, normalized: &str) -> Option<Intent> {
        match self {
            Rule::SubServiceTable(table) => table.iter().find_map(|(key, _)| {
                (raw.contains(key) || normalized.contains(&normalize_input(key)))
                    .then_some(Intent::SubService { service: *key })
            }),
            Rule::Phrases { phrases, yields } => {
                phrases.iter().any(|p| raw.contains(p)).then_some(*yields)
            }
            Rule::Fallback(intent) => Some(*intent),
        }
    }
}

pub const DEFAULT_RULES: &[Rule] = &[
    Rule::SubServiceTable(catalog::SUB_SERVICES),
    Rule::Phrases {
        phrases: catalog::SERVICES_LIST_PHRASES,
        yields: Intent::ServicesList,
    },
    Rule::Phrases {
        phrases: catalog::LEAD_KEYWORDS,
        yields: Intent::PricingContact,
    },
    Rule::Fallback(Intent::General),
];

pub trait IntentParser: Send + Sync {
    fn parse(&self, utterance: &str) -> Intent;
}

/// Keyword/substring classifier over a static rule table
pub struct KeywordIntent {
    rules: &'static [Rule],
}

impl KeywordIntent {
    pub fn new(rules: &'static [Rule]) -> Self {
        Self { rules }
    }
}

impl Default for KeywordIntent {
    fn default() -> Self {
        Self::new(DEFAULT_RULES)
    }
}

impl IntentParser for KeywordIntent {
    fn parse(&self, utterance: &str) -> Intent {
        let raw = utterance.to_lowercase();
        let normalized = normalize_input(utterance);

        let intent = self
            .rules
            .iter()
            .find_map(|rule| rule.apply(&raw, &normalized))
            .unwrap_or(Intent::General);

        tracing::debug!(intent = intent.kind(), "Classified utterance: {}", utterance);
        intent
    }
}

/// Lowercase, turn `, . - _ /` into spaces and collapse whitespace.
pub fn normalize_input(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ',' | '.' | '-' | '_' | '/' => ' ',
            other => other,
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
