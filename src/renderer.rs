use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::history::ChatHistory;
use crate::models::Role;

pub type EntryId = u64;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    User(String),
    Bot(String),
    Typing,
    Sources(Vec<String>),
    Enquire,
    LeadForm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub at: DateTime<Utc>,
}

/// Transcript mutations published to front ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    Appended(TranscriptEntry),
    Updated(TranscriptEntry),
    Removed(EntryId),
    ScrolledTo(EntryId),
}

/// Transcript view-model plus the bounded chat history it feeds.
pub struct Renderer {
    entries: Vec<TranscriptEntry>,
    next_id: EntryId,
    scroll_anchor: Option<EntryId>,
    history: ChatHistory,
    show_sources: bool,
    events: broadcast::Sender<RenderEvent>,
}

impl Renderer {
    pub fn new(max_history: usize, show_sources: bool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Vec::new(),
            next_id: 1,
            scroll_anchor: None,
            history: ChatHistory::new(max_history),
            show_sources,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RenderEvent> {
        self.events.subscribe()
    }

    pub fn add_user_message(&mut self, text: &str) -> EntryId {
        if !text.is_empty() {
            self.history.push(Role::User, text);
        }
        self.append(EntryKind::User(text.to_string()))
    }

    /// Append a complete bot message, plus a source line when sources are
    /// shown and the backend supplied any.
    pub fn add_bot_message(&mut self, text: &str, sources: &[String]) -> EntryId {
        if !text.is_empty() {
            self.history.push(Role::Assistant, text);
        }
        let id = self.append(EntryKind::Bot(text.to_string()));
        if self.show_sources && !sources.is_empty() {
            self.append(EntryKind::Sources(sources.to_vec()));
        }
        id
    }

    pub fn show_typing(&mut self) -> EntryId {
        self.append(EntryKind::Typing)
    }

    /// Start an empty bot message that streaming updates fill in place.
    /// It reaches the history only through [`Renderer::commit_bot_message`].
    pub fn begin_bot_message(&mut self) -> EntryId {
        self.append(EntryKind::Bot(String::new()))
    }

    pub fn update_bot_message(&mut self, id: EntryId, text: &str) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        let EntryKind::Bot(current) = &mut entry.kind else {
            return false;
        };
        current.clear();
        current.push_str(text);
        let updated = entry.clone();
        self.publish(RenderEvent::Updated(updated));
        self.scroll_to_newest();
        true
    }

    pub fn commit_bot_message(&mut self, id: EntryId) {
        let text = self.entries.iter().find(|e| e.id == id).and_then(|e| match &e.kind {
            EntryKind::Bot(text) if !text.is_empty() => Some(text.clone()),
            _ => None,
        });
        if let Some(text) = text {
            self.history.push(Role::Assistant, text);
        }
    }

    pub fn add_enquire(&mut self) -> EntryId {
        self.append(EntryKind::Enquire)
    }

    pub fn add_lead_form(&mut self) -> EntryId {
        self.append(EntryKind::LeadForm)
    }

    pub fn remove(&mut self, id: EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return false;
        }
        self.publish(RenderEvent::Removed(id));
        self.scroll_to_newest();
        true
    }

    pub fn scroll_to(&mut self, id: EntryId) {
        if self.entries.iter().any(|e| e.id == id) {
            self.scroll_anchor = Some(id);
            self.publish(RenderEvent::ScrolledTo(id));
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&TranscriptEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn scroll_anchor(&self) -> Option<EntryId> {
        self.scroll_anchor
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Texts of all bot messages currently in the transcript
    pub fn bot_messages(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match &e.kind {
                EntryKind::Bot(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&EntryKind) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.kind)).count()
    }

    fn append(&mut self, kind: EntryKind) -> EntryId {
        let id = self.next_id;
        self.next_id += 1;
        let entry = TranscriptEntry {
            id,
            kind,
            at: Utc::now(),
        };
        self.entries.push(entry.clone());
        self.publish(RenderEvent::Appended(entry));
        self.scroll_to_newest();
        id
    }

    fn scroll_to_newest(&mut self) {
        if let Some(last) = self.entries.last().map(|e| e.id) {
            self.scroll_to(last);
        } else {
            self.scroll_anchor = None;
        }
    }

    fn publish(&self, event: RenderEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}
