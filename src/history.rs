use std::collections::VecDeque;

use crate::models::{ChatMessage, Role};

/// Rolling conversation history capped at `max_history` entries; the oldest
/// entry is evicted on overflow.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    entries: VecDeque<ChatMessage>,
    cap: usize,
}

impl ChatHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        if self.cap == 0 {
            return;
        }
        self.entries.push_back(ChatMessage {
            role,
            content: content.into(),
        });
        while self.entries.len() > self.cap {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seventh_push_evicts_oldest() {
        let mut history = ChatHistory::new(6);
        for i in 0..6 {
            history.push(Role::User, format!("m{i}"));
        }
        assert_eq!(history.len(), 6);

        history.push(Role::Assistant, "m6");
        assert_eq!(history.len(), 6);
        assert_eq!(history.iter().next().unwrap().content, "m1");
        assert_eq!(history.last().unwrap().content, "m6");
    }

    #[test]
    fn test_never_exceeds_cap() {
        let mut history = ChatHistory::new(3);
        for i in 0..50 {
            history.push(Role::User, i.to_string());
            assert!(history.len() <= 3);
        }
        let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["47", "48", "49"]);
    }

    #[test]
    fn test_zero_cap_keeps_nothing() {
        let mut history = ChatHistory::new(0);
        history.push(Role::User, "hi");
        assert!(history.is_empty());
    }
}
