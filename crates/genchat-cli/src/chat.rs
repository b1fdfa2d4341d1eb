//! Chat transcript kept for the current conversation.

use chrono::{DateTime, Local, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    /// Assistant message standing in for a failed generation
    pub is_error: bool,
}

impl Message {
    /// Format for terminal output: `[14:02] assistant> text`
    pub fn render(&self) -> String {
        let time = self.sent_at.with_timezone(&Local).format("%H:%M");
        let marker = if self.is_error { "!" } else { ">" };
        format!("[{}] {}{} {}", time, self.role.label(), marker, self.content)
    }
}

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &Message {
        self.push(Role::User, content.into(), false)
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> &Message {
        self.push(Role::Assistant, content.into(), false)
    }

    pub fn push_error(&mut self, content: impl Into<String>) -> &Message {
        self.push(Role::Assistant, content.into(), true)
    }

    /// Start a new chat. Ids keep increasing across clears.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, role: Role, content: String, is_error: bool) -> &Message {
        self.next_id += 1;
        self.messages.push(Message {
            id: self.next_id,
            role,
            content,
            sent_at: Utc::now(),
            is_error,
        });
        // Just pushed, so the vec is non-empty
        &self.messages[self.messages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_order_and_ids_increase() {
        let mut transcript = Transcript::new();
        transcript.push_user("hello");
        transcript.push_assistant("hi");

        let messages = transcript.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[0].id < messages[1].id);
    }

    #[test]
    fn test_clear_keeps_ids_unique() {
        let mut transcript = Transcript::new();
        let first = transcript.push_user("one").id;
        transcript.clear();
        assert!(transcript.is_empty());

        let second = transcript.push_user("two").id;
        assert!(second > first);
    }

    #[test]
    fn test_render_marks_errors() {
        let mut transcript = Transcript::new();
        let ok = transcript.push_assistant("fine").render();
        let failed = transcript.push_error("Generation failed").render();

        assert!(ok.ends_with("assistant> fine"));
        assert!(failed.ends_with("assistant! Generation failed"));
    }
}
