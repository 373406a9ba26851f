//! Per-session analysis context.
//!
//! The latest analysis result plus the recent conversation history, rendered
//! into every chat prompt so the advisor can reference prior results. Each
//! session owns exactly one context; sessions never observe each other.

use std::collections::VecDeque;

use serde_json::{json, Value};

use venturescope_protocol::{ChatMessage, ChatRole};

/// Bounded history: analysis entries evict beyond this depth
const MAX_ANALYSIS_HISTORY: usize = 10;
/// Chat entries evict beyond this depth
const MAX_CHAT_HISTORY: usize = 20;

#[derive(Debug, Clone)]
enum ContextEntry {
    Analysis {
        data: Value,
        timestamp: String,
    },
    Chat {
        message: String,
        response: String,
        timestamp: String,
    },
}

impl ContextEntry {
    fn to_value(&self) -> Value {
        match self {
            Self::Analysis { data, timestamp } => json!({
                "type": "analysis",
                "data": data,
                "timestamp": timestamp,
            }),
            Self::Chat {
                message,
                response,
                timestamp,
            } => json!({
                "type": "chat",
                "message": message,
                "response": response,
                "timestamp": timestamp,
            }),
        }
    }
}

/// Conversation log plus prompt context for one session
#[derive(Debug, Default)]
pub struct AnalysisContext {
    latest_analysis: Option<Value>,
    last_analysis_at: Option<String>,
    history: VecDeque<ContextEntry>,
    messages: Vec<ChatMessage>,
    next_message_id: u64,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed analysis; supersedes the previous one wholesale
    pub fn record_analysis(&mut self, data: Value, timestamp: String) {
        self.latest_analysis = Some(data.clone());
        self.last_analysis_at = Some(timestamp.clone());
        self.history.push_back(ContextEntry::Analysis { data, timestamp });
        while self.history.len() > MAX_ANALYSIS_HISTORY {
            let _ = self.history.pop_front();
        }
    }

    /// Record one chat request/response pair
    pub fn record_chat(&mut self, message: &str, response: &str, timestamp: String) {
        self.append_message(ChatRole::User, message, &timestamp);
        self.append_message(ChatRole::Assistant, response, &timestamp);
        self.history.push_back(ContextEntry::Chat {
            message: message.to_string(),
            response: response.to_string(),
            timestamp,
        });
        while self.history.len() > MAX_CHAT_HISTORY {
            let _ = self.history.pop_front();
        }
    }

    fn append_message(&mut self, role: ChatRole, content: &str, timestamp: &str) {
        self.next_message_id += 1;
        self.messages.push(ChatMessage {
            id: self.next_message_id.to_string(),
            role,
            content: content.to_string(),
            timestamp: timestamp.to_string(),
        });
    }

    /// Render the context for prompt inclusion; `None` when nothing happened yet
    pub fn render(&self) -> Option<String> {
        if self.latest_analysis.is_none() && self.history.is_empty() {
            return None;
        }

        let rendered = json!({
            "current_analysis": self.latest_analysis,
            "conversation_history": self.history.iter().map(ContextEntry::to_value).collect::<Vec<_>>(),
            "last_analysis_time": self.last_analysis_at,
        });
        serde_json::to_string_pretty(&rendered).ok()
    }

    /// Wholesale reset, used only on explicit session teardown
    pub fn clear(&mut self) {
        self.latest_analysis = None;
        self.last_analysis_at = None;
        self.history.clear();
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> String {
        "2026-08-30T12:00:00Z".to_string()
    }

    #[test]
    fn empty_context_renders_none() {
        assert!(AnalysisContext::new().render().is_none());
    }

    #[test]
    fn recorded_analysis_appears_in_render() {
        let mut ctx = AnalysisContext::new();
        ctx.record_analysis(json!({"compositeScore": 7.5}), ts());

        let rendered = ctx.render().expect("render");
        assert!(rendered.contains("compositeScore"));
        assert!(rendered.contains("7.5"));
        assert_eq!(ctx.latest_analysis.as_ref().unwrap()["compositeScore"], 7.5);
    }

    #[test]
    fn newer_analysis_supersedes_older_wholesale() {
        let mut ctx = AnalysisContext::new();
        ctx.record_analysis(json!({"compositeScore": 3.0}), ts());
        ctx.record_analysis(json!({"compositeScore": 8.0}), ts());
        assert_eq!(ctx.latest_analysis.as_ref().unwrap()["compositeScore"], 8.0);
    }

    #[test]
    fn chat_history_evicts_oldest_beyond_cap() {
        let mut ctx = AnalysisContext::new();
        for i in 0..25 {
            ctx.record_chat(&format!("q{i}"), &format!("a{i}"), ts());
        }

        let rendered = ctx.render().expect("render");
        assert!(!rendered.contains("\"q0\""));
        assert!(rendered.contains("\"q24\""));
    }

    #[test]
    fn conversation_log_ids_are_monotonic() {
        let mut ctx = AnalysisContext::new();
        ctx.record_chat("hello", "hi", ts());
        ctx.record_chat("more", "sure", ts());

        let ids: Vec<&str> = ctx.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(ctx.messages[0].role, ChatRole::User);
        assert_eq!(ctx.messages[1].role, ChatRole::Assistant);
    }

    #[test]
    fn clear_resets_everything() {
        let mut ctx = AnalysisContext::new();
        ctx.record_analysis(json!({"x": 1}), ts());
        ctx.record_chat("q", "a", ts());
        ctx.clear();
        assert!(ctx.render().is_none());
        assert!(ctx.messages.is_empty());
    }
}
