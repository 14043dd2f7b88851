//! Transcript helpers for the generation loop.

use crate::types::*;
use std::collections::HashSet;
use tracing::debug;

/// Build the opening transcript: one system turn and one user turn.
pub fn build_messages(system_prompt: &str, user_prompt: &str) -> Vec<ChatMessage> {
    debug!(
        "Initial context: {} chars system, {} chars prompt",
        system_prompt.len(),
        user_prompt.len()
    );
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(user_prompt),
    ]
}

/// Tool calls in `transcript` that no tool turn has answered yet, in
/// request order.
pub(crate) fn unanswered_tool_calls(transcript: &[ChatMessage]) -> Vec<&ToolCall> {
    let answered: HashSet<&str> = transcript
        .iter()
        .filter_map(|m| match m {
            ChatMessage::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
            _ => None,
        })
        .collect();

    transcript
        .iter()
        .flat_map(ChatMessage::tool_calls)
        .filter(|tc| !answered.contains(tc.id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: "search".into(),
            arguments: "{}".into(),
        }
    }

    #[test]
    fn opening_transcript_is_system_then_user() {
        let messages = build_messages("sys", "task");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::system("sys"));
        assert_eq!(messages[1], ChatMessage::user("task"));
    }

    #[test]
    fn tracks_unanswered_calls() {
        let (a, b) = (call("a"), call("b"));
        let mut transcript = build_messages("s", "u");
        transcript.push(ChatMessage::Assistant {
            content: None,
            tool_calls: vec![a.clone(), b.clone()],
        });
        assert_eq!(unanswered_tool_calls(&transcript), vec![&a, &b]);

        transcript.push(ChatMessage::tool_result(&a, "1"));
        assert_eq!(unanswered_tool_calls(&transcript), vec![&b]);

        transcript.push(ChatMessage::tool_result(&b, "2"));
        assert!(unanswered_tool_calls(&transcript).is_empty());
    }
}
