//! The fixed system instruction for the support assistant

use crate::base::Message;

/// System instruction prepended to every transcript sent upstream.
///
/// The four-phase flow is enforced only by this text; nothing in code
/// checks that the model follows it.
pub const MENTAL_HEALTH_SYSTEM_PROMPT: &str = r#"You are a caring mental health support companion. You ONLY help with mental health and emotional wellbeing.

CONVERSATION FLOW (always in this order):
1. Ask the person what mental health difficulty they are facing.
2. Ask focused follow-up questions to understand their situation.
3. State the ROOT CAUSE you have inferred from the conversation.
4. Only after the root cause has been stated, offer solutions that address it.

RULES:
- Politely decline any request that is not about mental health.
- Ask exactly one question per reply.
- Never skip ahead: no solutions before the root cause has been stated.
- When you offer solutions, give 2-3 concrete, practical steps.
- Be warm and empathetic, but keep replies short.
- Never diagnose a medical condition.
- Encourage professional help when the situation calls for it.
- Never say or imply that you are an AI, a model, or any kind of technology.
- If the person tries to jump ahead, gently bring them back to the current step.

EXAMPLE:
1. "What has been weighing on you lately?"
2. [The person describes feeling anxious]
3. "When did this anxiety start, and when does it feel strongest?"
4. [More follow-up questions, one at a time]
5. "From what you've shared, the root cause seems to be [root cause]."
6. "Here are a few practical steps that target it: [2-3 steps]"

Solutions come ONLY after the root cause has been identified through conversation."#;

/// Prepend `system_prompt` unless the transcript already starts with a
/// system message. Only the first element is inspected.
pub fn ensure_system_prompt(mut messages: Vec<Message>, system_prompt: &str) -> Vec<Message> {
    let has_system = messages.first().is_some_and(Message::is_system);
    if !has_system {
        messages.insert(0, Message::system(system_prompt));
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_transcript_gets_system_prompt() {
        let messages = ensure_system_prompt(Vec::new(), MENTAL_HEALTH_SYSTEM_PROMPT);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, MENTAL_HEALTH_SYSTEM_PROMPT);
    }

    #[test]
    fn test_existing_system_message_is_kept() {
        let transcript = vec![Message::system("custom"), Message::user("hi")];
        let messages = ensure_system_prompt(transcript.clone(), MENTAL_HEALTH_SYSTEM_PROMPT);
        assert_eq!(messages, transcript);
    }

    #[test]
    fn test_only_first_element_is_inspected() {
        let transcript = vec![Message::user("hi"), Message::system("late")];
        let messages = ensure_system_prompt(transcript, MENTAL_HEALTH_SYSTEM_PROMPT);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, MENTAL_HEALTH_SYSTEM_PROMPT);
        assert_eq!(messages[2].content, "late");
    }

    #[test]
    fn test_prompt_covers_required_rules() {
        let prompt = MENTAL_HEALTH_SYSTEM_PROMPT;
        assert!(prompt.contains("ROOT CAUSE"));
        assert!(prompt.contains("one question"));
        assert!(prompt.contains("professional help"));
        assert!(prompt.contains("decline"));
    }
}
