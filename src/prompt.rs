//! System prompt construction for the insight agent.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// The system prompt plus the conversation it was built for.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltPrompt {
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
}

/// Content of the most recent `user` message, or `""`.
pub fn last_user_message(messages: &[ChatMessage]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

/// Wrap retrieved `context` in the insight agent's instructions.
pub fn system_prompt(context: &str) -> String {
    format!(
        r#"You are "Liquid Staking Insight Agent", an assistant specialized in analysing liquid staking data across every chain, not only Ethereum.

## CONTEXT (base every answer on this data)
{context}

## INSTRUCTIONS
When answering:
1. Use **only the data in the context** and keep figures accurate.
2. Compare options on:
   - 📈 **APY** (annual percentage yield)
   - 💰 **TVL** (total value locked)
   - 🛡️ **Stability** and protocol reputation
3. Prefer **bullet points**, **bold** emphasis and emojis for readability.
4. Do not use tables; compare items with bullet lists.
5. If asked about history beyond what the context holds, answer:
   > "Historical data beyond the current context is not available."
6. 💡 Interpret the numbers: point out what is notable, rising or risky.
   🧠 Suggest at least one strategy or next step.
7. When several pools or protocols qualify, rank them by yield and risk and
   label each Conservative, Balanced or Aggressive.

## FORMATTING GUIDELINES
- Organize answers with ## and ### headings.
- Bold important metrics, protocols and actions.
- Use ✅ 📈 🛡️ 💰 🔍 ⚠️ where they help.
- Keep answers short, actionable and easy to scan.
- For complex answers, finish with:

### 🔑 Key Takeaways
- Two or three critical insights or actions, as simple bullets.

Never speculate beyond the available data. You are an insight agent, not a data reader: add value through strategy, options and context-aware analysis.
"#
    )
}

/// Assemble the prompt for `messages` given the context retrieved for
/// their last user message.
pub fn build(messages: Vec<ChatMessage>, context: &str) -> BuiltPrompt {
    BuiltPrompt {
        system_prompt: system_prompt(context),
        messages,
    }
}
