//! Grounding instruction construction.
//!
//! The system instruction is rebuilt from the profile on every call, so a
//! knowledge base replacement applies to the very next message.

use sitebot_core::types::ChatbotProfile;

/// Phrase the model is told to use when the knowledge base has no answer.
pub const KNOWLEDGE_BASE_MISS_REPLY: &str =
    "I'm sorry, I don't have information on that topic. Is there anything else I can help with?";

/// Header preceding the knowledge base text.
pub const KNOWLEDGE_BASE_HEADER: &str = "KNOWLEDGE BASE:";

/// Fence delimiting the knowledge base text.
pub const KNOWLEDGE_BASE_FENCE: &str = "---";

/// Build the system instruction that grounds the model in the profile's knowledge base.
///
/// The knowledge base is embedded verbatim between fences; it is never
/// trimmed or truncated.
pub fn build_system_instruction(profile: &ChatbotProfile) -> String {
    let mut instruction = String::with_capacity(profile.knowledge_base.len() + 768);

    instruction.push_str(&format!(
        "You are a helpful and friendly customer support assistant for the business named \"{}\".\n",
        profile.name
    ));
    instruction.push_str(
        "Answer the user's questions using ONLY the information in the knowledge base below.\n",
    );
    instruction.push_str(
        "Do not use outside information or your general knowledge, even if you know the answer.\n",
    );
    instruction.push_str(&format!(
        "If the knowledge base does not cover the question, reply exactly: \"{}\"\n",
        KNOWLEDGE_BASE_MISS_REPLY
    ));
    instruction.push_str("Keep answers concise and relevant to the user's question.\n");

    if let Some(website) = profile.website.as_deref().filter(|w| !w.trim().is_empty()) {
        instruction.push_str(&format!(
            "The business's website is {}. You may mention it when it is relevant.\n",
            website
        ));
    }

    instruction.push('\n');
    instruction.push_str(KNOWLEDGE_BASE_HEADER);
    instruction.push('\n');
    instruction.push_str(KNOWLEDGE_BASE_FENCE);
    instruction.push('\n');
    instruction.push_str(&profile.knowledge_base);
    instruction.push('\n');
    instruction.push_str(KNOWLEDGE_BASE_FENCE);
    instruction.push('\n');

    instruction
}
