//! Canned-response chat echo.
//!
//! Replies are fixed templates; no model is consulted.

const EMPTY_MESSAGE_REPLY: &str = "How can I help you?";
const SUMMARY_HINT_REPLY: &str =
    "Looks like you need a summary. Paste the content of the editor here and I will summarize it.";
const SUMMARY_KEYWORDS: [&str; 2] = ["요약", "summar"];

/// Returns the canned reply for one chat message.
///
/// - blank input -> greeting prompt
/// - mentions a summary keyword -> summary hint
/// - anything else -> echo of the trimmed message
pub fn reply(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return EMPTY_MESSAGE_REPLY.to_string();
    }

    let lowered = trimmed.to_lowercase();
    if SUMMARY_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
    {
        return SUMMARY_HINT_REPLY.to_string();
    }

    format!("You wrote: \u{201c}{trimmed}\u{201d}. Shall I develop this idea further?")
}
