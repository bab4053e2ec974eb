// Shared prompt fragments used by more than one pipeline stage.
// Each stage keeps its own templates in generation/prompts.rs.

/// Shown verbatim whenever a request is judged off-task.
pub const CONFIDENTIALITY_MESSAGE: &str = "\
It looks like you may be trying to complete a task this tool has not been tuned to handle yet. \
We hold every tool we ship to a strict quality bar, and this one is built for a specific set of \
hiring tasks so that its results stay reliable.

If you have questions about how the app works or which tasks it supports, please reach out to \
the team that provided it.";

/// Appended to every drafting system prompt.
pub const FINAL_OUTPUT_ONLY: &str = "\
# ADDITIONAL NOTE #
After the three self-check lines, provide only the final output described in the # RESPONSE # \
section. Do not include any chain-of-thought, steps, or internal reasoning.";

/// Returns true when the model answered with the confidentiality message instead of content.
pub fn is_confidentiality_reply(text: &str) -> bool {
    text.trim().trim_matches('"').trim() == CONFIDENTIALITY_MESSAGE.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidentiality_reply_detection_ignores_quotes_and_whitespace() {
        let quoted = format!("\n\"{CONFIDENTIALITY_MESSAGE}\"  ");
        assert!(is_confidentiality_reply(&quoted));
        assert!(!is_confidentiality_reply("**About Us**\nWe build bridges."));
    }
}
