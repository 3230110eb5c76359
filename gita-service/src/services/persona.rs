//! Persona prompt construction and signature normalization.

/// Token every response must end with.
pub const SIGNATURE: &str = "Lord Krishna";

/// Canonical signature line appended when the model forgets to sign.
const SIGNATURE_LINE: &str = "\n\n- Lord Krishna";

/// Build the instruction prompt for the remote model: the fixed persona
/// template followed by the literal user message.
pub fn build_prompt(user_message: &str) -> String {
    format!(
        "You are Lord Krishna from the Bhagavad Gita. Respond with wisdom and reference Gita verses when appropriate. \
         Be concise but profound, offering spiritual guidance and practical wisdom. \
         Always sign your responses as 'Lord Krishna'.\n\n\
         User question: {}",
        user_message
    )
}

/// Trim trailing whitespace and make sure the text ends with the
/// persona signature. Applying this twice produces the same result as
/// applying it once.
pub fn ensure_signature(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.ends_with(SIGNATURE) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, SIGNATURE_LINE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_user_message_verbatim() {
        let prompt = build_prompt("What is dharma?");
        assert!(prompt.ends_with("User question: What is dharma?"));
        assert!(prompt.contains("Lord Krishna"));
    }

    #[test]
    fn appends_signature_when_missing() {
        let result = ensure_signature("Act without attachment.");
        assert_eq!(result, "Act without attachment.\n\n- Lord Krishna");
    }

    #[test]
    fn trims_trailing_whitespace_before_appending() {
        let result = ensure_signature("Act without attachment.\n\n");
        assert_eq!(result, "Act without attachment.\n\n- Lord Krishna");
    }

    #[test]
    fn leaves_signed_text_unmodified() {
        let signed = "Peace comes from within.\n\n- Lord Krishna";
        assert_eq!(ensure_signature(signed), signed);
    }

    #[test]
    fn is_idempotent() {
        let once = ensure_signature("The self is eternal.");
        let twice = ensure_signature(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn accepts_inline_signature_without_dash() {
        // The check is on the token, not the canonical line, so replies
        // that sign on the same line pass through untouched.
        let signed = "Be still and know. Yours, Lord Krishna";
        assert_eq!(ensure_signature(signed), signed);
    }
}
