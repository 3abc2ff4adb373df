/// Fixed instructions placed ahead of every user message.
pub const SYSTEM_PROMPT: &str = "You are MediVoice GH, an AI health advisor for Ghana.

Your role:
- Provide helpful, accurate health information
- Use simple language (assume Grade 8 reading level)
- Be culturally sensitive to Ghanaian context
- Recommend seeking professional medical care when appropriate
- Focus on common conditions in Ghana (Malaria, Typhoid, Cholera, etc.)

Guidelines:
- Keep responses concise (2-3 paragraphs max)
- If symptoms suggest emergency, CLEARLY state: \"EMERGENCY: Please call 112 or visit the nearest hospital immediately\"
- For serious conditions, recommend seeing a doctor
- Provide first aid advice when appropriate
- Be empathetic and supportive

Remember: You are an information tool, not a replacement for medical professionals.";

/// Appended to every generated answer, including the apology.
pub const DISCLAIMER: &str = "\n\n⚠️ **DISCLAIMER**: This is not medical advice. Please consult a qualified healthcare professional for proper diagnosis and treatment.";

/// Returned (with the disclaimer) when no provider produced an answer.
pub const APOLOGY: &str =
    "I apologize, but I'm experiencing technical difficulties. Please try again later.";

/// System instructions, then the knowledge context block if any, then the user message.
pub fn build_prompt(user_message: &str, context: &str) -> String {
    if context.trim().is_empty() {
        format!(
            "{SYSTEM_PROMPT}\n\nUSER MESSAGE:\n{user_message}\n\nProvide a helpful response:"
        )
    } else {
        format!(
            "{SYSTEM_PROMPT}\n\nMEDICAL KNOWLEDGE CONTEXT:\n{context}\n\nUSER MESSAGE:\n{user_message}\n\nProvide a helpful response based on the context above:"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_prompt("I feel dizzy", "");
        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(!prompt.contains("MEDICAL KNOWLEDGE CONTEXT"));
        assert!(prompt.ends_with("USER MESSAGE:\nI feel dizzy\n\nProvide a helpful response:"));
    }

    #[test]
    fn test_prompt_with_context() {
        let prompt = build_prompt("I feel dizzy", "[WHO]\nDrink water.");
        let ctx = prompt.find("MEDICAL KNOWLEDGE CONTEXT:\n[WHO]\nDrink water.").unwrap();
        let msg = prompt.find("USER MESSAGE:\nI feel dizzy").unwrap();
        assert!(ctx < msg);
        assert!(prompt.ends_with("based on the context above:"));
    }
}
