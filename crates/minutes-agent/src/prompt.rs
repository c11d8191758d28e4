use crate::types::MinutesMode;

/// Transcripts at or below this length go to the small model.
pub const SHORT_TRANSCRIPT_CHARS: usize = 8000;

/// Build the minute-generation prompt for a transcript.
///
/// The model is asked for a single JSON object so the response can be
/// deserialized straight into [`crate::MinutesDraft`].
pub fn minutes_prompt(title: &str, transcript: &str, mode: MinutesMode) -> String {
    let register = match mode {
        MinutesMode::Concise => {
            "Keep every section brief: a one-sentence tldr, at most five \
             discussion points, at most five next steps."
        }
        MinutesMode::Detailed => {
            "Be thorough: capture every decision and open question raised, \
             and attribute points to speakers where the transcript names them."
        }
    };
    format!(
        "You are preparing minutes for the meeting \"{title}\".\n\
         {register}\n\
         \n\
         Respond with a single JSON object and nothing else, using exactly \
         these keys:\n\
         {{\n\
           \"tldr\": \"one-paragraph summary\",\n\
           \"discussion_points\": [\"...\"],\n\
           \"next_steps\": [\"...\"],\n\
           \"action_log\": \"markdown table of action | owner | due\",\n\
           \"quote\": \"one memorable verbatim quote from the transcript\"\n\
         }}\n\
         \n\
         Transcript:\n\
         ---\n\
         {transcript}\n\
         ---"
    )
}

/// Build the email-polish prompt.
pub fn email_prompt(subject: &str, draft: &str) -> String {
    format!(
        "Rewrite the email below so it is clear, professional, and concise. \
         Preserve every factual statement; fix tone, grammar, and structure \
         only.\n\
         \n\
         Respond with a single JSON object and nothing else:\n\
         {{\"subject\": \"...\", \"body\": \"...\"}}\n\
         \n\
         Subject: {subject}\n\
         Draft:\n\
         ---\n\
         {draft}\n\
         ---"
    )
}

/// Strip a Markdown code fence if the model wrapped its JSON in one.
pub fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the optional language tag on the fence line.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\r', '\n']);
    rest.strip_suffix("```").map(str::trim).unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_prompt_includes_transcript_and_title() {
        let p = minutes_prompt("Weekly S&OP", "Alice: we slipped.", MinutesMode::Concise);
        assert!(p.contains("Weekly S&OP"));
        assert!(p.contains("Alice: we slipped."));
        assert!(p.contains("\"tldr\""));
    }

    #[test]
    fn detailed_mode_changes_register() {
        let concise = minutes_prompt("m", "t", MinutesMode::Concise);
        let detailed = minutes_prompt("m", "t", MinutesMode::Detailed);
        assert_ne!(concise, detailed);
        assert!(detailed.contains("thorough"));
    }

    #[test]
    fn extract_json_passes_bare_json_through() {
        assert_eq!(extract_json(r#" {"a":1} "#), r#"{"a":1}"#);
    }

    #[test]
    fn extract_json_strips_fence_with_language_tag() {
        let raw = "```json\n{\"a\":1}\n```";
        assert_eq!(extract_json(raw), r#"{"a":1}"#);
    }

    #[test]
    fn extract_json_strips_plain_fence() {
        let raw = "```\n{\"a\":1}\n```";
        assert_eq!(extract_json(raw), r#"{"a":1}"#);
    }

    #[test]
    fn extract_json_leaves_unterminated_fence_alone() {
        let raw = "```json\n{\"a\":1}";
        assert_eq!(extract_json(raw), raw.trim());
    }
}
