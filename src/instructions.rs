/// Extract the instruction following an `@<bot_name>` mention.
///
/// The mention must be followed by whitespace and the instruction runs to the
/// end of that line. Returns `None` when there is no mention or the mention
/// carries no text.
pub fn extract_custom_instruction(bot_name: &str, user_prompt: &str) -> Option<String> {
    let tag = format!("@{bot_name}");

    for line in user_prompt.lines() {
        for (idx, _) in line.match_indices(&tag) {
            let rest = &line[idx + tag.len()..];

            // A longer mention like '@pr-auto-bot-2' is someone else.
            let mut chars = rest.chars();
            match chars.next() {
                Some(c) if c.is_whitespace() => {}
                _ => continue,
            }

            let instruction = rest.trim();
            if !instruction.is_empty() {
                return Some(instruction.to_string());
            }
        }
    }

    None
}

/// Whether the instruction contains the word 'skip' (case-insensitive, whole
/// word only, so 'skipped' does not count).
pub fn contains_skip_instruction(text: &str) -> bool {
    let lowered = text.to_lowercase();

    for (idx, _) in lowered.match_indices("skip") {
        let before_ok = lowered[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric() && c != '_');
        let after_ok = lowered[idx + "skip".len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric() && c != '_');

        if before_ok && after_ok {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_instruction_after_mention() {
        let instruction =
            extract_custom_instruction("pr-auto-bot", "@pr-auto-bot be brief, one sentence");
        assert_eq!(instruction.as_deref(), Some("be brief, one sentence"));
    }

    #[test]
    fn extracts_instruction_mid_line() {
        let instruction = extract_custom_instruction(
            "pr-auto-bot",
            "Thanks for the PR!\nHey @pr-auto-bot focus on the API changes",
        );
        assert_eq!(instruction.as_deref(), Some("focus on the API changes"));
    }

    #[test]
    fn ignores_other_bots() {
        assert_eq!(
            extract_custom_instruction("pr-auto-bot", "@pr-auto-bot-2 do something"),
            None
        );
    }

    #[test]
    fn ignores_bare_mention() {
        assert_eq!(extract_custom_instruction("pr-auto-bot", "@pr-auto-bot"), None);
        assert_eq!(extract_custom_instruction("pr-auto-bot", "@pr-auto-bot   "), None);
    }

    #[test]
    fn no_mention_means_no_instruction() {
        assert_eq!(
            extract_custom_instruction("pr-auto-bot", "just a regular PR comment"),
            None
        );
    }

    #[test]
    fn skip_is_detected_as_a_whole_word() {
        assert!(contains_skip_instruction("skip"));
        assert!(contains_skip_instruction("please Skip this one"));
        assert!(contains_skip_instruction("skip, not needed"));
        assert!(!contains_skip_instruction("the test was skipped"));
        assert!(!contains_skip_instruction("use skip_serializing here"));
    }
}
