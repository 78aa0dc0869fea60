//! Command interpretation: recipe or topic, and what about.
//!
//! Matching is literal. Keywords are plain substring tests and prefixes are
//! plain `starts_with` tests, so `"learning rust"` loses its leading
//! `"learn"` and `"learn about makeup"` reads as a recipe request. Callers
//! rely on this staying deterministic.

use webbaby_shared::{Intent, Result, WebBabyError};

/// Any of these anywhere in the command marks it as a recipe request.
const RECIPE_KEYWORDS: &[&str] = &["cook", "recipe", "make"];

/// Leading phrases stripped from the command to find the subject.
///
/// Tried top to bottom and only the first match is stripped, so a phrase
/// must come before every shorter phrase it starts with.
const SUBJECT_PREFIXES: &[&str] = &[
    "go and learn how to cook",
    "go and learn how to make",
    "go and learn about",
    "go and learn",
    "learn how to cook",
    "learn how to make",
    "learn recipe for",
    "learn about",
    "how to cook",
    "how to make",
    "recipe for",
    "know about",
    "tell me about",
    "learn",
    // Trailing space keeps "cookie" and "makeup" intact.
    "cook ",
    "make ",
];

/// A classified command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub intent: Intent,
    /// Normalized subject, also the knowledge store key.
    pub subject: String,
}

/// Decide what `command` asks for and extract its subject.
pub fn classify(command: &str) -> Result<ParsedCommand> {
    let text = command.trim().to_lowercase();
    if text.is_empty() {
        return Err(WebBabyError::EmptyCommand);
    }

    let intent = if RECIPE_KEYWORDS.iter().any(|k| text.contains(k)) {
        Intent::Recipe
    } else {
        Intent::Topic
    };

    let subject = extract_subject(&text);
    if subject.is_empty() {
        return Err(WebBabyError::NoSubjectDetected);
    }

    Ok(ParsedCommand {
        intent,
        subject: subject.to_string(),
    })
}

/// Strip the first matching prefix, then one trailing period.
fn extract_subject(text: &str) -> &str {
    let rest = SUBJECT_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text)
        .trim();

    rest.strip_suffix('.').unwrap_or(rest).trim()
}

/// Normalize a caller-supplied topic for store lookups.
pub fn topic_key(topic: &str) -> String {
    topic.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(command: &str) -> (Intent, String) {
        let p = classify(command).expect("classify");
        (p.intent, p.subject)
    }

    #[test]
    fn multi_word_prefix_beats_shorter_one() {
        assert_eq!(parsed("learn how to cook dal"), (Intent::Recipe, "dal".into()));
        assert_eq!(
            parsed("go and learn how to cook butter chicken"),
            (Intent::Recipe, "butter chicken".into())
        );
    }

    #[test]
    fn topic_and_recipe_detection() {
        assert_eq!(
            parsed("learn about black holes"),
            (Intent::Topic, "black holes".into())
        );
        assert_eq!(
            parsed("make butter chicken"),
            (Intent::Recipe, "butter chicken".into())
        );
        assert_eq!(parsed("recipe for paneer"), (Intent::Recipe, "paneer".into()));
    }

    #[test]
    fn normalizes_case_whitespace_and_period() {
        assert_eq!(
            parsed("  Learn About The Roman Empire.  "),
            (Intent::Topic, "the roman empire".into())
        );
        // Only one trailing period goes.
        assert_eq!(parsed("learn about etc.."), (Intent::Topic, "etc.".into()));
    }

    #[test]
    fn only_first_prefix_is_stripped() {
        assert_eq!(
            parsed("learn about learn about rust"),
            (Intent::Topic, "learn about rust".into())
        );
    }

    #[test]
    fn unprefixed_command_is_its_own_subject() {
        assert_eq!(parsed("photosynthesis"), (Intent::Topic, "photosynthesis".into()));
        // Contains but does not start with a prefix: nothing stripped.
        assert_eq!(
            parsed("please learn about rust"),
            (Intent::Topic, "please learn about rust".into())
        );
    }

    #[test]
    fn prefix_match_is_not_word_aware() {
        assert_eq!(parsed("learning rust"), (Intent::Topic, "ing rust".into()));
        assert_eq!(parsed("learn about makeup").0, Intent::Recipe);
    }

    #[test]
    fn bare_verbs_need_a_following_word() {
        assert_eq!(
            parsed("cookie dough"),
            (Intent::Recipe, "cookie dough".into())
        );
        assert_eq!(parsed("makeup tips"), (Intent::Recipe, "makeup tips".into()));
        assert_eq!(parsed("cook dal"), (Intent::Recipe, "dal".into()));
    }

    #[test]
    fn empty_command_rejected() {
        assert!(matches!(classify(""), Err(WebBabyError::EmptyCommand)));
        assert!(matches!(classify("   \n\t"), Err(WebBabyError::EmptyCommand)));
    }

    #[test]
    fn bare_prefix_has_no_subject() {
        assert!(matches!(classify("learn"), Err(WebBabyError::NoSubjectDetected)));
        assert!(matches!(
            classify("learn how to cook ."),
            Err(WebBabyError::NoSubjectDetected)
        ));
    }

    #[test]
    fn topic_key_lowercases_and_trims() {
        assert_eq!(topic_key("  Butter Chicken "), "butter chicken");
    }
}
