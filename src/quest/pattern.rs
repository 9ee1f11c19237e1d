//! Name filters.
//!
//! Requirement payloads name things with regular expressions ("Giant|Ogre",
//! "^Crypt"). Matching is a case-insensitive search; an empty pattern
//! matches every name. A pattern that does not compile matches nothing.

use regex::{Regex, RegexBuilder};
use tracing::warn;

pub(crate) fn compile(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(pattern, %err, "invalid name filter matches nothing");
            None
        }
    }
}

pub(crate) fn matches(pattern: &str, text: &str) -> bool {
    compile(pattern).is_some_and(|re| re.is_match(text))
}

pub(crate) fn count(pattern: &str, items: &[String]) -> usize {
    compile(pattern).map_or(0, |re| items.iter().filter(|i| re.is_match(i)).count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_search() {
        assert!(matches("giant", "Giant"));
        assert!(matches("Ogre|Giant", "Heavy Giant"));
        assert!(!matches("^Giant$", "Heavy Giant"));
        assert!(matches("", "anything"));
    }

    #[test]
    fn test_invalid_pattern_matches_nothing() {
        assert!(!matches("(unclosed", "(unclosed"));
        assert_eq!(count("[", &["[".to_string()]), 0);
    }

    #[test]
    fn test_count() {
        let log: Vec<String> = ["Giant", "Wolf", "Giant", "Heavy Troll"].map(String::from).to_vec();
        assert_eq!(count("giant", &log), 2);
        assert_eq!(count("troll|wolf", &log), 2);
    }
}
