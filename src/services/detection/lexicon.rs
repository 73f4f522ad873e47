// Lexicon tables
// Phrase and word lists consumed by the feature extractor

use std::collections::HashSet;

/// Boilerplate phrasing common in generated prose. Matched as case-insensitive substrings.
pub const GENERIC_PHRASES: &[&str] = &[
    "in conclusion",
    "plays a crucial role",
    "plays a vital role",
    "plays a key role",
    "moreover",
    "furthermore",
    "it is important to note",
    "it is worth noting",
    "in today's world",
    "in today's fast-paced",
    "in the realm of",
    "a wide range of",
    "delve into",
    "serves as a testament",
    "in summary",
    "overall,",
    "ever-evolving",
    "navigate the complexities",
];

/// Connective words; each distinct word counts once per sentence.
pub const TRANSITION_WORDS: &[&str] = &[
    "however",
    "moreover",
    "furthermore",
    "additionally",
    "therefore",
    "consequently",
    "thus",
    "hence",
    "nevertheless",
    "meanwhile",
    "overall",
    "ultimately",
];

/// Word tables injected into feature extraction.
#[derive(Debug, Clone)]
pub struct Lexicon {
    generic_phrases: Vec<String>,
    transition_words: HashSet<String>,
}

impl Lexicon {
    pub fn new<P, T>(generic_phrases: P, transition_words: T) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        Self {
            generic_phrases: generic_phrases
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            transition_words: transition_words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn contains_generic_phrase(&self, sentence: &str) -> bool {
        let lower = sentence.to_lowercase();
        self.generic_phrases.iter().any(|p| lower.contains(p.as_str()))
    }

    /// Number of distinct transition words among `tokens`.
    pub fn distinct_transitions(&self, tokens: &[String]) -> usize {
        tokens
            .iter()
            .filter(|t| self.transition_words.contains(t.as_str()))
            .collect::<HashSet<_>>()
            .len()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(GENERIC_PHRASES, TRANSITION_WORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_generic_phrase_is_case_insensitive() {
        let lex = Lexicon::default();
        assert!(lex.contains_generic_phrase("IN CONCLUSION, we won."));
        assert!(lex.contains_generic_phrase("Water plays a crucial role here."));
        assert!(!lex.contains_generic_phrase("The cat sat on the mat."));
    }

    #[test]
    fn test_transitions_count_distinct_words() {
        let lex = Lexicon::default();
        assert_eq!(lex.distinct_transitions(&toks(&["however", "however", "thus"])), 2);
        assert_eq!(lex.distinct_transitions(&toks(&["cat", "mat"])), 0);
    }

    #[test]
    fn test_custom_tables() {
        let lex = Lexicon::new(["Lorem Ipsum"], ["Anyway"]);
        assert!(lex.contains_generic_phrase("lorem ipsum dolor"));
        assert_eq!(lex.distinct_transitions(&toks(&["anyway"])), 1);
        assert!(!lex.contains_generic_phrase("moreover"));
    }
}
