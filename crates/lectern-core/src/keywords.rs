//! Keyword extraction for free-text questions.
//!
//! [`extract`] turns a natural-language question into search terms: tokenize,
//! drop stop-words and very short tokens, then widen each survivor with light
//! morphological variants via [`expand_term`].
//!
//! The suffix stripping is a deliberate heuristic, not a linguistic stemmer.
//! It occasionally produces wrong truncations; that is an accepted
//! precision/recall trade-off and the exact rules must stay stable so that
//! fallback search behavior is reproducible.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Question words, articles, common prepositions, and generic fillers that
/// carry no search signal.
static STOP_WORDS: &[&str] = &[
    "what", "who", "when", "where", "why", "how", "is", "are", "was", "were",
    "do", "does", "did", "can", "could", "would", "should", "the", "a", "an",
    "in", "on", "at", "to", "for", "of", "with", "by", "from", "about",
    "anyone", "someone", "something", "anything", "explain", "describe",
];

/// Token pattern: word characters, with internal hyphens kept so compounds
/// like `q-learning` survive as a single term.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9_]+(?:-[a-z0-9_]+)*").expect("valid token regex"));

static STOP_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Minimum token length kept after stop-word removal.
const MIN_TOKEN_LEN: usize = 3;

/// Minimum stem length a suffix strip must leave behind.
const MIN_STEM_LEN: usize = 5;

/// Extract distinct lowercase search terms from a question, in order of
/// first occurrence, with morphological variants appended after each source
/// term.
pub fn extract(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    let mut terms = Vec::new();

    for token in TOKEN_RE.find_iter(&lowered) {
        let token = token.as_str();
        if token.len() < MIN_TOKEN_LEN || STOP_SET.contains(token) {
            continue;
        }
        for variant in expand_term(token) {
            if seen.insert(variant.clone()) {
                terms.push(variant);
            }
        }
    }

    terms
}

/// Produce a term plus its heuristic inflection variants.
///
/// Rules (first match wins, the original term always comes first, stems
/// shorter than [`MIN_STEM_LEN`] are not emitted):
/// - trailing `ing` → stripped stem (`managing` → `manag`)
/// - trailing `ies` → stem + `y` (`libraries` → `library`)
/// - trailing `ed` → stripped stem (`greeted` → `greet`)
pub fn expand_term(term: &str) -> Vec<String> {
    let mut variants = vec![term.to_string()];

    if let Some(stem) = term.strip_suffix("ing") {
        if stem.len() >= MIN_STEM_LEN {
            variants.push(stem.to_string());
        }
    } else if let Some(stem) = term.strip_suffix("ies") {
        if stem.len() + 1 >= MIN_STEM_LEN {
            variants.push(format!("{stem}y"));
        }
    } else if let Some(stem) = term.strip_suffix("ed") {
        if stem.len() >= MIN_STEM_LEN {
            variants.push(stem.to_string());
        }
    }

    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn drops_stop_words_and_short_tokens() {
        let terms = extract("What is the TD error in RL?");
        assert!(!terms.contains(&"what".to_string()));
        assert!(!terms.contains(&"the".to_string()));
        // "td" and "rl" are below the length floor
        assert!(!terms.contains(&"td".to_string()));
        assert!(terms.contains(&"error".to_string()));
    }

    #[test]
    fn keeps_hyphenated_compounds() {
        let terms = extract("What does Q-learning use?");
        assert_eq!(terms[0], "q-learning");
        assert!(terms.contains(&"use".to_string()));
    }

    #[test]
    fn expands_ing_suffix() {
        assert_eq!(expand_term("managing"), vec!["managing", "manag"]);
        // stem too short, no variant
        assert_eq!(expand_term("singing"), vec!["singing"]);
    }

    #[test]
    fn expands_ies_suffix() {
        assert_eq!(expand_term("libraries"), vec!["libraries", "library"]);
        assert_eq!(expand_term("ties"), vec!["ties"]);
    }

    #[test]
    fn expands_ed_suffix() {
        assert_eq!(expand_term("greeted"), vec!["greeted", "greet"]);
        assert_eq!(expand_term("red"), vec!["red"]);
    }

    #[test]
    fn preserves_first_seen_order_and_dedupes() {
        let terms = extract("greeting greeting greeted");
        assert_eq!(terms, vec!["greeting", "greet", "greeted"]);
    }

    #[test]
    fn empty_question_yields_no_terms() {
        assert!(extract("").is_empty());
        assert!(extract("what is the a an").is_empty());
    }

    #[test]
    fn extraction_is_idempotent_on_output() {
        let first = extract("Who explained managing exploration strategies in lectures?");
        let again = extract(&first.join(" "));
        for term in &again {
            assert!(
                first.contains(term),
                "re-extraction produced new term {term:?}"
            );
        }
    }

    proptest! {
        #[test]
        fn terms_are_lowercase_and_distinct(text in "\\PC{0,80}") {
            let terms = extract(&text);
            let mut seen = std::collections::HashSet::new();
            for term in &terms {
                let lowered = term.to_lowercase();
                prop_assert_eq!(term.as_str(), lowered.as_str());
                prop_assert!(seen.insert(term.clone()));
            }
        }

        #[test]
        fn stop_words_never_survive_and_re_extraction_adds_nothing(
            words in proptest::collection::vec(
                proptest::sample::select(vec![
                    "what", "the", "about", "policy", "gradient", "managing",
                    "rewards", "exploration", "q-learning", "from", "value",
                ]),
                0..12,
            )
        ) {
            let text = words.join(" ");
            let first = extract(&text);
            for term in &first {
                prop_assert!(
                    !STOP_SET.contains(term.as_str()),
                    "stop word {term:?} survived extraction"
                );
            }
            let again = extract(&first.join(" "));
            for term in &again {
                prop_assert!(first.contains(term), "new term {term:?} after re-extraction");
            }
        }
    }
}
