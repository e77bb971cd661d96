//! Title normalization
//!
//! Turns a raw headline into the token sequence every other component works
//! on. Pure: the output depends only on the input string and the optional
//! term mapping.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{NoExpand, Regex};
use tracing::warn;

use crate::stopwords::is_stopword;

/// Whole-word substitutions applied before cleaning, in insertion order
pub type TermMapping = IndexMap<String, String>;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-'\s.]").expect("static pattern"));
static DIGITS_UNDERSCORE_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d_*]").expect("static pattern"));
static LOOSE_HYPHEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s+)-(\s+|$)").expect("static pattern"));
static PERIODS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.+").expect("static pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

/// Normalize a title into tokens with stopwords removed
///
/// An empty input yields a single empty token (`[""]`); callers that
/// vectorize the result must drop it themselves.
pub fn normalize(text: &str, term_mapping: Option<&TermMapping>) -> Vec<String> {
    let mapped = match term_mapping {
        Some(mapping) if !mapping.is_empty() => apply_term_mapping(text, mapping),
        _ => text.to_string(),
    };

    clean_text(&mapped)
        .split(' ')
        .filter(|token| !is_stopword(token))
        .map(str::to_string)
        .collect()
}

/// Lowercase and strip everything that can't be part of a word
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = text
        .to_lowercase()
        .replace("<i>", "")
        .replace("</i>", "")
        .replace("<\\i>", "");

    let text = NON_WORD.replace_all(&text, "");
    let text = DIGITS_UNDERSCORE_STAR.replace_all(&text, "");
    let text = LOOSE_HYPHEN.replace_all(&text, "");
    // A run of periods usually ends a sentence fragment
    let text = PERIODS.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    // More than one apostrophe is noise rather than a contraction
    if text.matches('\'').count() > 1 {
        text.replace('\'', "")
    } else {
        text.to_string()
    }
}

fn apply_term_mapping(text: &str, mapping: &TermMapping) -> String {
    let mut output = text.to_string();
    for (term, replacement) in mapping {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
        match Regex::new(&pattern) {
            Ok(re) => output = re.replace_all(&output, NoExpand(replacement)).into_owned(),
            Err(e) => warn!("Skipping term mapping '{}': {}", term, e),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASES: &[(&str, &[&str])] = &[
        ("Limbic is a package.", &["limbic", "package"]),
        ("a random number 111", &["random", "number"]),
        (
            "something I didn't expected to test with l'huillier.",
            &["didnt", "expected", "test", "lhuillier"],
        ),
        ("l'huillier is a last name a will not change.", &["l'huillier", "change"]),
        ("didn't will be removed (stopword).", &["removed", "stopword"]),
        ("", &[""]),
    ];

    #[test]
    fn test_normalize_known_cases() {
        for (input, expected) in CASES {
            assert_eq!(normalize(input, None), *expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_normalize_with_unrelated_mapping_is_unchanged() {
        let mapping: TermMapping = [("dog".to_string(), "cat".to_string())].into_iter().collect();
        for (input, expected) in CASES {
            assert_eq!(normalize(input, Some(&mapping)), *expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_term_mapping_is_whole_word_and_case_insensitive() {
        let mapping: TermMapping = [("dog".to_string(), "cat".to_string())].into_iter().collect();
        assert_eq!(normalize("this is a Dog", Some(&mapping)), vec!["cat"]);
        assert_eq!(normalize("hotdogs sold", Some(&mapping)), vec!["hotdogs", "sold"]);
    }

    #[test]
    fn test_clean_text_strips_markup_and_symbols() {
        assert_eq!(clean_text("<i>Breaking</i>: Fed cuts rates!"), "breaking fed cuts rates");
        assert_eq!(clean_text("word - another"), "wordanother");
        assert_eq!(clean_text("well-known fact..."), "well-known fact");
        assert_eq!(clean_text("snake_case *bold*"), "snakecase bold");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let title = "Apple announces new iPhone release date";
        assert_eq!(normalize(title, None), normalize(title, None));
    }
}
