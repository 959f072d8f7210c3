//! Email text normalization
//!
//! Turns a raw subject/body pair into an ordered sequence of lowercase,
//! stop-word-filtered, stemmed tokens. The output feeds the lexical
//! feature extractor; identical input always produces identical tokens.

use crate::stemmer;
use crate::stopwords::ENGLISH_STOP_WORDS;
use mailguard_common::{MailGuardError, MailGuardResult, RawEmail};
use regex::Regex;
use std::collections::HashSet;

/// Ordered token sequence produced by the normalizer.
///
/// Derived data; callers discard it after feature extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    tokens: Vec<String>,
}

impl NormalizedDocument {
    /// The tokens, in document order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if no tokens survived normalization
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Email text normalizer.
///
/// Stateless across calls; all patterns are compiled once at construction.
pub struct TextNormalizer {
    url_re: Regex,
    addr_re: Regex,
    html_re: Regex,
    stop_words: HashSet<&'static str>,
}

impl TextNormalizer {
    /// Create a normalizer with the fixed stop-word list
    pub fn new() -> Self {
        Self {
            // Same stripping patterns the feature signals count against
            url_re: Regex::new(r"(?i)\bhttps?://\S+|\bwww\.\S+").unwrap(),
            addr_re: Regex::new(r"\S+@\S+").unwrap(),
            html_re: Regex::new(r"<[^>]*>").unwrap(),
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Normalize subject + body into a token sequence.
    ///
    /// Fails with [`MailGuardError::EmptyInput`] when both subject and body
    /// are empty after HTML stripping; an email with only one non-empty
    /// field succeeds.
    pub fn normalize(&self, email: &RawEmail) -> MailGuardResult<NormalizedDocument> {
        let subject = self.html_re.replace_all(&email.subject, " ");
        let body = self.html_re.replace_all(&email.body, " ");
        if subject.trim().is_empty() && body.trim().is_empty() {
            return Err(MailGuardError::EmptyInput);
        }

        let combined = format!("{} {}", subject, body).to_lowercase();
        let stripped = self.url_re.replace_all(&combined, " ");
        let stripped = self.addr_re.replace_all(&stripped, " ");

        let tokens = stripped
            .split(|c: char| !c.is_ascii_alphabetic())
            .filter(|t| t.len() >= 2)
            .filter(|t| !self.stop_words.contains(t))
            .map(stemmer::stem)
            .collect();

        Ok(NormalizedDocument { tokens })
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(subject: &str, body: &str) -> RawEmail {
        RawEmail::new("sender@example.com", subject, body)
    }

    #[test]
    fn test_empty_input_rejected() {
        let normalizer = TextNormalizer::new();
        let err = normalizer.normalize(&email("", "")).unwrap_err();
        assert!(matches!(err, MailGuardError::EmptyInput));

        // All-markup content counts as empty
        let err = normalizer
            .normalize(&email("<p></p>", "<br/> <div> </div>"))
            .unwrap_err();
        assert!(matches!(err, MailGuardError::EmptyInput));
    }

    #[test]
    fn test_body_only_succeeds() {
        let normalizer = TextNormalizer::new();
        let doc = normalizer
            .normalize(&email("", "Please review the quarterly report"))
            .unwrap();
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_lowercases_and_stems() {
        let normalizer = TextNormalizer::new();
        let doc = normalizer
            .normalize(&email("URGENT: Verify", "verified accounts"))
            .unwrap();
        assert_eq!(doc.tokens(), &["urgent", "verifi", "verifi", "account"]);
    }

    #[test]
    fn test_strips_urls_addresses_and_digits() {
        let normalizer = TextNormalizer::new();
        let doc = normalizer
            .normalize(&email(
                "Invoice 12345",
                "See http://example.com/pay and mail billing@example.com",
            ))
            .unwrap();
        assert_eq!(doc.tokens(), &["invoic", "see", "mail"]);
    }

    #[test]
    fn test_strips_html_markup() {
        let normalizer = TextNormalizer::new();
        let doc = normalizer
            .normalize(&email("", "<html><b>Click</b> the <a href=\"x\">link</a></html>"))
            .unwrap();
        assert_eq!(doc.tokens(), &["click", "link"]);
    }

    #[test]
    fn test_deterministic() {
        let normalizer = TextNormalizer::new();
        let input = email("Weekly digest", "Here are this week's top stories...");
        let a = normalizer.normalize(&input).unwrap();
        let b = normalizer.normalize(&input).unwrap();
        assert_eq!(a, b);
    }
}
