//! Hand-engineered signal features
//!
//! Deterministic rule-based counts and flags computed directly from the
//! raw email, independent of the lexical vocabulary. Their order is fixed
//! and versioned with the model artifact: lexical features come first in
//! the combined vector, then these eight, in the order of [`Signal`].

use mailguard_common::{Indicator, RawEmail};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of signal features
pub const SIGNAL_COUNT: usize = 8;

/// Signal feature identity, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Signal {
    /// URLs in subject or body
    UrlCount = 0,
    /// Urgency / pressure keyword matches
    UrgencyKeywords = 1,
    /// Sender display/local part inconsistent with the sending domain
    SenderMismatch = 2,
    /// Exclamation marks in subject or body
    ExclamationCount = 3,
    /// Combined subject + body length in characters
    CharCount = 4,
    /// All-uppercase words
    UppercaseWords = 5,
    /// References to an attachment
    AttachmentReference = 6,
    /// Words with digit-for-letter substitutions
    ObfuscatedWords = 7,
}

/// Urgency and pressure keywords, matched as substrings of the lowercased
/// subject + body.
pub(crate) const URGENCY_KEYWORDS: &[&str] = &[
    "urgent",
    "immediately",
    "act now",
    "verify",
    "suspended",
    "suspension",
    "limited time",
    "click here",
    "winner",
    "congratulations",
    "expire",
    "locked",
    "compromised",
    "confirm your",
    "don't delay",
    "last chance",
    "final notice",
];

/// Brands commonly impersonated in phishing senders
const PROTECTED_BRANDS: &[(&str, &str)] = &[
    ("paypal", "paypal.com"),
    ("amazon", "amazon.com"),
    ("microsoft", "microsoft.com"),
    ("apple", "apple.com"),
    ("google", "google.com"),
    ("netflix", "netflix.com"),
];

/// Role accounts that legitimate bulk senders rarely pair with unknown domains
pub(crate) const ROLE_LOCAL_PARTS: &[&str] =
    &["support", "admin", "security", "billing", "service", "verify"];

/// Consumer mail domains treated as plausible for role accounts
pub(crate) const COMMON_DOMAINS: &[&str] = &[
    "gmail.com",
    "outlook.com",
    "yahoo.com",
    "hotmail.com",
    "aol.com",
    "icloud.com",
];

/// Extractor for the eight signal features.
///
/// Stateless; every signal is a pure function of the raw email.
pub struct SignalExtractor {
    url_re: Regex,
    obfuscated_re: Regex,
    attachment_re: Regex,
}

impl SignalExtractor {
    /// Create an extractor with the fixed keyword lists and patterns
    pub fn new() -> Self {
        Self {
            url_re: Regex::new(r"(?i)\bhttps?://\S+|\bwww\.\S+").unwrap(),
            obfuscated_re: Regex::new(r"\b[a-zA-Z]{2,}[0134][a-zA-Z]*\b").unwrap(),
            attachment_re: Regex::new(r"(?i)\battach|\benclosed\b|\.(pdf|docx?|xlsx?|zip|exe|scr|rar)\b")
                .unwrap(),
        }
    }

    /// Compute the raw (unscaled) signal vector
    pub fn extract(&self, email: &RawEmail) -> [f64; SIGNAL_COUNT] {
        let text = format!("{} {}", email.subject, email.body);
        let lower = text.to_lowercase();

        let url_count = self.url_re.find_iter(&text).count() as f64;
        let urgency = URGENCY_KEYWORDS
            .iter()
            .filter(|kw| lower.contains(*kw))
            .count() as f64;
        let mismatch = if sender_mismatch(&email.sender) { 1.0 } else { 0.0 };
        let exclamations = text.matches('!').count() as f64;
        let chars = text.chars().count().saturating_sub(1) as f64;
        let uppercase_words = text
            .split_whitespace()
            .filter(|w| {
                let letters: Vec<char> = w.chars().filter(|c| c.is_ascii_alphabetic()).collect();
                letters.len() >= 2 && letters.iter().all(|c| c.is_ascii_uppercase())
            })
            .count() as f64;
        let attachment = if self.attachment_re.is_match(&text) { 1.0 } else { 0.0 };
        let with_sender = format!("{} {}", email.sender, text);
        let obfuscated = self.obfuscated_re.find_iter(&with_sender).count() as f64;

        [
            url_count,
            urgency,
            mismatch,
            exclamations,
            chars,
            uppercase_words,
            attachment,
            obfuscated,
        ]
    }

    /// Derive human-readable indicators from the non-zero entries of a raw
    /// signal vector. Email length is descriptive, not suspicious, and maps
    /// to no indicator.
    pub fn indicators(signals: &[f64; SIGNAL_COUNT]) -> Vec<Indicator> {
        let mut out = Vec::new();
        let count = |i: Signal| signals[i as usize].round() as u32;
        if signals[Signal::UrlCount as usize] > 0.0 {
            out.push(Indicator::UrlPresence {
                count: count(Signal::UrlCount),
            });
        }
        if signals[Signal::UrgencyKeywords as usize] > 0.0 {
            out.push(Indicator::UrgencyKeywords {
                count: count(Signal::UrgencyKeywords),
            });
        }
        if signals[Signal::SenderMismatch as usize] > 0.0 {
            out.push(Indicator::SenderMismatch);
        }
        if signals[Signal::ExclamationCount as usize] > 0.0 {
            out.push(Indicator::ExcessivePunctuation {
                count: count(Signal::ExclamationCount),
            });
        }
        if signals[Signal::UppercaseWords as usize] > 0.0 {
            out.push(Indicator::UppercaseEmphasis {
                count: count(Signal::UppercaseWords),
            });
        }
        if signals[Signal::AttachmentReference as usize] > 0.0 {
            out.push(Indicator::AttachmentReference);
        }
        if signals[Signal::ObfuscatedWords as usize] > 0.0 {
            out.push(Indicator::ObfuscatedWords {
                count: count(Signal::ObfuscatedWords),
            });
        }
        out
    }
}

impl Default for SignalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Sender heuristic: brand name (possibly obfuscated) outside the brand's
/// real domain, or a role account at an uncommon domain.
fn sender_mismatch(sender: &str) -> bool {
    let sender = sender.to_lowercase();
    let Some((local, domain)) = sender.split_once('@') else {
        return false;
    };

    // Undo the usual digit-for-letter substitutions before brand matching
    let deobfuscated: String = domain
        .chars()
        .map(|c| match c {
            '0' => 'o',
            '1' => 'l',
            '3' => 'e',
            '4' => 'a',
            _ => c,
        })
        .collect();

    for (brand, official) in PROTECTED_BRANDS {
        let official_domain = domain == *official || domain.ends_with(&format!(".{official}"));
        if official_domain {
            // Role accounts and brand mentions are expected at the brand's
            // own domain
            return false;
        }
        if local.contains(brand) || deobfuscated.contains(brand) {
            return true;
        }
    }

    ROLE_LOCAL_PARTS.contains(&local) && !COMMON_DOMAINS.contains(&domain)
}

// =============================================================================
// Signal scaling
// =============================================================================

/// Per-signal scaling learned at training time.
///
/// Signals are nonnegative counts and flags, so scaling divides by the
/// training-set maximum; zero stays zero, which keeps the indicator
/// derivation exact. A signal never attested in the training corpus
/// (max 0) passes through unscaled, so URL counts and other evidence
/// unseen at training still reach the classifier and the indicators at
/// inference time. Stored in the model artifact as part of the
/// vectorization schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalScaler {
    max: Vec<f64>,
}

impl SignalScaler {
    /// Learn the per-signal maxima from training rows
    pub fn fit(rows: &[[f64; SIGNAL_COUNT]]) -> Self {
        let mut max = vec![0.0; SIGNAL_COUNT];
        for row in rows {
            for (m, v) in max.iter_mut().zip(row) {
                if *v > *m {
                    *m = *v;
                }
            }
        }
        Self { max }
    }

    /// Scale a raw signal vector into [0, ~1]; unattested signals pass
    /// through unchanged
    pub fn scale(&self, raw: &[f64; SIGNAL_COUNT]) -> Vec<f64> {
        raw.iter()
            .zip(&self.max)
            .map(|(v, m)| v / m.max(1.0))
            .collect()
    }

    /// Recover a raw signal value from its scaled form
    pub fn invert(&self, index: usize, scaled: f64) -> f64 {
        scaled * self.max.get(index).copied().unwrap_or(0.0).max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(sender: &str, subject: &str, body: &str) -> RawEmail {
        RawEmail::new(sender, subject, body)
    }

    #[test]
    fn test_url_count() {
        let extractor = SignalExtractor::new();
        let signals = extractor.extract(&email(
            "a@b.c",
            "links",
            "see http://bit.ly/xyz and https://example.com and www.example.org",
        ));
        assert_eq!(signals[Signal::UrlCount as usize], 3.0);
    }

    #[test]
    fn test_urgency_keywords() {
        let extractor = SignalExtractor::new();
        let signals = extractor.extract(&email(
            "a@b.c",
            "Urgent: verify your account",
            "act now before it expires",
        ));
        // urgent, verify, act now, expire
        assert_eq!(signals[Signal::UrgencyKeywords as usize], 4.0);
    }

    #[test]
    fn test_sender_mismatch_obfuscated_brand() {
        assert!(sender_mismatch("security@paypa1-verify.com"));
        assert!(sender_mismatch("support@amazon-update.net"));
        assert!(!sender_mismatch("service@paypal.com"));
        assert!(!sender_mismatch("newsletter@nytimes.com"));
        assert!(!sender_mismatch("not-an-address"));
    }

    #[test]
    fn test_role_account_at_uncommon_domain() {
        assert!(sender_mismatch("admin@bad-domain.xyz"));
        assert!(!sender_mismatch("admin@gmail.com"));
    }

    #[test]
    fn test_exclamations_and_uppercase() {
        let extractor = SignalExtractor::new();
        let signals = extractor.extract(&email("a@b.c", "WARNING: FINAL notice!!!", "ok"));
        assert_eq!(signals[Signal::ExclamationCount as usize], 3.0);
        assert_eq!(signals[Signal::UppercaseWords as usize], 2.0);
    }

    #[test]
    fn test_attachment_reference() {
        let extractor = SignalExtractor::new();
        let with = extractor.extract(&email("a@b.c", "report", "please find attached invoice.pdf"));
        let without = extractor.extract(&email("a@b.c", "report", "see you tomorrow"));
        assert_eq!(with[Signal::AttachmentReference as usize], 1.0);
        assert_eq!(without[Signal::AttachmentReference as usize], 0.0);
    }

    #[test]
    fn test_obfuscated_words() {
        let extractor = SignalExtractor::new();
        let signals = extractor.extract(&email(
            "security@paypa1-verify.com",
            "acc0unt notice",
            "your win10 machine", // "win10" is not leet-style and must not match
        ));
        assert_eq!(signals[Signal::ObfuscatedWords as usize], 2.0);
    }

    #[test]
    fn test_char_count() {
        let extractor = SignalExtractor::new();
        let signals = extractor.extract(&email("a@b.c", "hi", "there"));
        assert_eq!(signals[Signal::CharCount as usize], 7.0);
    }

    #[test]
    fn test_scaler_round_trip() {
        let rows = [
            [2.0, 4.0, 1.0, 6.0, 100.0, 3.0, 1.0, 2.0],
            [0.0, 2.0, 0.0, 0.0, 50.0, 0.0, 0.0, 0.0],
        ];
        let scaler = SignalScaler::fit(&rows);
        let scaled = scaler.scale(&rows[0]);
        assert!(scaled.iter().all(|v| (0.0..=1.0).contains(v)));
        for (i, v) in rows[0].iter().enumerate() {
            assert!((scaler.invert(i, scaled[i]) - v).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scaler_zero_stays_zero() {
        let rows = [[1.0, 2.0, 1.0, 3.0, 80.0, 1.0, 1.0, 1.0]];
        let scaler = SignalScaler::fit(&rows);
        let scaled = scaler.scale(&[0.0; SIGNAL_COUNT]);
        assert!(scaled.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_scaler_passes_through_unattested_signals() {
        // Training rows without a single URL must not erase URL counts
        // seen at inference
        let rows = [[0.0, 2.0, 1.0, 3.0, 80.0, 1.0, 1.0, 1.0]];
        let scaler = SignalScaler::fit(&rows);
        let scaled = scaler.scale(&[3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(scaled[Signal::UrlCount as usize], 3.0);
        assert_eq!(scaler.invert(Signal::UrlCount as usize, scaled[0]), 3.0);
    }

    #[test]
    fn test_indicators_from_nonzero_signals() {
        let signals = [1.0, 2.0, 1.0, 0.0, 120.0, 0.0, 0.0, 1.0];
        let indicators = SignalExtractor::indicators(&signals);
        assert!(indicators.contains(&Indicator::UrlPresence { count: 1 }));
        assert!(indicators.contains(&Indicator::UrgencyKeywords { count: 2 }));
        assert!(indicators.contains(&Indicator::SenderMismatch));
        assert!(indicators.contains(&Indicator::ObfuscatedWords { count: 1 }));
        // Length alone is no indicator
        assert_eq!(indicators.len(), 4);
    }
}
