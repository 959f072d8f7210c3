//! MailGuard Common - Shared types for the email phishing detection pipeline
//!
//! This crate provides the values that cross component boundaries:
//! - `RawEmail`: the immutable input
//! - `Label` / `Verdict` / `Indicator`: the classification output
//! - `AnalyzerStats`: lock-free counters for the serving layer
//! - Error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{MailGuardError, MailGuardResult};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Core Types
// =============================================================================

/// Raw email submitted for analysis.
///
/// Immutable input; the pipeline never mutates it and keeps no state
/// between calls. How the email was obtained (manual entry, fetched inbox
/// message) is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEmail {
    /// Sender address, e.g. `"security@paypa1-verify.com"`
    pub sender: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

impl RawEmail {
    /// Convenience constructor
    pub fn new(
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Classification label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Legitimate email
    Legitimate,
    /// Phishing email
    Phishing,
}

impl Label {
    /// Stable class index used by the classifiers (legitimate = 0, phishing = 1)
    pub fn index(self) -> usize {
        match self {
            Label::Legitimate => 0,
            Label::Phishing => 1,
        }
    }

    /// Inverse of [`Label::index`]
    pub fn from_index(index: usize) -> Self {
        if index == 1 {
            Label::Phishing
        } else {
            Label::Legitimate
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Legitimate => write!(f, "legitimate"),
            Label::Phishing => write!(f, "phishing"),
        }
    }
}

/// Human-interpretable indicator contributing to a verdict.
///
/// Indicators are derived from the non-zero entries of the signal
/// sub-vector only, never from the opaque lexical weights, so the
/// explanation stays readable even though the classifier internals are not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
    /// One or more URLs present in subject or body
    UrlPresence {
        /// Number of URLs found
        count: u32,
    },
    /// Urgency / pressure keywords matched
    UrgencyKeywords {
        /// Number of keyword matches
        count: u32,
    },
    /// Sender display name or local part does not fit the sending domain
    SenderMismatch,
    /// Excessive exclamation marks
    ExcessivePunctuation {
        /// Number of exclamation marks
        count: u32,
    },
    /// Shouting: words written entirely in uppercase
    UppercaseEmphasis {
        /// Number of all-uppercase words
        count: u32,
    },
    /// References to an attachment or attached file
    AttachmentReference,
    /// Words with digit-for-letter substitutions (e.g. "paypa1")
    ObfuscatedWords {
        /// Number of obfuscated words
        count: u32,
    },
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indicator::UrlPresence { count } => write!(f, "contains {count} URL(s)"),
            Indicator::UrgencyKeywords { count } => {
                write!(f, "matches {count} urgency keyword(s)")
            }
            Indicator::SenderMismatch => write!(f, "sender name does not match sending domain"),
            Indicator::ExcessivePunctuation { count } => {
                write!(f, "contains {count} exclamation mark(s)")
            }
            Indicator::UppercaseEmphasis { count } => {
                write!(f, "contains {count} all-uppercase word(s)")
            }
            Indicator::AttachmentReference => write!(f, "references an attachment"),
            Indicator::ObfuscatedWords { count } => {
                write!(f, "contains {count} obfuscated word(s)")
            }
        }
    }
}

/// Final verdict for an analyzed email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Predicted class
    pub label: Label,
    /// Calibrated probability of the predicted class, in [0, 1]
    pub confidence: f64,
    /// Signal-derived indicators that contributed to the verdict
    pub indicators: Vec<Indicator>,
}

// =============================================================================
// Serving statistics
// =============================================================================

/// Lock-free counters maintained by the analyzer
#[derive(Debug, Default)]
pub struct AnalyzerStats {
    /// Emails analyzed
    pub analyzed: AtomicU64,
    /// Verdicts with a phishing label
    pub phishing: AtomicU64,
    /// Verdicts with a legitimate label
    pub legitimate: AtomicU64,
    /// Analysis calls rejected with an error
    pub rejected: AtomicU64,
}

impl AnalyzerStats {
    /// Record a completed analysis
    pub fn record(&self, label: Label) {
        self.analyzed.fetch_add(1, Ordering::Relaxed);
        match label {
            Label::Phishing => self.phishing.fetch_add(1, Ordering::Relaxed),
            Label::Legitimate => self.legitimate.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Record a rejected analysis call
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a consistent-enough snapshot for reporting
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            analyzed: self.analyzed.load(Ordering::Relaxed),
            phishing: self.phishing.load(Ordering::Relaxed),
            legitimate: self.legitimate.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`AnalyzerStats`]
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsSnapshot {
    /// Emails analyzed
    pub analyzed: u64,
    /// Phishing verdicts
    pub phishing: u64,
    /// Legitimate verdicts
    pub legitimate: u64,
    /// Rejected calls
    pub rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_index_round_trip() {
        assert_eq!(Label::from_index(Label::Phishing.index()), Label::Phishing);
        assert_eq!(
            Label::from_index(Label::Legitimate.index()),
            Label::Legitimate
        );
    }

    #[test]
    fn test_stats_record() {
        let stats = AnalyzerStats::default();
        stats.record(Label::Phishing);
        stats.record(Label::Legitimate);
        stats.record(Label::Phishing);
        stats.record_rejected();

        let snap = stats.snapshot();
        assert_eq!(snap.analyzed, 3);
        assert_eq!(snap.phishing, 2);
        assert_eq!(snap.legitimate, 1);
        assert_eq!(snap.rejected, 1);
    }

    #[test]
    fn test_indicator_display() {
        let ind = Indicator::UrgencyKeywords { count: 3 };
        assert_eq!(ind.to_string(), "matches 3 urgency keyword(s)");
    }
}
