//! End-to-end analyzer
//!
//! Ties the text pipeline, the signal extractor and the active model into
//! one object: raw email in, verdict out. Retraining goes through
//! [`PhishingAnalyzer::train_and_commit`], which swaps the new model in
//! atomically without pausing concurrent analysis.

use crate::serving::ActiveModel;
use crate::signals::SignalExtractor;
use crate::train::{train, TrainingConfig};
use mailguard_common::{
    AnalyzerStats, Label, MailGuardError, MailGuardResult, RawEmail, StatsSnapshot, Verdict,
};
use mailguard_text::TextNormalizer;
use tracing::{debug, warn};

/// Shared, thread-safe phishing analyzer
pub struct PhishingAnalyzer {
    normalizer: TextNormalizer,
    signals: SignalExtractor,
    active: ActiveModel,
    stats: AnalyzerStats,
}

impl PhishingAnalyzer {
    /// Create an analyzer with no active model
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            signals: SignalExtractor::new(),
            active: ActiveModel::new(),
            stats: AnalyzerStats::default(),
        }
    }

    /// Analyze one email against the currently active model.
    ///
    /// Fails with [`MailGuardError::NoActiveModel`] before the first
    /// commit, and with [`MailGuardError::EmptyInput`] when subject and
    /// body are both empty after markup stripping.
    pub fn analyze(&self, email: &RawEmail) -> MailGuardResult<Verdict> {
        let Some(model) = self.active.load() else {
            self.stats.record_rejected();
            return Err(MailGuardError::NoActiveModel);
        };

        let verdict: MailGuardResult<Verdict> = (|| {
            let doc = self.normalizer.normalize(email)?;
            let features = model.vectorize(&self.signals, &doc, email)?;
            Ok(model.predict(&features))
        })();

        match verdict {
            Ok(verdict) => {
                if verdict.label == Label::Phishing {
                    debug!(
                        sender = %email.sender,
                        confidence = verdict.confidence,
                        indicators = verdict.indicators.len(),
                        "phishing verdict"
                    );
                }
                self.stats.record(verdict.label);
                Ok(verdict)
            }
            Err(err) => {
                warn!(sender = %email.sender, %err, "analysis rejected");
                self.stats.record_rejected();
                Err(err)
            }
        }
    }

    /// Train on a labelled corpus and atomically activate the result.
    /// Returns the new serving version. On training failure the previous
    /// model keeps serving untouched.
    pub fn train_and_commit(
        &self,
        corpus: &[(RawEmail, Label)],
        config: &TrainingConfig,
    ) -> MailGuardResult<u64> {
        let model = train(corpus, config)?;
        Ok(self.active.commit(model))
    }

    /// The model slot, for direct load/commit access
    pub fn active(&self) -> &ActiveModel {
        &self.active
    }

    /// Running counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for PhishingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::sample_corpus;
    use mailguard_common::Indicator;
    use proptest::prelude::*;
    use std::sync::OnceLock;

    fn analyzer() -> &'static PhishingAnalyzer {
        static ANALYZER: OnceLock<PhishingAnalyzer> = OnceLock::new();
        ANALYZER.get_or_init(|| {
            let analyzer = PhishingAnalyzer::new();
            analyzer
                .train_and_commit(&sample_corpus(), &TrainingConfig::default())
                .unwrap();
            analyzer
        })
    }

    #[test]
    fn test_no_active_model_is_rejected() {
        let fresh = PhishingAnalyzer::new();
        let email = RawEmail::new("a@b.com", "hello", "just checking in");
        let err = fresh.analyze(&email).unwrap_err();
        assert!(matches!(err, MailGuardError::NoActiveModel));
        assert_eq!(fresh.stats().rejected, 1);
    }

    #[test]
    fn test_obvious_phishing_is_flagged() {
        let email = RawEmail::new(
            "security@paypa1.com",
            "Urgent: Verify your account now!!!",
            "Your account will be suspended. Click here immediately: http://paypa1-secure.com/login",
        );
        let verdict = analyzer().analyze(&email).unwrap();
        assert_eq!(verdict.label, Label::Phishing);
        assert!(verdict.confidence >= 0.5);
        assert!(verdict
            .indicators
            .iter()
            .any(|i| matches!(i, Indicator::UrgencyKeywords { .. })));
        assert!(verdict
            .indicators
            .iter()
            .any(|i| matches!(i, Indicator::UrlPresence { .. })));
        assert!(verdict.indicators.contains(&Indicator::SenderMismatch));
    }

    #[test]
    fn test_url_indicator_reported_for_link_bearing_phish() {
        // A verdict on a link-bearing phish must surface the URL evidence
        // regardless of how rarely URLs appear in the training corpus
        let email = RawEmail::new(
            "security@paypa1-verify.com",
            "Urgent: Verify your account now!!!",
            "Click here immediately to avoid suspension: http://bit.ly/xyz",
        );
        let verdict = analyzer().analyze(&email).unwrap();
        assert_eq!(verdict.label, Label::Phishing);
        assert!(verdict
            .indicators
            .iter()
            .any(|i| matches!(i, Indicator::UrgencyKeywords { .. })));
        assert!(verdict
            .indicators
            .iter()
            .any(|i| matches!(i, Indicator::UrlPresence { .. })));
    }

    #[test]
    fn test_routine_email_is_legitimate() {
        let email = RawEmail::new(
            "newsletter@nytimes.com",
            "Your weekly digest",
            "Here are the top stories we picked for you this week. Happy reading from the editorial team.",
        );
        let verdict = analyzer().analyze(&email).unwrap();
        assert_eq!(verdict.label, Label::Legitimate);
        assert!(verdict.confidence >= 0.5);
    }

    #[test]
    fn test_empty_email_is_rejected_and_counted() {
        let before = analyzer().stats().rejected;
        let email = RawEmail::new("a@b.com", "  ", "<p> </p>");
        let err = analyzer().analyze(&email).unwrap_err();
        assert!(matches!(err, MailGuardError::EmptyInput));
        assert!(analyzer().stats().rejected > before);
    }

    #[test]
    fn test_stats_count_verdicts() {
        let fresh = PhishingAnalyzer::new();
        fresh
            .train_and_commit(&sample_corpus(), &TrainingConfig::default())
            .unwrap();
        let email = RawEmail::new("a@b.com", "lunch", "are we still on for lunch tomorrow");
        fresh.analyze(&email).unwrap();
        let stats = fresh.stats();
        assert_eq!(stats.analyzed, 1);
        assert_eq!(stats.phishing + stats.legitimate, 1);
    }

    #[test]
    fn test_retrain_does_not_invalidate_serving() {
        let fresh = PhishingAnalyzer::new();
        fresh
            .train_and_commit(&sample_corpus(), &TrainingConfig::default())
            .unwrap();
        let v1 = fresh.active().version();
        fresh
            .train_and_commit(&sample_corpus(), &TrainingConfig::default())
            .unwrap();
        assert_eq!(fresh.active().version(), v1 + 1);

        let email = RawEmail::new("a@b.com", "status", "the deployment finished without issues");
        assert!(fresh.analyze(&email).is_ok());
    }

    proptest! {
        #[test]
        fn prop_verdicts_are_deterministic_and_bounded(
            subject in "[a-zA-Z !?.]{1,60}",
            body in "[a-zA-Z0-9 !?.,]{1,200}",
        ) {
            let email = RawEmail::new("someone@example.com", subject, body);
            let first = analyzer().analyze(&email);
            let second = analyzer().analyze(&email);
            match (first, second) {
                (Ok(a), Ok(b)) => {
                    prop_assert_eq!(a.label, b.label);
                    prop_assert_eq!(a.confidence, b.confidence);
                    prop_assert!((0.5..=1.0).contains(&a.confidence));
                }
                (Err(_), Err(_)) => {}
                _ => prop_assert!(false, "analysis not deterministic"),
            }
        }
    }
}
