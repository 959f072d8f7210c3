//! Trained model artifact
//!
//! The only state that crosses a process boundary. The artifact binds the
//! vocabulary, the signal scaler, the chosen algorithm and its parameters
//! together with schema tags; a build whose vectorization schema disagrees
//! refuses to load the artifact instead of producing silently wrong
//! vectors. Retraining produces a new artifact; nothing mutates one in
//! place.

use crate::classifier::{Algorithm, ClassifierParams};
use crate::features::FeatureVector;
use crate::signals::{SignalExtractor, SignalScaler, SIGNAL_COUNT};
use crate::tfidf::TfidfVocabulary;
use crate::train::TrainingReport;
use chrono::{DateTime, Utc};
use mailguard_common::{Label, MailGuardError, MailGuardResult, RawEmail, Verdict};
use mailguard_text::{NormalizedDocument, TEXT_PIPELINE_VERSION};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// Artifact schema version; bump on any change to the serialized layout
/// or the feature ordering contract.
pub const MODEL_SCHEMA_VERSION: u32 = 1;

/// Immutable trained model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    schema_version: u32,
    text_pipeline_version: u32,
    vocabulary: TfidfVocabulary,
    scaler: SignalScaler,
    params: ClassifierParams,
    trained_at: DateTime<Utc>,
    report: TrainingReport,
}

impl TrainedModel {
    pub(crate) fn new(
        schema_version: u32,
        text_pipeline_version: u32,
        vocabulary: TfidfVocabulary,
        scaler: SignalScaler,
        params: ClassifierParams,
        trained_at: DateTime<Utc>,
        report: TrainingReport,
    ) -> Self {
        Self {
            schema_version,
            text_pipeline_version,
            vocabulary,
            scaler,
            params,
            trained_at,
            report,
        }
    }

    /// The chosen algorithm
    pub fn algorithm(&self) -> Algorithm {
        self.params.algorithm()
    }

    /// The learned vocabulary
    pub fn vocabulary(&self) -> &TfidfVocabulary {
        &self.vocabulary
    }

    /// Cross-validation report from the run that produced this artifact
    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    /// When this artifact was produced
    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Check that the stored classifier's input dimension agrees with the
    /// vectorization schema (vocabulary + signal block).
    pub fn verify(&self) -> MailGuardResult<()> {
        let expected = self.params.input_dim();
        let found = self.vocabulary.len() + SIGNAL_COUNT;
        if expected != found {
            return Err(MailGuardError::VocabularyMismatch { expected, found });
        }
        Ok(())
    }

    /// Build the combined feature vector for one email: lexical TF-IDF
    /// block first, scaled signal block second. The ordering matches what
    /// the classifier was fitted on; [`TrainedModel::verify`] guards the
    /// dimensions.
    pub fn vectorize(
        &self,
        extractor: &SignalExtractor,
        doc: &NormalizedDocument,
        email: &RawEmail,
    ) -> MailGuardResult<FeatureVector> {
        self.verify()?;
        let lexical = self.vocabulary.transform(doc);
        let signals = self.scaler.scale(&extractor.extract(email));
        Ok(FeatureVector::concat(&lexical, &signals))
    }

    /// Classify a feature vector.
    ///
    /// Deterministic: the same model and vector always yield the same
    /// verdict. Confidence is the calibrated probability of the predicted
    /// label. Indicators come from the non-zero entries of the signal
    /// block, recovered through the scaler.
    pub fn predict(&self, features: &FeatureVector) -> Verdict {
        let phishing_prob = self.params.predict_proba(features);
        let (label, confidence) = if phishing_prob >= 0.5 {
            (Label::Phishing, phishing_prob)
        } else {
            (Label::Legitimate, 1.0 - phishing_prob)
        };

        let mut raw_signals = [0.0; SIGNAL_COUNT];
        let signal_offset = self.vocabulary.len();
        for (i, raw) in raw_signals.iter_mut().enumerate() {
            *raw = self.scaler.invert(i, features.get(signal_offset + i));
        }
        let indicators = SignalExtractor::indicators(&raw_signals);

        Verdict {
            label,
            confidence,
            indicators,
        }
    }

    /// Serialize to a file (JSON with embedded schema tags)
    pub fn save(&self, path: &Path) -> MailGuardResult<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        info!(path = %path.display(), algorithm = %self.algorithm(), "saved model artifact");
        Ok(())
    }

    /// Load and validate an artifact.
    ///
    /// Fails with [`MailGuardError::SchemaMismatch`] when the artifact was
    /// produced by an incompatible pipeline version, and
    /// [`MailGuardError::VocabularyMismatch`] when its dimensions are
    /// internally inconsistent.
    pub fn load(path: &Path) -> MailGuardResult<Self> {
        let file = File::open(path)?;
        let model: TrainedModel = serde_json::from_reader(BufReader::new(file))?;
        if model.schema_version != MODEL_SCHEMA_VERSION {
            return Err(MailGuardError::SchemaMismatch {
                expected: MODEL_SCHEMA_VERSION,
                found: model.schema_version,
            });
        }
        if model.text_pipeline_version != TEXT_PIPELINE_VERSION {
            return Err(MailGuardError::SchemaMismatch {
                expected: TEXT_PIPELINE_VERSION,
                found: model.text_pipeline_version,
            });
        }
        model.verify()?;
        info!(path = %path.display(), algorithm = %model.algorithm(), "loaded model artifact");
        Ok(model)
    }
}
