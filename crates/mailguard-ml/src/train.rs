//! Training and model selection
//!
//! Fits every candidate algorithm on identical feature vectors, scores
//! each with stratified cross-validation, and refits the winner on the
//! full corpus. The handoff to serving happens elsewhere; a failed run
//! never touches a committed model.

use crate::classifier::{
    Algorithm, ClassifierParams, ForestConfig, GaussianNb, LogisticRegression, RandomForest,
};
use crate::features::FeatureVector;
use crate::model::{TrainedModel, MODEL_SCHEMA_VERSION};
use crate::signals::{SignalExtractor, SignalScaler, SIGNAL_COUNT};
use crate::tfidf::TfidfVocabulary;
use chrono::Utc;
use mailguard_common::{Label, MailGuardError, MailGuardResult, RawEmail};
use mailguard_text::{TextNormalizer, TEXT_PIPELINE_VERSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Lexical vocabulary cap
    pub max_features: usize,
    /// Minimum examples per label class
    pub min_class_examples: usize,
    /// Cross-validation folds
    pub cv_folds: usize,
    /// Forest hyperparameters
    pub forest: ForestConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_features: 100,
            min_class_examples: 5,
            cv_folds: 3,
            forest: ForestConfig::default(),
        }
    }
}

/// Cross-validation outcome for one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Candidate algorithm
    pub algorithm: Algorithm,
    /// Mean accuracy over folds (the selection metric)
    pub mean_accuracy: f64,
    /// Mean F1 for the phishing class, recorded for reporting
    pub mean_f1: f64,
    /// Per-fold accuracies
    pub fold_accuracies: Vec<f64>,
}

/// What the trainer saw and decided
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Scores per candidate, in tie-break order
    pub candidates: Vec<CandidateScore>,
    /// The selected algorithm
    pub selected: Algorithm,
    /// Corpus size
    pub examples: usize,
}

/// Train on a labeled corpus and return an immutable model artifact.
///
/// Fails with [`MailGuardError::InsufficientData`] before any fitting when
/// either class has fewer than `min_class_examples` rows.
pub fn train(corpus: &[(RawEmail, Label)], config: &TrainingConfig) -> MailGuardResult<TrainedModel> {
    for label in [Label::Legitimate, Label::Phishing] {
        let count = corpus.iter().filter(|(_, l)| *l == label).count();
        if count < config.min_class_examples {
            return Err(MailGuardError::InsufficientData {
                label,
                count,
                min: config.min_class_examples,
            });
        }
    }

    info!(examples = corpus.len(), "training phishing model");

    // Vectorize the whole corpus once; every candidate sees identical rows
    let normalizer = TextNormalizer::new();
    let extractor = SignalExtractor::new();
    let mut docs = Vec::with_capacity(corpus.len());
    let mut raw_signals = Vec::with_capacity(corpus.len());
    for (email, _) in corpus {
        docs.push(normalizer.normalize(email)?);
        raw_signals.push(extractor.extract(email));
    }

    let vocabulary = TfidfVocabulary::fit(&docs, config.max_features);
    let scaler = SignalScaler::fit(&raw_signals);
    debug!(vocabulary = vocabulary.len(), "fitted vocabulary");

    let x: Vec<FeatureVector> = docs
        .iter()
        .zip(&raw_signals)
        .map(|(doc, raw)| FeatureVector::concat(&vocabulary.transform(doc), &scaler.scale(raw)))
        .collect();
    let y: Vec<Label> = corpus.iter().map(|(_, l)| *l).collect();

    let folds = stratified_folds(&y, config.cv_folds);
    let candidates: Vec<CandidateScore> = Algorithm::candidates()
        .iter()
        .map(|algorithm| score_candidate(*algorithm, &x, &y, &folds, config))
        .collect();

    for score in &candidates {
        info!(
            algorithm = %score.algorithm,
            accuracy = score.mean_accuracy,
            f1 = score.mean_f1,
            "cross-validation result"
        );
    }

    // Best mean accuracy; exact ties go to the simpler model class.
    // candidates is already in complexity order, so strict improvement
    // is the whole tie-break policy.
    let mut selected = &candidates[0];
    for candidate in &candidates[1..] {
        if candidate.mean_accuracy > selected.mean_accuracy {
            selected = candidate;
        }
    }
    let algorithm = selected.algorithm;
    info!(algorithm = %algorithm, accuracy = selected.mean_accuracy, "selected model");

    let params = fit_candidate(algorithm, &x, &y, config);
    let report = TrainingReport {
        selected: algorithm,
        candidates,
        examples: corpus.len(),
    };

    Ok(TrainedModel::new(
        MODEL_SCHEMA_VERSION,
        TEXT_PIPELINE_VERSION,
        vocabulary,
        scaler,
        params,
        Utc::now(),
        report,
    ))
}

fn fit_candidate(
    algorithm: Algorithm,
    x: &[FeatureVector],
    y: &[Label],
    config: &TrainingConfig,
) -> ClassifierParams {
    match algorithm {
        Algorithm::NaiveBayes => ClassifierParams::NaiveBayes(GaussianNb::fit(x, y)),
        Algorithm::LogisticRegression => {
            ClassifierParams::LogisticRegression(LogisticRegression::fit(x, y))
        }
        Algorithm::RandomForest => {
            ClassifierParams::RandomForest(RandomForest::fit(x, y, &config.forest))
        }
    }
}

fn score_candidate(
    algorithm: Algorithm,
    x: &[FeatureVector],
    y: &[Label],
    folds: &[usize],
    config: &TrainingConfig,
) -> CandidateScore {
    let n_folds = folds.iter().max().map(|m| m + 1).unwrap_or(0);
    let mut fold_accuracies = Vec::with_capacity(n_folds);
    let mut f1_sum = 0.0;

    for fold in 0..n_folds {
        let mut train_x = Vec::new();
        let mut train_y = Vec::new();
        let mut test_x = Vec::new();
        let mut test_y = Vec::new();
        for i in 0..x.len() {
            if folds[i] == fold {
                test_x.push(x[i].clone());
                test_y.push(y[i]);
            } else {
                train_x.push(x[i].clone());
                train_y.push(y[i]);
            }
        }

        let params = fit_candidate(algorithm, &train_x, &train_y, config);
        let (accuracy, f1) = evaluate(&params, &test_x, &test_y);
        fold_accuracies.push(accuracy);
        f1_sum += f1;
    }

    let mean_accuracy = if fold_accuracies.is_empty() {
        0.0
    } else {
        fold_accuracies.iter().sum::<f64>() / fold_accuracies.len() as f64
    };
    let mean_f1 = if fold_accuracies.is_empty() {
        0.0
    } else {
        f1_sum / fold_accuracies.len() as f64
    };

    CandidateScore {
        algorithm,
        mean_accuracy,
        mean_f1,
        fold_accuracies,
    }
}

/// Accuracy and phishing-class F1 on a held-out partition
fn evaluate(params: &ClassifierParams, x: &[FeatureVector], y: &[Label]) -> (f64, f64) {
    let mut correct = 0usize;
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    for (xi, yi) in x.iter().zip(y) {
        let predicted = if params.predict_proba(xi) >= 0.5 {
            Label::Phishing
        } else {
            Label::Legitimate
        };
        if predicted == *yi {
            correct += 1;
        }
        match (predicted, *yi) {
            (Label::Phishing, Label::Phishing) => tp += 1,
            (Label::Phishing, Label::Legitimate) => fp += 1,
            (Label::Legitimate, Label::Phishing) => fn_ += 1,
            _ => {}
        }
    }
    let accuracy = correct as f64 / x.len().max(1) as f64;
    let f1 = if 2 * tp + fp + fn_ == 0 {
        0.0
    } else {
        2.0 * tp as f64 / (2 * tp + fp + fn_) as f64
    };
    (accuracy, f1)
}

/// Round-robin fold assignment within each class: deterministic, and every
/// fold preserves the corpus's label proportions as closely as integer
/// counts allow.
fn stratified_folds(y: &[Label], n_folds: usize) -> Vec<usize> {
    let n_folds = n_folds.max(2);
    let mut folds = vec![0; y.len()];
    for label in [Label::Legitimate, Label::Phishing] {
        for (position, index) in y
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == label)
            .map(|(i, _)| i)
            .enumerate()
        {
            folds[index] = position % n_folds;
        }
    }
    folds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::sample_corpus;

    #[test]
    fn test_insufficient_data_rejected() {
        let corpus = vec![
            (
                RawEmail::new("a@x.com", "Urgent: verify now", "Click here immediately"),
                Label::Phishing,
            ),
            (
                RawEmail::new("b@x.com", "You won!", "Claim your prize now"),
                Label::Phishing,
            ),
        ];
        let err = train(&corpus, &TrainingConfig::default()).unwrap_err();
        match err {
            MailGuardError::InsufficientData { label, count, min } => {
                assert_eq!(label, Label::Legitimate);
                assert_eq!(count, 0);
                assert_eq!(min, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stratified_folds_balanced() {
        let y = vec![
            Label::Phishing,
            Label::Legitimate,
            Label::Phishing,
            Label::Legitimate,
            Label::Phishing,
            Label::Legitimate,
        ];
        let folds = stratified_folds(&y, 3);
        for fold in 0..3 {
            let phishing = y
                .iter()
                .zip(&folds)
                .filter(|(l, f)| **l == Label::Phishing && **f == fold)
                .count();
            let legitimate = y
                .iter()
                .zip(&folds)
                .filter(|(l, f)| **l == Label::Legitimate && **f == fold)
                .count();
            assert_eq!(phishing, 1);
            assert_eq!(legitimate, 1);
        }
    }

    #[test]
    fn test_training_produces_scored_candidates() {
        let model = train(&sample_corpus(), &TrainingConfig::default()).unwrap();
        let report = model.report();
        assert_eq!(report.candidates.len(), 3);
        assert_eq!(report.examples, 20);
        for candidate in &report.candidates {
            assert!((0.0..=1.0).contains(&candidate.mean_accuracy));
            assert_eq!(candidate.fold_accuracies.len(), 3);
        }
        // The winner's score is the maximum
        let best = report
            .candidates
            .iter()
            .map(|c| c.mean_accuracy)
            .fold(f64::MIN, f64::max);
        let selected = report
            .candidates
            .iter()
            .find(|c| c.algorithm == report.selected)
            .unwrap();
        assert_eq!(selected.mean_accuracy, best);
    }

    #[test]
    fn test_training_is_deterministic() {
        let corpus = sample_corpus();
        let config = TrainingConfig::default();
        let a = train(&corpus, &config).unwrap();
        let b = train(&corpus, &config).unwrap();
        assert_eq!(a.report().selected, b.report().selected);
        assert_eq!(a.vocabulary().terms(), b.vocabulary().terms());
    }
}
