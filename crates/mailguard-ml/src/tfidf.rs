//! TF-IDF vocabulary and weighting
//!
//! Learned at training time, applied read-only at inference. The learned
//! token→index mapping must be reproducible: vocabulary selection sorts by
//! (document frequency desc, term asc) and the final index is alphabetical,
//! so permuting the training corpus row order cannot change it.

use mailguard_text::NormalizedDocument;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed vocabulary with smoothed inverse-document-frequency weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVocabulary {
    /// Terms in index order (alphabetical)
    terms: Vec<String>,
    /// Smoothed IDF weight per term, same order as `terms`
    idf: Vec<f64>,
    /// Documents seen at fit time
    n_docs: usize,
}

impl TfidfVocabulary {
    /// Learn a vocabulary of at most `max_features` terms from the corpus.
    ///
    /// Terms are ranked by document frequency with an alphabetical
    /// tie-break before truncation; the surviving terms are then indexed
    /// alphabetically. Both orderings are total, so the result is
    /// independent of corpus row order.
    pub fn fit(docs: &[NormalizedDocument], max_features: usize) -> Self {
        let n_docs = docs.len();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in docs {
            let mut seen: Vec<&str> = doc.tokens().iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = doc_freq.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);

        let mut selected: Vec<(String, usize)> = ranked
            .into_iter()
            .map(|(term, df)| (term.to_string(), df))
            .collect();
        selected.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let idf = selected
            .iter()
            .map(|(_, df)| (((1 + n_docs) as f64) / ((1 + df) as f64)).ln() + 1.0)
            .collect();
        let terms = selected.into_iter().map(|(term, _)| term).collect();

        Self { terms, idf, n_docs }
    }

    /// TF-IDF weights for one document, L2-normalized.
    ///
    /// Out-of-vocabulary tokens contribute zero; this is deliberate, not a
    /// lossy accident, and is pinned by a test.
    pub fn transform(&self, doc: &NormalizedDocument) -> Vec<f64> {
        let mut weights = vec![0.0; self.terms.len()];
        for token in doc.tokens() {
            if let Ok(index) = self.terms.binary_search(token) {
                weights[index] += 1.0;
            }
        }
        for (weight, idf) in weights.iter_mut().zip(&self.idf) {
            *weight *= idf;
        }
        let norm: f64 = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 1e-12 {
            for weight in &mut weights {
                *weight /= norm;
            }
        }
        weights
    }

    /// Vocabulary size
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when no terms were learned
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in index order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Documents seen at fit time
    pub fn n_docs(&self) -> usize {
        self.n_docs
    }
}
