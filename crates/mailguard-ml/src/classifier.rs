//! Candidate classifiers
//!
//! The closed set of algorithms the trainer fits and compares: Gaussian
//! naive Bayes, logistic regression and a random forest. Selection is a
//! pure comparison over cross-validation scores in [`crate::train`]; there
//! is no open-ended dispatch. Every fit is deterministic - the forest uses
//! seeded RNG, the other two have no randomness at all.

use crate::features::FeatureVector;
use mailguard_common::Label;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Algorithm identifier stored in the model artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Gaussian naive Bayes (naive-probabilistic)
    NaiveBayes,
    /// Logistic regression (linear-probabilistic)
    LogisticRegression,
    /// Random forest (tree-ensemble)
    RandomForest,
}

impl Algorithm {
    /// Model-class complexity used for deterministic tie-breaking:
    /// on exact score ties the simpler class wins.
    pub fn complexity_rank(self) -> u8 {
        match self {
            Algorithm::NaiveBayes => 0,
            Algorithm::LogisticRegression => 1,
            Algorithm::RandomForest => 2,
        }
    }

    /// All candidates, in tie-break order
    pub fn candidates() -> [Algorithm; 3] {
        [
            Algorithm::NaiveBayes,
            Algorithm::LogisticRegression,
            Algorithm::RandomForest,
        ]
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::NaiveBayes => write!(f, "naive_bayes"),
            Algorithm::LogisticRegression => write!(f, "logistic_regression"),
            Algorithm::RandomForest => write!(f, "random_forest"),
        }
    }
}

/// Fitted parameters, tagged by algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassifierParams {
    /// Gaussian naive Bayes parameters
    NaiveBayes(GaussianNb),
    /// Logistic regression parameters
    LogisticRegression(LogisticRegression),
    /// Random forest parameters
    RandomForest(RandomForest),
}

impl ClassifierParams {
    /// The algorithm tag for these parameters
    pub fn algorithm(&self) -> Algorithm {
        match self {
            ClassifierParams::NaiveBayes(_) => Algorithm::NaiveBayes,
            ClassifierParams::LogisticRegression(_) => Algorithm::LogisticRegression,
            ClassifierParams::RandomForest(_) => Algorithm::RandomForest,
        }
    }

    /// Input dimension the parameters were fitted with
    pub fn input_dim(&self) -> usize {
        match self {
            ClassifierParams::NaiveBayes(nb) => nb.mean[0].len(),
            ClassifierParams::LogisticRegression(lr) => lr.weights.len(),
            ClassifierParams::RandomForest(rf) => rf.input_dim,
        }
    }

    /// Calibrated probability that `x` is phishing, in [0, 1]
    pub fn predict_proba(&self, x: &FeatureVector) -> f64 {
        let p = match self {
            ClassifierParams::NaiveBayes(nb) => nb.predict_proba(x),
            ClassifierParams::LogisticRegression(lr) => lr.predict_proba(x),
            ClassifierParams::RandomForest(rf) => rf.predict_proba(x),
        };
        p.clamp(0.0, 1.0)
    }
}

// =============================================================================
// Gaussian naive Bayes
// =============================================================================

/// Gaussian naive Bayes with variance smoothing.
///
/// Class-conditional log joints are normalized into a probability the same
/// way a two-class Bayesian word filter converts log scores: subtract the
/// max before exponentiating to avoid underflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNb {
    /// Class priors, indexed by [`Label::index`]
    priors: [f64; 2],
    /// Per-class feature means
    mean: [Vec<f64>; 2],
    /// Per-class smoothed feature variances
    var: [Vec<f64>; 2],
}

impl GaussianNb {
    /// Fit on feature vectors and labels
    pub fn fit(x: &[FeatureVector], y: &[Label]) -> Self {
        let n = x.len();
        let dim = x.first().map(FeatureVector::dim).unwrap_or(0);
        let mut counts = [0usize; 2];
        let mut mean = [vec![0.0; dim], vec![0.0; dim]];
        for (xi, yi) in x.iter().zip(y) {
            let c = yi.index();
            counts[c] += 1;
            for (m, v) in mean[c].iter_mut().zip(xi.as_slice()) {
                *m += v;
            }
        }
        for c in 0..2 {
            let denom = counts[c].max(1) as f64;
            for m in &mut mean[c] {
                *m /= denom;
            }
        }

        let mut var = [vec![0.0; dim], vec![0.0; dim]];
        for (xi, yi) in x.iter().zip(y) {
            let c = yi.index();
            for ((v, m), value) in var[c].iter_mut().zip(&mean[c]).zip(xi.as_slice()) {
                let d = value - m;
                *v += d * d;
            }
        }
        // Smoothing proportional to the largest variance, with an absolute
        // floor for fully constant features
        let mut max_var = 0.0f64;
        for c in 0..2 {
            let denom = counts[c].max(1) as f64;
            for v in &mut var[c] {
                *v /= denom;
                max_var = max_var.max(*v);
            }
        }
        let eps = (1e-9 * max_var).max(1e-12);
        for c in 0..2 {
            for v in &mut var[c] {
                *v += eps;
            }
        }

        let priors = [counts[0] as f64 / n as f64, counts[1] as f64 / n as f64];
        Self { priors, mean, var }
    }

    /// Probability of the phishing class
    pub fn predict_proba(&self, x: &FeatureVector) -> f64 {
        let mut log_joint = [0.0f64; 2];
        for c in 0..2 {
            let mut lp = self.priors[c].max(f64::MIN_POSITIVE).ln();
            for ((value, m), v) in x.as_slice().iter().zip(&self.mean[c]).zip(&self.var[c]) {
                let d = value - m;
                lp += -0.5 * (2.0 * std::f64::consts::PI * v).ln() - d * d / (2.0 * v);
            }
            log_joint[c] = lp;
        }
        let max_log = log_joint[0].max(log_joint[1]);
        let p0 = (log_joint[0] - max_log).exp();
        let p1 = (log_joint[1] - max_log).exp();
        p1 / (p0 + p1)
    }
}

// =============================================================================
// Logistic regression
// =============================================================================

/// L2-regularized logistic regression fitted by full-batch gradient descent.
///
/// Zero initialization and a fixed epoch count keep the fit deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticRegression {
    const EPOCHS: usize = 400;
    const LEARNING_RATE: f64 = 0.5;
    const L2: f64 = 1e-4;

    /// Fit on feature vectors and labels
    pub fn fit(x: &[FeatureVector], y: &[Label]) -> Self {
        let n = x.len().max(1);
        let dim = x.first().map(FeatureVector::dim).unwrap_or(0);
        let mut weights = vec![0.0; dim];
        let mut bias = 0.0;

        for _ in 0..Self::EPOCHS {
            let mut grad_w = vec![0.0; dim];
            let mut grad_b = 0.0;
            for (xi, yi) in x.iter().zip(y) {
                let z = xi
                    .as_slice()
                    .iter()
                    .zip(&weights)
                    .map(|(a, b)| a * b)
                    .sum::<f64>()
                    + bias;
                let err = sigmoid(z) - yi.index() as f64;
                for (g, value) in grad_w.iter_mut().zip(xi.as_slice()) {
                    *g += err * value;
                }
                grad_b += err;
            }
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= Self::LEARNING_RATE * (g / n as f64 + Self::L2 * *w);
            }
            bias -= Self::LEARNING_RATE * grad_b / n as f64;
        }

        Self { weights, bias }
    }

    /// Probability of the phishing class
    pub fn predict_proba(&self, x: &FeatureVector) -> f64 {
        let z = x
            .as_slice()
            .iter()
            .zip(&self.weights)
            .map(|(a, b)| a * b)
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

// =============================================================================
// Random forest
// =============================================================================

/// Random forest of Gini-split CART trees over bootstrap samples.
///
/// All randomness flows from the seed, so a refit with identical data and
/// configuration reproduces the identical forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<Tree>,
    input_dim: usize,
}

/// Forest hyperparameters
#[derive(Debug, Clone, Copy)]
pub struct ForestConfig {
    /// Number of trees
    pub n_trees: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// RNG seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 50,
            max_depth: 10,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        prob: f64,
    },
}

impl RandomForest {
    /// Fit a forest on feature vectors and labels
    pub fn fit(x: &[FeatureVector], y: &[Label], config: &ForestConfig) -> Self {
        let n = x.len();
        let input_dim = x.first().map(FeatureVector::dim).unwrap_or(0);
        let labels: Vec<usize> = y.iter().map(|l| l.index()).collect();

        let trees = (0..config.n_trees)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(t as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut tree = Tree { nodes: Vec::new() };
                build_node(
                    &mut tree,
                    x,
                    &labels,
                    &sample,
                    0,
                    config.max_depth,
                    input_dim,
                    &mut rng,
                );
                tree
            })
            .collect();

        Self { trees, input_dim }
    }

    /// Probability of the phishing class: mean leaf probability over trees
    pub fn predict_proba(&self, x: &FeatureVector) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        sum / self.trees.len() as f64
    }
}

impl Tree {
    fn predict(&self, x: &FeatureVector) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { prob } => return *prob,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Recursively grow one node; returns its index in the tree's node list.
#[allow(clippy::too_many_arguments)]
fn build_node(
    tree: &mut Tree,
    x: &[FeatureVector],
    labels: &[usize],
    sample: &[usize],
    depth: usize,
    max_depth: usize,
    input_dim: usize,
    rng: &mut StdRng,
) -> usize {
    let positives = sample.iter().filter(|i| labels[**i] == 1).count();
    let prob = positives as f64 / sample.len().max(1) as f64;

    if depth >= max_depth || sample.len() < 2 || positives == 0 || positives == sample.len() {
        tree.nodes.push(TreeNode::Leaf { prob });
        return tree.nodes.len() - 1;
    }

    let Some((feature, threshold)) = best_split(x, labels, sample, input_dim, rng) else {
        tree.nodes.push(TreeNode::Leaf { prob });
        return tree.nodes.len() - 1;
    };

    let (left_sample, right_sample): (Vec<usize>, Vec<usize>) = sample
        .iter()
        .partition(|i| x[**i].get(feature) <= threshold);
    if left_sample.is_empty() || right_sample.is_empty() {
        tree.nodes.push(TreeNode::Leaf { prob });
        return tree.nodes.len() - 1;
    }

    // Reserve this node's slot before recursing
    let index = tree.nodes.len();
    tree.nodes.push(TreeNode::Leaf { prob });
    let left = build_node(
        tree,
        x,
        labels,
        &left_sample,
        depth + 1,
        max_depth,
        input_dim,
        rng,
    );
    let right = build_node(
        tree,
        x,
        labels,
        &right_sample,
        depth + 1,
        max_depth,
        input_dim,
        rng,
    );
    tree.nodes[index] = TreeNode::Split {
        feature,
        threshold,
        left,
        right,
    };
    index
}

/// Pick the best Gini split over a random sqrt-sized feature subset.
/// Ties resolve to the lowest (feature, threshold), keeping the result a
/// pure function of the RNG stream and the data.
fn best_split(
    x: &[FeatureVector],
    labels: &[usize],
    sample: &[usize],
    input_dim: usize,
    rng: &mut StdRng,
) -> Option<(usize, f64)> {
    if input_dim == 0 {
        return None;
    }
    let n_features = (input_dim as f64).sqrt().ceil() as usize;
    let mut candidates: Vec<usize> = Vec::with_capacity(n_features);
    while candidates.len() < n_features.min(input_dim) {
        let f = rng.gen_range(0..input_dim);
        if !candidates.contains(&f) {
            candidates.push(f);
        }
    }
    candidates.sort_unstable();

    let parent_gini = gini(labels, sample);
    let mut best: Option<(f64, usize, f64)> = None;

    for &feature in &candidates {
        let mut values: Vec<f64> = sample.iter().map(|i| x[*i].get(feature)).collect();
        values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup();
        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let (left, right): (Vec<usize>, Vec<usize>) = sample
                .iter()
                .partition(|i| x[**i].get(feature) <= threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let weighted = (left.len() as f64 * gini(labels, &left)
                + right.len() as f64 * gini(labels, &right))
                / sample.len() as f64;
            let gain = parent_gini - weighted;
            if gain <= 1e-12 {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_gain, bf, bt)) => {
                    gain > best_gain + 1e-12
                        || ((gain - best_gain).abs() <= 1e-12
                            && (feature, threshold) < (bf, bt))
                }
            };
            if better {
                best = Some((gain, feature, threshold));
            }
        }
    }

    best.map(|(_, feature, threshold)| (feature, threshold))
}

fn gini(labels: &[usize], sample: &[usize]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    let positives = sample.iter().filter(|i| labels[**i] == 1).count() as f64;
    let p = positives / sample.len() as f64;
    2.0 * p * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated clusters in 2D
    fn toy_data() -> (Vec<FeatureVector>, Vec<Label>) {
        let x = vec![
            FeatureVector::from_slice(&[0.9, 0.8]),
            FeatureVector::from_slice(&[0.8, 0.9]),
            FeatureVector::from_slice(&[1.0, 0.7]),
            FeatureVector::from_slice(&[0.7, 1.0]),
            FeatureVector::from_slice(&[0.1, 0.2]),
            FeatureVector::from_slice(&[0.2, 0.1]),
            FeatureVector::from_slice(&[0.0, 0.3]),
            FeatureVector::from_slice(&[0.3, 0.0]),
        ];
        let y = vec![
            Label::Phishing,
            Label::Phishing,
            Label::Phishing,
            Label::Phishing,
            Label::Legitimate,
            Label::Legitimate,
            Label::Legitimate,
            Label::Legitimate,
        ];
        (x, y)
    }

    #[test]
    fn test_naive_bayes_separates_clusters() {
        let (x, y) = toy_data();
        let nb = GaussianNb::fit(&x, &y);
        assert!(nb.predict_proba(&FeatureVector::from_slice(&[0.85, 0.85])) > 0.5);
        assert!(nb.predict_proba(&FeatureVector::from_slice(&[0.15, 0.15])) < 0.5);
    }

    #[test]
    fn test_logistic_regression_separates_clusters() {
        let (x, y) = toy_data();
        let lr = LogisticRegression::fit(&x, &y);
        assert!(lr.predict_proba(&FeatureVector::from_slice(&[0.85, 0.85])) > 0.5);
        assert!(lr.predict_proba(&FeatureVector::from_slice(&[0.15, 0.15])) < 0.5);
    }

    #[test]
    fn test_random_forest_separates_clusters() {
        let (x, y) = toy_data();
        let rf = RandomForest::fit(&x, &y, &ForestConfig::default());
        assert!(rf.predict_proba(&FeatureVector::from_slice(&[0.85, 0.85])) > 0.5);
        assert!(rf.predict_proba(&FeatureVector::from_slice(&[0.15, 0.15])) < 0.5);
    }

    #[test]
    fn test_forest_fit_is_deterministic() {
        let (x, y) = toy_data();
        let config = ForestConfig::default();
        let a = RandomForest::fit(&x, &y, &config);
        let b = RandomForest::fit(&x, &y, &config);
        let probe = FeatureVector::from_slice(&[0.6, 0.4]);
        assert_eq!(a.predict_proba(&probe), b.predict_proba(&probe));
    }

    #[test]
    fn test_probabilities_bounded() {
        let (x, y) = toy_data();
        let params = [
            ClassifierParams::NaiveBayes(GaussianNb::fit(&x, &y)),
            ClassifierParams::LogisticRegression(LogisticRegression::fit(&x, &y)),
            ClassifierParams::RandomForest(RandomForest::fit(&x, &y, &ForestConfig::default())),
        ];
        for p in &params {
            for xi in &x {
                let prob = p.predict_proba(xi);
                assert!((0.0..=1.0).contains(&prob), "{} out of range", prob);
            }
        }
    }

    #[test]
    fn test_tie_break_order() {
        let ranks: Vec<u8> = Algorithm::candidates()
            .iter()
            .map(|a| a.complexity_rank())
            .collect();
        assert_eq!(ranks, vec![0, 1, 2]);
    }
}
