//! Feature vector for the classifiers

/// Fixed-size feature vector: lexical TF-IDF block first, signal block last.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    data: Vec<f64>,
    dim: usize,
}

impl FeatureVector {
    /// Create from a slice
    pub fn from_slice(data: &[f64]) -> Self {
        Self {
            dim: data.len(),
            data: data.to_vec(),
        }
    }

    /// Concatenate a lexical block and a signal block, lexical first.
    ///
    /// The ordering is part of the vectorization schema; training and
    /// inference must agree on it or predictions are silently wrong.
    pub fn concat(lexical: &[f64], signals: &[f64]) -> Self {
        let mut data = Vec::with_capacity(lexical.len() + signals.len());
        data.extend_from_slice(lexical);
        data.extend_from_slice(signals);
        Self {
            dim: data.len(),
            data,
        }
    }

    /// Get feature at index (0.0 out of range)
    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        self.data.get(index).copied().unwrap_or(0.0)
    }

    /// Get dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get as slice
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
