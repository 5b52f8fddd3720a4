//! Multinomial Naive Bayes over sparse count vectors.
//!
//! Categories are discovered from the training labels and kept in
//! lexicographic order. That order is also the tie-break: when two
//! categories score exactly the same, the one that sorts first wins.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{ClassifyError, Result};
use crate::vectorizer::FeatureVector;

pub const DEFAULT_ALPHA: f64 = 1.0;

/// Outcome of classifying one vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub category: String,
    /// log P(category) + Σ count · log P(token | category)
    pub log_score: f64,
    /// Normalised posterior of the winning category (0.0 - 1.0)
    pub posterior: f64,
    /// No token of the record was in the vocabulary; decided by priors alone
    pub prior_only: bool,
}

/// A fitted model. The only way to obtain one is [`MultinomialNb::fit`],
/// so there is no "predict before fit" state.
#[derive(Debug, Clone)]
pub struct MultinomialNb {
    classes: Vec<String>,
    class_count: Vec<usize>,
    class_log_prior: Vec<f64>,
    /// Per class, per column: log P(token | class)
    feature_log_prob: Vec<Vec<f64>>,
    n_features: usize,
    /// Fingerprint of the training vocabulary
    vocabulary: u64,
}

impl MultinomialNb {
    /// Fit with Laplace smoothing α:
    /// `P(t|c) = (count(t,c) + α) / (total(c) + α·|V|)`, `P(c) = n(c) / n`.
    pub fn fit<L: AsRef<str>>(vectors: &[FeatureVector], labels: &[L], alpha: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(ClassifyError::InvalidSmoothing(alpha));
        }
        if vectors.len() != labels.len() {
            return Err(ClassifyError::LabelCountMismatch {
                vectors: vectors.len(),
                labels: labels.len(),
            });
        }
        if vectors.is_empty() {
            return Err(ClassifyError::EmptyTrainingSet);
        }

        let n_features = vectors[0].dim();
        if let Some(bad) = vectors.iter().find(|v| v.dim() != n_features) {
            return Err(ClassifyError::DimensionMismatch {
                expected: n_features,
                found: bad.dim(),
            });
        }
        let vocabulary = vectors[0].vocabulary();
        if vectors.iter().any(|v| v.vocabulary() != vocabulary) {
            return Err(ClassifyError::VocabularyMismatch);
        }

        // label -> (example count, per-column token counts)
        let mut per_class: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
        for (fv, label) in vectors.iter().zip(labels) {
            let (n, counts) = per_class
                .entry(label.as_ref())
                .or_insert_with(|| (0, vec![0.0; n_features]));
            *n += 1;
            for &(col, c) in fv.entries() {
                counts[col] += f64::from(c);
            }
        }

        let total_examples = vectors.len() as f64;
        let smoothed_features = alpha * n_features as f64;

        let mut classes = Vec::with_capacity(per_class.len());
        let mut class_count = Vec::with_capacity(per_class.len());
        let mut class_log_prior = Vec::with_capacity(per_class.len());
        let mut feature_log_prob = Vec::with_capacity(per_class.len());

        for (label, (n, counts)) in per_class {
            let total_tokens: f64 = counts.iter().sum();
            let denom = (total_tokens + smoothed_features).ln();

            classes.push(label.to_string());
            class_count.push(n);
            class_log_prior.push((n as f64 / total_examples).ln());
            feature_log_prob.push(counts.iter().map(|c| (c + alpha).ln() - denom).collect());
        }

        debug!(
            examples = vectors.len(),
            classes = classes.len(),
            features = n_features,
            "fitted naive bayes"
        );

        Ok(Self {
            classes,
            class_count,
            class_log_prior,
            feature_log_prob,
            n_features,
            vocabulary,
        })
    }

    /// Category labels in sorted order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn class_count(&self, category: &str) -> usize {
        self.class_position(category)
            .map(|i| self.class_count[i])
            .unwrap_or(0)
    }

    /// (category, P(category)) pairs in label order
    pub fn priors(&self) -> Vec<(String, f64)> {
        self.classes
            .iter()
            .zip(&self.class_log_prior)
            .map(|(c, lp)| (c.clone(), lp.exp()))
            .collect()
    }

    /// log P(token | category) for one column
    pub fn token_log_prob(&self, category: &str, column: usize) -> Option<f64> {
        let i = self.class_position(category)?;
        self.feature_log_prob[i].get(column).copied()
    }

    fn class_position(&self, category: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(category))
            .ok()
    }

    /// Unnormalised log score of every class, in label order
    pub fn joint_log_likelihood(&self, fv: &FeatureVector) -> Result<Vec<f64>> {
        if fv.dim() != self.n_features {
            return Err(ClassifyError::DimensionMismatch {
                expected: self.n_features,
                found: fv.dim(),
            });
        }
        if fv.vocabulary() != self.vocabulary {
            return Err(ClassifyError::VocabularyMismatch);
        }

        Ok(self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_prob)| {
                prior
                    + fv.entries()
                        .iter()
                        .map(|&(col, n)| f64::from(n) * log_prob[col])
                        .sum::<f64>()
            })
            .collect())
    }

    pub fn predict(&self, fv: &FeatureVector) -> Result<Prediction> {
        let scores = self.joint_log_likelihood(fv)?;

        // Strict `>` keeps the earliest (lexicographically smallest) class on ties
        let mut best = 0;
        for (i, &s) in scores.iter().enumerate().skip(1) {
            if s > scores[best] {
                best = i;
            }
        }

        Ok(Prediction {
            category: self.classes[best].clone(),
            log_score: scores[best],
            posterior: posterior(&scores, best),
            prior_only: fv.is_empty(),
        })
    }

    pub fn predict_all(&self, vectors: &[FeatureVector]) -> Result<Vec<Prediction>> {
        vectors.iter().map(|fv| self.predict(fv)).collect()
    }
}

/// exp(scores[i]) / Σ exp(scores) computed with the log-sum-exp shift
fn posterior(scores: &[f64], i: usize) -> f64 {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = scores.iter().map(|s| (s - max).exp()).sum();
    (scores[i] - max).exp() / sum
}
