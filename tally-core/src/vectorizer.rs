//! Bag-of-words vectorizer: vocabulary fitting and sparse count vectors

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use tracing::{debug, warn};

use crate::tokenizer::Tokenizer;

/// Token → column mapping built from one training corpus.
///
/// Columns are assigned in lexicographic token order, so the same training
/// texts always produce the same vocabulary. Immutable once built; refitting
/// produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vocabulary {
    terms: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    /// Hash of `terms`; stamped on every vector built against this vocabulary
    #[serde(skip)]
    fingerprint: u64,
}

impl Vocabulary {
    fn from_terms(terms: BTreeSet<String>) -> Self {
        let terms: Vec<String> = terms.into_iter().collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        let mut hasher = DefaultHasher::new();
        terms.hash(&mut hasher);
        Self {
            fingerprint: hasher.finish(),
            terms,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Feature names in column order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Identifies the exact term list; equal vocabularies share a fingerprint
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

/// Sparse token-count vector over a [`Vocabulary`].
///
/// `dim` and `vocabulary` identify the vocabulary it was computed against;
/// entries are `(column, count)` pairs sorted by column with no zero counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureVector {
    dim: usize,
    vocabulary: u64,
    entries: Vec<(usize, u32)>,
}

impl FeatureVector {
    pub fn from_counts(vocabulary: &Vocabulary, counts: impl IntoIterator<Item = (usize, u32)>) -> Self {
        let mut merged: BTreeMap<usize, u32> = BTreeMap::new();
        for (col, n) in counts {
            if n > 0 {
                *merged.entry(col).or_insert(0) += n;
            }
        }
        Self {
            dim: vocabulary.len(),
            vocabulary: vocabulary.fingerprint(),
            entries: merged.into_iter().collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// [`Vocabulary::fingerprint`] of the vocabulary this vector was built against
    pub fn vocabulary(&self) -> u64 {
        self.vocabulary
    }

    pub fn entries(&self) -> &[(usize, u32)] {
        &self.entries
    }

    pub fn count(&self, column: usize) -> u32 {
        self.entries
            .binary_search_by_key(&column, |&(c, _)| c)
            .map(|i| self.entries[i].1)
            .unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|&(_, n)| u64::from(n)).sum()
    }

    /// True when no token of the source text was in the vocabulary
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CountVectorizer {
    tokenizer: Tokenizer,
}

impl CountVectorizer {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Collect every distinct token of the training texts.
    pub fn fit<S: AsRef<str>>(&self, texts: &[S]) -> Vocabulary {
        let terms: BTreeSet<String> = texts
            .iter()
            .flat_map(|t| self.tokenizer.tokenize(t.as_ref()))
            .collect();

        let vocabulary = Vocabulary::from_terms(terms);
        if vocabulary.is_empty() {
            warn!(texts = texts.len(), "fitted an empty vocabulary; predictions will use priors only");
        } else {
            debug!(texts = texts.len(), terms = vocabulary.len(), "fitted vocabulary");
        }
        vocabulary
    }

    /// Count vector of one text. Out-of-vocabulary tokens are ignored.
    pub fn transform_one(&self, text: &str, vocabulary: &Vocabulary) -> FeatureVector {
        let counts = self
            .tokenizer
            .tokenize(text)
            .into_iter()
            .filter_map(|tok| vocabulary.index_of(&tok))
            .map(|col| (col, 1));
        FeatureVector::from_counts(vocabulary, counts)
    }

    pub fn transform<S: AsRef<str>>(&self, texts: &[S], vocabulary: &Vocabulary) -> Vec<FeatureVector> {
        texts
            .iter()
            .map(|t| self.transform_one(t.as_ref(), vocabulary))
            .collect()
    }

    pub fn fit_transform<S: AsRef<str>>(&self, texts: &[S]) -> (Vocabulary, Vec<FeatureVector>) {
        let vocabulary = self.fit(texts);
        let vectors = self.transform(texts, &vocabulary);
        (vocabulary, vectors)
    }
}
