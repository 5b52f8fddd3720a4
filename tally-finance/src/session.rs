//! Classification session: owns the training set, the corpus and the fitted
//! model, and keeps them consistent.
//!
//! Every mutation refits from scratch: re-tokenize and re-vectorize the whole
//! training set, refit the classifier, re-predict the whole corpus. The new
//! model is built before anything is committed, so a correction is observed
//! either fully applied or not at all.

use serde::{Deserialize, Serialize};
use std::iter;
use tally_core::{
    CountVectorizer, MultinomialNb, Prediction, Tokenizer, TokenizerConfig, Vocabulary,
    DEFAULT_ALPHA,
};
use tally_ingest::{category_problem, LabeledTransaction, Transaction};
use tracing::{debug, info};

use crate::error::{Result, SessionError};
use crate::overview::{group_by_category, summarize, CategoryGroup, CategoryTotal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub tokenizer: TokenizerConfig,
    /// Additive smoothing for the classifier
    pub alpha: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Everything derived from one training set
#[derive(Debug, Clone)]
struct Fitted {
    vocabulary: Vocabulary,
    model: MultinomialNb,
    predictions: Vec<Prediction>,
    groups: Vec<CategoryGroup>,
}

/// State exposed by [`ClassificationSession::debug_snapshot`]
#[derive(Debug, Clone, Serialize)]
pub struct DebugSnapshot<'a> {
    pub feature_names: &'a [String],
    pub training_texts: Vec<String>,
    pub training_labels: Vec<&'a str>,
    pub priors: Vec<(String, f64)>,
}

#[derive(Debug)]
pub struct ClassificationSession {
    vectorizer: CountVectorizer,
    alpha: f64,
    training: Vec<LabeledTransaction>,
    corpus: Vec<Transaction>,
    amounts: Vec<f64>,
    fitted: Fitted,
}

impl ClassificationSession {
    /// Build a session and run the first fit.
    ///
    /// Fails if the training set is empty, if any corpus amount does not
    /// parse, or if the settings are invalid.
    pub fn new(
        training: Vec<LabeledTransaction>,
        corpus: Vec<Transaction>,
        settings: &SessionSettings,
    ) -> Result<Self> {
        let vectorizer = CountVectorizer::new(Tokenizer::new(&settings.tokenizer)?);
        let amounts = corpus
            .iter()
            .map(Transaction::amount)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let fitted = fit(&vectorizer, settings.alpha, training.iter(), &corpus)?;
        info!(
            training = training.len(),
            corpus = corpus.len(),
            categories = fitted.model.classes().len(),
            "session ready"
        );

        Ok(Self {
            vectorizer,
            alpha: settings.alpha,
            training,
            corpus,
            amounts,
            fitted,
        })
    }

    pub fn training_set(&self) -> &[LabeledTransaction] {
        &self.training
    }

    pub fn corpus(&self) -> &[Transaction] {
        &self.corpus
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.fitted.vocabulary
    }

    pub fn feature_names(&self) -> &[String] {
        self.fitted.vocabulary.terms()
    }

    pub fn model(&self) -> &MultinomialNb {
        &self.fitted.model
    }

    /// One prediction per corpus item, in corpus order
    pub fn predict_all(&self) -> &[Prediction] {
        &self.fitted.predictions
    }

    pub fn prediction(&self, item_id: usize) -> Option<&Prediction> {
        self.fitted.predictions.get(item_id)
    }

    /// (category, total amount, item count) per predicted category, ascending
    /// by total; ties keep the order in which categories first appear.
    pub fn overview(&self) -> Vec<CategoryTotal> {
        summarize(&self.fitted.groups, &self.amounts)
    }

    /// Corpus items predicted into `category`, with their item ids.
    pub fn list_category(&self, category: &str) -> Result<Vec<(usize, &Transaction)>> {
        let group = self
            .fitted
            .groups
            .iter()
            .find(|g| g.category == category)
            .ok_or_else(|| SessionError::UnknownCategory(category.to_string()))?;

        Ok(group.items.iter().map(|&i| (i, &self.corpus[i])).collect())
    }

    /// Record that corpus item `item_id` belongs to `category`, then refit.
    ///
    /// The training set is left untouched if validation or the refit fails.
    pub fn categorize(&mut self, item_id: usize, category: &str) -> Result<()> {
        if item_id >= self.corpus.len() {
            return Err(SessionError::IndexOutOfRange {
                index: item_id,
                len: self.corpus.len(),
            });
        }
        if let Some(reason) = category_problem(category) {
            return Err(SessionError::InvalidCategory {
                category: category.to_string(),
                reason,
            });
        }

        let example = LabeledTransaction::new(self.corpus[item_id].clone(), category);
        let fitted = fit(
            &self.vectorizer,
            self.alpha,
            self.training.iter().chain(iter::once(&example)),
            &self.corpus,
        )?;

        info!(item_id, category, training = self.training.len() + 1, "added correction");
        self.training.push(example);
        self.fitted = fitted;
        Ok(())
    }

    /// Corpus paired with predicted categories, for saving
    pub fn labeled_corpus(&self) -> impl Iterator<Item = (&Transaction, &str)> {
        self.corpus
            .iter()
            .zip(&self.fitted.predictions)
            .map(|(t, p)| (t, p.category.as_str()))
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot<'_> {
        DebugSnapshot {
            feature_names: self.feature_names(),
            training_texts: self.training.iter().map(|e| e.transaction.text()).collect(),
            training_labels: self.training.iter().map(|e| e.category.as_str()).collect(),
            priors: self.fitted.model.priors(),
        }
    }
}

fn fit<'a>(
    vectorizer: &CountVectorizer,
    alpha: f64,
    training: impl Iterator<Item = &'a LabeledTransaction>,
    corpus: &[Transaction],
) -> Result<Fitted> {
    let (texts, labels): (Vec<String>, Vec<&str>) = training
        .map(|e| (e.transaction.text(), e.category.as_str()))
        .unzip();

    let (vocabulary, vectors) = vectorizer.fit_transform(&texts);
    let model = MultinomialNb::fit(&vectors, &labels, alpha)?;

    let corpus_texts: Vec<String> = corpus.iter().map(Transaction::text).collect();
    let corpus_vectors = vectorizer.transform(&corpus_texts, &vocabulary);
    let predictions = model.predict_all(&corpus_vectors)?;
    let groups = group_by_category(&predictions);

    debug!(
        features = vocabulary.len(),
        prior_only = predictions.iter().filter(|p| p.prior_only).count(),
        "refit complete"
    );

    Ok(Fitted {
        vocabulary,
        model,
        predictions,
        groups,
    })
}
