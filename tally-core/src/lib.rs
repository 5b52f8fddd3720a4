//! tally-core: tokenizer, bag-of-words vectorizer and multinomial Naive Bayes
//! for free-text transaction categorisation

pub mod error;
pub mod naive_bayes;
pub mod tokenizer;
pub mod vectorizer;

pub use error::{ClassifyError, Result};
pub use naive_bayes::{MultinomialNb, Prediction, DEFAULT_ALPHA};
pub use tokenizer::{Tokenizer, TokenizerConfig, DEFAULT_STOP_WORDS, DEFAULT_TOKEN_PATTERN};
pub use vectorizer::{CountVectorizer, FeatureVector, Vocabulary};
