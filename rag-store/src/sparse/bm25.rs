//! BM25 sparse encoder.
//!
//! Documents and queries are encoded asymmetrically:
//! - document weight per term: `tf / (tf + k1 * (1 - b + b * doc_len / avgdl))`
//! - query weight per term: `idf = ln((n_docs + 1) / (df + 0.5))`, normalized to sum 1
//!
//! Unseen query terms use `df = 1`. Statistics live in memory only and are
//! rebuilt by every `fit`.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::errors::RagError;
use crate::record::SparseValues;
use crate::sparse::tokenizer::{Tokenizer, term_index};

/// Saturation (`k1`) and length-normalization (`b`) parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

#[derive(Debug)]
struct Bm25Stats {
    n_docs: usize,
    avgdl: f32,
    doc_freq: HashMap<u32, u32>,
}

pub struct Bm25Encoder {
    params: Bm25Params,
    tokenizer: Tokenizer,
    stats: Option<Bm25Stats>,
}

impl Bm25Encoder {
    pub fn new(params: Bm25Params) -> Result<Self, RagError> {
        Ok(Self {
            params,
            tokenizer: Tokenizer::english()?,
            stats: None,
        })
    }

    /// Default-parameter encoder fitted on `corpus`.
    pub fn fitted<S: AsRef<str>>(corpus: &[S]) -> Result<Self, RagError> {
        let mut enc = Self::new(Bm25Params::default())?;
        enc.fit(corpus)?;
        Ok(enc)
    }

    pub fn is_fitted(&self) -> bool {
        self.stats.is_some()
    }

    /// Learns document frequencies and average document length.
    ///
    /// # Errors
    /// `RagError::EmptyCorpus` when the corpus is empty or has no indexable terms.
    pub fn fit<S: AsRef<str>>(&mut self, corpus: &[S]) -> Result<(), RagError> {
        if corpus.is_empty() {
            return Err(RagError::EmptyCorpus);
        }

        let mut doc_freq: HashMap<u32, u32> = HashMap::new();
        let mut total_len = 0usize;
        for doc in corpus {
            let counts = self.term_counts(doc.as_ref());
            total_len += counts.values().map(|c| *c as usize).sum::<usize>();
            for idx in counts.keys() {
                *doc_freq.entry(*idx).or_default() += 1;
            }
        }
        if total_len == 0 {
            return Err(RagError::EmptyCorpus);
        }

        let stats = Bm25Stats {
            n_docs: corpus.len(),
            avgdl: total_len as f32 / corpus.len() as f32,
            doc_freq,
        };
        debug!(
            n_docs = stats.n_docs,
            avgdl = stats.avgdl,
            vocab = stats.doc_freq.len(),
            "bm25 fitted"
        );
        self.stats = Some(stats);
        Ok(())
    }

    /// Term-frequency weights of a document.
    pub fn encode_document(&self, text: &str) -> Result<SparseValues, RagError> {
        let stats = self.stats.as_ref().ok_or(RagError::EncoderNotFitted)?;
        let counts = self.term_counts(text);
        let doc_len: u32 = counts.values().sum();
        let Bm25Params { k1, b } = self.params;
        let norm = k1 * (1.0 - b + b * doc_len as f32 / stats.avgdl);

        let mut out = SparseValues::default();
        for (idx, tf) in counts {
            let tf = tf as f32;
            out.indices.push(idx);
            out.values.push(tf / (tf + norm));
        }
        Ok(out)
    }

    /// Normalized inverse-document-frequency weights of a query.
    pub fn encode_query(&self, text: &str) -> Result<SparseValues, RagError> {
        let stats = self.stats.as_ref().ok_or(RagError::EncoderNotFitted)?;
        let counts = self.term_counts(text);

        let n = stats.n_docs as f32;
        let mut out = SparseValues::default();
        for idx in counts.keys() {
            let df = stats.doc_freq.get(idx).copied().unwrap_or(1) as f32;
            out.indices.push(*idx);
            out.values.push(((n + 1.0) / (df + 0.5)).ln());
        }

        let sum: f32 = out.values.iter().sum();
        if sum > 0.0 {
            out.values.iter_mut().for_each(|v| *v /= sum);
        }
        Ok(out)
    }

    fn term_counts(&self, text: &str) -> BTreeMap<u32, u32> {
        let mut counts = BTreeMap::new();
        for token in self.tokenizer.tokenize(text) {
            *counts.entry(term_index(&token)).or_default() += 1;
        }
        counts
    }
}
