//! Word tokenizer shared by the BM25 encoder and the hashing embedder.
//!
//! Lower-cases, splits into alphanumeric words, drops English stop words and
//! stems with the Snowball English stemmer.

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use crate::errors::RagError;

/// English stop words (NLTK list).
const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
    "will", "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn",
    "mustn", "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

pub struct Tokenizer {
    words: Regex,
    stemmer: Stemmer,
}

impl Tokenizer {
    /// English tokenizer.
    ///
    /// # Errors
    /// `RagError::Config` if the word pattern fails to compile.
    pub fn english() -> Result<Self, RagError> {
        let words = Regex::new(r"[\p{Alphabetic}\p{Nd}]+")
            .map_err(|e| RagError::Config(format!("tokenizer pattern: {e}")))?;
        Ok(Self {
            words,
            stemmer: Stemmer::create(Algorithm::English),
        })
    }

    /// Stemmed, stop-word-free tokens of `text` in order of appearance.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.words
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|w| !STOP_WORDS.contains(w))
            .map(|w| self.stemmer.stem(w).into_owned())
            .collect()
    }
}

/// Unsigned 32-bit term index of a token.
pub fn term_index(token: &str) -> u32 {
    let h = blake3::hash(token.as_bytes());
    let b = h.as_bytes();
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_punctuation_and_stop_words() {
        let t = Tokenizer::english().unwrap();
        assert_eq!(
            t.tokenize("What is Pinecone? It's a vector database!"),
            vec!["pinecon", "vector", "databas"]
        );
    }

    #[test]
    fn stems_inflections_to_same_token() {
        let t = Tokenizer::english().unwrap();
        assert_eq!(t.tokenize("running"), t.tokenize("runs"));
        assert!(t.tokenize("  ... the of ").is_empty());
    }

    #[test]
    fn term_index_is_stable() {
        assert_eq!(term_index("vector"), term_index("vector"));
        assert_ne!(term_index("vector"), term_index("databas"));
    }
}
