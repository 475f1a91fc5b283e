use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

use crate::error::NormalizationError;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{Alphabetic}+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
            "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
            "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "down",
            "during", "each", "few", "for", "from", "further", "had", "has", "have", "having",
            "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "if", "in",
            "into", "is", "it", "its", "itself", "me", "more", "most", "my", "myself", "no",
            "nor", "not", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
            "ourselves", "out", "over", "own", "same", "she", "should", "so", "some", "such",
            "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
            "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
            "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
            "whom", "why", "with", "would", "you", "your", "yours", "yourself", "yourselves",
        ];
        words.iter().copied().collect()
    };
}

/// The narrow interface the engine consumes text through. Implementations
/// must be deterministic: the same input always yields the same token
/// sequence, and the same rules apply at indexing time and query time.
pub trait Normalizer: Sync {
    /// Normalized token stream for one document, in document order.
    fn tokens(&self, text: &str) -> Result<Vec<String>, NormalizationError>;

    /// Normalize a single query word with the same rules as [`tokens`].
    /// Words the normalizer would drop entirely (stopwords, too short)
    /// fall back to plain lowercase so a boolean leaf still gets a
    /// byte-comparable term to look up.
    ///
    /// [`tokens`]: Normalizer::tokens
    fn term(&self, word: &str) -> String {
        self.tokens(word)
            .ok()
            .and_then(|t| t.into_iter().next())
            .unwrap_or_else(|| word.to_lowercase())
    }
}

/// Default normalizer: NFKC fold, lowercase, alphabetic words of length
/// two or more, stopword removal. No stemming or lemmatization; a
/// morphological collaborator can be swapped in through the trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleNormalizer;

impl Normalizer for SimpleNormalizer {
    fn tokens(&self, text: &str) -> Result<Vec<String>, NormalizationError> {
        let folded = text.nfkc().collect::<String>().to_lowercase();
        let tokens: Vec<String> = WORD
            .find_iter(&folded)
            .map(|m| m.as_str().to_string())
            .filter(|t| t.chars().count() > 1 && !STOPWORDS.contains(t.as_str()))
            .collect();
        if tokens.is_empty() {
            return Err(NormalizationError("no indexable tokens".into()));
        }
        Ok(tokens)
    }
}
