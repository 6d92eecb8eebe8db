use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::index::Term;

// A word character, `#` or `@`, then 2..=24 word characters each optionally
// preceded by one apostrophe or hyphen.
const TOKEN_PATTERN: &str = r"[#@\w](?:['\-]?\w){2,24}";

const ENGLISH_STOPWORDS: &[&str] = &[
    "i","me","my","myself","we","our","ours","ourselves","you","you're","you've","you'll","you'd",
    "your","yours","yourself","yourselves","he","him","his","himself","she","she's","her","hers",
    "herself","it","it's","its","itself","they","them","their","theirs","themselves","what","which",
    "who","whom","this","that","that'll","these","those","am","is","are","was","were","be","been",
    "being","have","has","had","having","do","does","did","doing","a","an","the","and","but","if",
    "or","because","as","until","while","of","at","by","for","with","about","against","between",
    "into","through","during","before","after","above","below","to","from","up","down","in","out",
    "on","off","over","under","again","further","then","once","here","there","when","where","why",
    "how","all","any","both","each","few","more","most","other","some","such","no","nor","not",
    "only","own","same","so","than","too","very","s","t","can","will","just","don","don't","should",
    "should've","now","d","ll","m","o","re","ve","y","ain","aren","aren't","couldn","couldn't",
    "didn","didn't","doesn","doesn't","hadn","hadn't","hasn","hasn't","haven","haven't","isn",
    "isn't","ma","mightn","mightn't","mustn","mustn't","needn","needn't","shan","shan't","shouldn",
    "shouldn't","wasn","wasn't","weren","weren't","won","won't","wouldn","wouldn't",
];

/// Splits query text into normalized terms. Built once at startup and shared
/// read-only by every request.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    re: Regex,
    stopwords: HashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::english()
    }
}

impl Tokenizer {
    /// Tokenizer with the built-in English stopword list.
    pub fn english() -> Self {
        Self::with_stopwords(ENGLISH_STOPWORDS.iter().map(|w| w.to_string()))
    }

    /// Tokenizer that keeps every token.
    pub fn without_stopwords() -> Self {
        Self::with_stopwords(std::iter::empty())
    }

    pub fn with_stopwords<I: IntoIterator<Item = String>>(words: I) -> Self {
        // the repetition over a Unicode class needs more room than the default
        let re = RegexBuilder::new(TOKEN_PATTERN)
            .size_limit(64 * (1 << 20))
            .build()
            .expect("valid token pattern");
        let stopwords = words
            .into_iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { re, stopwords }
    }

    /// Loads a newline-delimited stopword file. An unreadable file disables
    /// stopword filtering instead of failing.
    pub fn from_stopword_file(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => {
                let tok = Self::with_stopwords(text.lines().map(str::to_string));
                tracing::info!(path = %path.display(), count = tok.stopwords.len(), "loaded stopwords");
                tok
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "stopwords unavailable, filter disabled");
                Self::without_stopwords()
            }
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Terms in input order, duplicates kept. Matching runs up front; only
    /// stopword filtering and term construction happen as the iterator is
    /// consumed.
    pub fn terms<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Term> + 'a {
        let lowered = text.to_lowercase();
        let spans: Vec<(usize, usize)> = self
            .re
            .find_iter(&lowered)
            .map(|m| (m.start(), m.end()))
            .collect();
        spans.into_iter().filter_map(move |(start, end)| {
            let token = &lowered[start..end];
            if self.is_stopword(token) {
                return None;
            }
            Term::new(token)
        })
    }

    pub fn tokenize(&self, text: &str) -> Vec<Term> {
        self.terms(text).collect()
    }
}
