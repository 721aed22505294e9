use crate::error::KeywordError;
use crate::models::{KeywordConfig, NGRAM_RANGE};
use crate::stopwords::StopwordFilter;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

pub const TOKEN_PATTERN: &str = r"\b\w\w+\b";

// distinct terms in first-seen order, counts[i] belongs to terms[i]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    counts: Vec<u32>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.terms
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }

    fn cap(&mut self, max_terms: usize) {
        if self.terms.len() <= max_terms {
            return;
        }

        let mut ranked: Vec<usize> = (0..self.terms.len()).collect();
        // stable: equal counts keep the earlier feature
        ranked.sort_by(|&left, &right| self.counts[right].cmp(&self.counts[left]));
        ranked.truncate(max_terms);
        ranked.sort_unstable();

        let terms = std::mem::take(&mut self.terms);
        let counts = std::mem::take(&mut self.counts);
        let mut keep = vec![false; terms.len()];
        for index in ranked {
            keep[index] = true;
        }

        for ((term, count), kept) in terms.into_iter().zip(counts).zip(keep) {
            if kept {
                self.terms.push(term);
                self.counts.push(count);
            }
        }
    }
}

#[derive(Debug, Default)]
struct VocabularyBuilder {
    index: HashMap<String, usize>,
    vocabulary: Vocabulary,
}

impl VocabularyBuilder {
    fn observe(&mut self, term: String) {
        if let Some(&position) = self.index.get(&term) {
            self.vocabulary.counts[position] += 1;
            return;
        }

        self.index.insert(term.clone(), self.vocabulary.terms.len());
        self.vocabulary.terms.push(term);
        self.vocabulary.counts.push(1);
    }

    fn finish(self) -> Vocabulary {
        self.vocabulary
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    token_re: Regex,
    stopwords: StopwordFilter,
    max_vocabulary: usize,
}

impl Normalizer {
    pub fn new(config: &KeywordConfig) -> Result<Self, KeywordError> {
        config.validate()?;
        Ok(Self {
            token_re: Regex::new(TOKEN_PATTERN)?,
            stopwords: config.stopwords.clone(),
            max_vocabulary: config.max_vocabulary,
        })
    }

    pub fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.token_re
            .find_iter(&lowered)
            .map(|token| token.as_str())
            .filter(|token| !self.stopwords.is_stopword(token))
            .map(str::to_string)
            .collect()
    }

    pub fn vocabulary(&self, text: &str) -> Vocabulary {
        let tokens = self.tokens(text);
        let mut builder = VocabularyBuilder::default();

        let (min_n, max_n) = NGRAM_RANGE;
        for position in 0..tokens.len() {
            for n in min_n..=max_n {
                let Some(window) = tokens.get(position..position + n) else {
                    break;
                };
                // n-grams span removed stopwords; "apple apple" is not a term
                if n > 1 && window.iter().all(|token| *token == window[0]) {
                    continue;
                }
                builder.observe(window.join(" "));
            }
        }

        let mut vocabulary = builder.finish();
        let distinct = vocabulary.len();
        vocabulary.cap(self.max_vocabulary);

        debug!(
            tokens = tokens.len(),
            distinct_terms = distinct,
            kept_terms = vocabulary.len(),
            "built document vocabulary"
        );

        vocabulary
    }
}
