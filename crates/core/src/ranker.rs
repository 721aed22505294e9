use crate::error::KeywordError;
use crate::models::{KeywordConfig, KeywordList, TermWeight};
use crate::normalizer::{Normalizer, Vocabulary};
use tracing::debug;

// single document: idf is the same constant for every term, so plain l2 tf
pub fn term_weights(vocabulary: &Vocabulary) -> Vec<TermWeight> {
    let norm = vocabulary
        .counts()
        .iter()
        .map(|&count| f64::from(count) * f64::from(count))
        .sum::<f64>()
        .sqrt();

    vocabulary
        .iter()
        .map(|(term, count)| TermWeight {
            term: term.to_string(),
            weight: if norm > 0.0 {
                f64::from(count) / norm
            } else {
                0.0
            },
        })
        .collect()
}

pub fn select_top(weights: Vec<TermWeight>, top_n: usize) -> Vec<TermWeight> {
    let mut ordered = weights;
    // stable: ties stay in feature order
    ordered.sort_by(|left, right| right.weight.total_cmp(&left.weight));
    ordered.truncate(top_n);
    ordered.retain(|entry| entry.weight > 0.0);
    ordered
}

pub fn rank(text: &str, config: &KeywordConfig) -> Result<KeywordList, KeywordError> {
    Ok(KeywordRanker::new(config)?.rank(text))
}

#[derive(Debug, Clone)]
pub struct KeywordRanker {
    normalizer: Normalizer,
    top_n: usize,
}

impl KeywordRanker {
    pub fn new(config: &KeywordConfig) -> Result<Self, KeywordError> {
        Ok(Self {
            normalizer: Normalizer::new(config)?,
            top_n: config.top_n,
        })
    }

    pub fn rank(&self, text: &str) -> KeywordList {
        let vocabulary = self.normalizer.vocabulary(text);
        if vocabulary.is_empty() {
            debug!("no extractable vocabulary");
            return KeywordList::empty();
        }

        let vocabulary_size = vocabulary.len();
        let entries = select_top(term_weights(&vocabulary), self.top_n);

        debug!(
            vocabulary_size,
            selected = entries.len(),
            top_term = entries.first().map(|entry| entry.term.as_str()),
            "ranked document keywords"
        );

        KeywordList {
            entries,
            vocabulary_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RankStatus;

    const PETS: &str = "cats and dogs. cats are great pets. dogs are loyal pets.";

    fn config(top_n: usize) -> KeywordConfig {
        KeywordConfig::default().with_top_n(top_n)
    }

    #[test]
    fn ties_break_by_first_seen_order() {
        let keywords = rank(PETS, &config(3)).expect("ranking should succeed");
        assert_eq!(keywords.terms(), vec!["cats", "dogs", "pets"]);
        assert_eq!(keywords.status(), RankStatus::Ranked);
        assert_eq!(keywords.vocabulary_size, 12);
    }

    #[test]
    fn weight_vector_has_unit_norm() {
        let normalizer = Normalizer::new(&config(30)).expect("config is valid");
        for text in [PETS, "hydraulic pump pressure pump", "apple apple apple"] {
            let norm = term_weights(&normalizer.vocabulary(text))
                .iter()
                .map(|entry| entry.weight * entry.weight)
                .sum::<f64>()
                .sqrt();
            assert!((norm - 1.0).abs() < 1e-9, "norm was {norm} for {text:?}");
        }
    }

    #[test]
    fn output_is_sorted_and_bounded() {
        let keywords = rank(PETS, &config(5)).expect("ranking should succeed");
        assert_eq!(keywords.len(), 5);
        for pair in keywords.entries.windows(2) {
            assert!(pair[0].weight >= pair[1].weight);
        }
        // the two remaining slots go to the first singletons seen
        assert_eq!(keywords.terms()[3..], ["cats dogs", "dogs cats"]);
    }

    #[test]
    fn all_stopwords_give_empty_result() {
        let keywords = rank("the and of to", &config(30)).expect("empty vocabulary is not an error");
        assert!(keywords.is_empty());
        assert_eq!(keywords.status(), RankStatus::EmptyVocabulary);
    }

    #[test]
    fn single_repeated_word_has_unit_weight() {
        let keywords = rank("apple apple apple", &config(30)).expect("ranking should succeed");
        assert_eq!(keywords.terms(), vec!["apple"]);
        assert!((keywords.entries[0].weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn top_n_above_vocabulary_returns_whole_vocabulary() {
        let keywords = rank(PETS, &config(500)).expect("ranking should succeed");
        assert_eq!(keywords.len(), keywords.vocabulary_size);
        assert!(keywords.entries.iter().all(|entry| entry.weight > 0.0));
    }

    #[test]
    fn zero_top_n_is_rejected() {
        assert!(matches!(
            rank(PETS, &config(0)),
            Err(KeywordError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn terms_outside_the_cap_never_rank() {
        let text = "pump pump pump valve valve seal gasket";
        let capped = KeywordConfig::default()
            .with_top_n(30)
            .with_max_vocabulary(2);
        let keywords = rank(text, &capped).expect("ranking should succeed");

        assert_eq!(keywords.terms(), vec!["pump", "valve"]);
        assert!(!keywords.terms().contains(&"gasket"));
    }

    #[test]
    fn ranking_is_idempotent() {
        let first = rank(PETS, &config(4)).expect("ranking should succeed");
        let second = rank(PETS, &config(4)).expect("ranking should succeed");
        assert_eq!(first, second);
    }

    #[test]
    fn ranker_is_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KeywordRanker>();

        let ranker = KeywordRanker::new(&config(5)).expect("config is valid");
        let expected = ranker.rank(PETS);
        let shared = &ranker;
        let results: Vec<KeywordList> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(move || shared.rank(PETS)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("ranking thread panicked"))
                .collect()
        });

        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|result| *result == expected));
    }

    #[test]
    fn select_top_drops_zero_weights() {
        let weights = vec![
            TermWeight {
                term: "zero".to_string(),
                weight: 0.0,
            },
            TermWeight {
                term: "one".to_string(),
                weight: 1.0,
            },
        ];
        let selected = select_top(weights, 5);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].term, "one");
    }
}
