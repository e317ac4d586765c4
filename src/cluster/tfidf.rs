//! TF-IDF vectorization of short texts

use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"\b\w\w+\b").unwrap())
}

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "been",
    "before", "beforehand", "behind", "being", "below", "beside", "besides", "between", "beyond",
    "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "done", "down", "due",
    "during", "each", "eg", "either", "else", "elsewhere", "enough", "etc", "even", "ever",
    "every", "everyone", "everything", "everywhere", "except", "few", "for", "former",
    "formerly", "from", "further", "get", "give", "go", "had", "has", "have", "he", "hence",
    "her", "here", "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his",
    "how", "however", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself", "just",
    "keep", "last", "latter", "least", "less", "ltd", "made", "many", "may", "me", "meanwhile",
    "might", "more", "moreover", "most", "mostly", "much", "must", "my", "myself", "namely",
    "neither", "never", "nevertheless", "next", "no", "nobody", "none", "nor", "not", "nothing",
    "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other",
    "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps",
    "please", "put", "rather", "re", "same", "see", "seem", "seemed", "seeming", "seems",
    "several", "she", "should", "since", "so", "some", "somehow", "someone", "something",
    "sometime", "sometimes", "somewhere", "still", "such", "than", "that", "the", "their",
    "them", "themselves", "then", "thence", "there", "thereafter", "thereby", "therefore",
    "therein", "thereupon", "these", "they", "this", "those", "though", "through", "throughout",
    "thru", "thus", "to", "together", "too", "toward", "towards", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "who", "whoever", "whole", "whom", "whose", "why", "will",
    "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| ENGLISH_STOP_WORDS.iter().copied().collect())
}

/// Lowercased tokens of two or more word characters, stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    token_regex()
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !stop_words().contains(t))
        .map(ToString::to_string)
        .collect()
}

/// Document-term matrix with L2-normalized rows
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    /// Vocabulary in column order (alphabetical)
    pub features: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// Fit and transform in one pass.
///
/// Keeps the `max_features` most frequent terms, weights by smoothed idf
/// `ln((1 + n) / (1 + df)) + 1`.
pub fn fit_transform(texts: &[String], max_features: usize) -> TfidfMatrix {
    let docs: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();

    let mut term_counts: HashMap<&str, usize> = HashMap::new();
    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for doc in &docs {
        let mut seen = HashSet::new();
        for term in doc {
            *term_counts.entry(term).or_default() += 1;
            if seen.insert(term.as_str()) {
                *doc_freq.entry(term).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<(&str, usize)> = term_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(max_features);

    let columns: BTreeMap<&str, usize> = {
        let mut names: Vec<&str> = ranked.iter().map(|(t, _)| *t).collect();
        names.sort_unstable();
        names.into_iter().enumerate().map(|(i, t)| (t, i)).collect()
    };

    let n = docs.len() as f64;
    let idf: Vec<f64> = columns
        .keys()
        .map(|t| {
            let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
            ((1.0 + n) / (1.0 + df)).ln() + 1.0
        })
        .collect();

    let rows = docs
        .iter()
        .map(|doc| {
            let mut row = vec![0.0; columns.len()];
            for term in doc {
                if let Some(&col) = columns.get(term.as_str()) {
                    row[col] += 1.0;
                }
            }
            for (value, weight) in row.iter_mut().zip(&idf) {
                *value *= weight;
            }
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.iter_mut().for_each(|v| *v /= norm);
            }
            row
        })
        .collect();

    TfidfMatrix {
        features: columns.keys().map(|t| t.to_string()).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_filters_short_and_stop_words() {
        assert_eq!(
            tokenize("The Rust Book: a tour of C++ and Go"),
            vec!["rust", "book", "tour"]
        );
    }

    #[test]
    fn test_rows_are_unit_length() {
        let texts = vec![
            "rust borrow checker".to_string(),
            "rust async runtime".to_string(),
            "the of and".to_string(),
        ];
        let m = fit_transform(&texts, 1000);
        assert_eq!(m.features, vec!["async", "borrow", "checker", "runtime", "rust"]);

        for row in &m.rows[..2] {
            let norm: f64 = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
        assert!(m.rows[2].iter().all(|v| *v == 0.0));

        // shared term weighs less than a distinctive one
        let rust = m.features.iter().position(|f| f == "rust").unwrap();
        let borrow = m.features.iter().position(|f| f == "borrow").unwrap();
        assert!(m.rows[0][rust] < m.rows[0][borrow]);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let texts = vec![
            "chess chess opening".to_string(),
            "chess endgame".to_string(),
        ];
        let m = fit_transform(&texts, 1);
        assert_eq!(m.features, vec!["chess"]);
    }
}
