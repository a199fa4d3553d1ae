//! Pairwise similarity scorers.
//!
//! Three independent signals: tag-set overlap (Jaccard), category match, and
//! TF-IDF cosine similarity over tokenized text. All scorers are pure
//! functions returning a score in [0.0, 1.0]; degenerate inputs (empty sets,
//! zero-magnitude vectors) resolve to 0.0, never NaN.

use std::collections::{HashMap, HashSet};

use crate::models::KnowledgeItem;
use crate::services::tokenizer::tokenize;

/// Number of shared keywords surfaced for explanations.
const TOP_KEYWORDS: usize = 5;

/// Jaccard coefficient over the two items' lower-cased tag sets.
///
/// An empty tag set is never similar to anything, including another empty
/// set: untagged items get no tag boost.
pub fn tag_similarity(a: &KnowledgeItem, b: &KnowledgeItem) -> f64 {
    let set_a = a.tag_set();
    let set_b = b.tag_set();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count() as f64;
    let union = set_a.union(&set_b).count() as f64;
    intersection / union
}

/// 1.0 iff both categories are non-empty and equal after lower-casing.
pub fn category_similarity(a: &KnowledgeItem, b: &KnowledgeItem) -> f64 {
    if a.category.is_empty() || b.category.is_empty() {
        return 0.0;
    }
    if a.category.to_lowercase() == b.category.to_lowercase() {
        1.0
    } else {
        0.0
    }
}

/// Document frequencies over a reference corpus, built once per ranking call.
#[derive(Debug)]
pub struct TfIdfCorpus {
    document_count: usize,
    document_frequency: HashMap<String, usize>,
}

impl TfIdfCorpus {
    pub fn build(items: &[KnowledgeItem]) -> Self {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for item in items {
            let vocabulary: HashSet<String> = tokenize(&item.full_text()).into_iter().collect();
            for word in vocabulary {
                *document_frequency.entry(word).or_insert(0) += 1;
            }
        }
        Self {
            document_count: items.len(),
            document_frequency,
        }
    }

    /// Smoothed inverse document frequency: ln((N+1)/(df+1)) + 1.
    pub fn idf(&self, word: &str) -> f64 {
        let df = self.document_frequency.get(word).copied().unwrap_or(0);
        ((self.document_count as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0
    }
}

/// Content similarity score with its explanatory side output.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSimilarity {
    pub score: f64,
    /// Top words present in both documents, for "shared keywords" reasons.
    pub common_keywords: Vec<String>,
}

impl ContentSimilarity {
    fn zero() -> Self {
        Self {
            score: 0.0,
            common_keywords: Vec::new(),
        }
    }
}

/// TF-IDF cosine similarity between two items.
///
/// Without a reference corpus every IDF defaults to 1.0, degrading to pure
/// TF scoring.
pub fn content_similarity(
    a: &KnowledgeItem,
    b: &KnowledgeItem,
    corpus: Option<&TfIdfCorpus>,
) -> ContentSimilarity {
    let tf_a = term_frequencies(&tokenize(&a.full_text()));
    let tf_b = term_frequencies(&tokenize(&b.full_text()));
    if tf_a.is_empty() || tf_b.is_empty() {
        return ContentSimilarity::zero();
    }

    let idf = |word: &str| corpus.map_or(1.0, |c| c.idf(word));

    let vocabulary: HashSet<&String> = tf_a.keys().chain(tf_b.keys()).collect();
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for word in vocabulary {
        let weight = idf(word);
        let value_a = tf_a.get(word).copied().unwrap_or(0.0) * weight;
        let value_b = tf_b.get(word).copied().unwrap_or(0.0) * weight;
        dot += value_a * value_b;
        norm_a += value_a * value_a;
        norm_b += value_b * value_b;
    }

    let magnitude = norm_a.sqrt() * norm_b.sqrt();
    if magnitude == 0.0 {
        return ContentSimilarity::zero();
    }
    let score = (dot / magnitude).min(1.0);

    // Shared words ranked by combined TF-IDF weight.
    let mut common: Vec<(&String, f64)> = tf_a
        .iter()
        .filter_map(|(word, tf1)| tf_b.get(word).map(|tf2| (word, (tf1 + tf2) * idf(word))))
        .collect();
    common.sort_by(|x, y| {
        y.1.partial_cmp(&x.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.0.cmp(y.0))
    });
    let common_keywords = common
        .into_iter()
        .take(TOP_KEYWORDS)
        .map(|(word, _)| word.clone())
        .collect();

    ContentSimilarity {
        score,
        common_keywords,
    }
}

fn term_frequencies(tokens: &[String]) -> HashMap<String, f64> {
    let total = tokens.len() as f64;
    let mut counts: HashMap<String, f64> = HashMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0.0) += 1.0;
    }
    for value in counts.values_mut() {
        *value /= total;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, title: &str, category: &str, tags: &[&str]) -> KnowledgeItem {
        KnowledgeItem {
            id,
            title: title.to_string(),
            summary: String::new(),
            content: String::new(),
            category: category.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_tag_similarity_symmetric() {
        let a = item(1, "a", "", &["concrete", "curing"]);
        let b = item(2, "b", "", &["concrete", "formwork"]);
        assert_eq!(tag_similarity(&a, &b), tag_similarity(&b, &a));
        assert!((tag_similarity(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_tag_similarity_identical_sets() {
        let a = item(1, "a", "", &["concrete", "curing"]);
        assert_eq!(tag_similarity(&a, &a), 1.0);
    }

    #[test]
    fn test_tag_similarity_empty_sets_are_never_similar() {
        let a = item(1, "a", "", &["concrete"]);
        let empty = item(2, "b", "", &[]);
        assert_eq!(tag_similarity(&a, &empty), 0.0);
        assert_eq!(tag_similarity(&empty, &empty), 0.0);
    }

    #[test]
    fn test_tag_similarity_case_insensitive_with_duplicates() {
        let a = item(1, "a", "", &["Concrete", "concrete"]);
        let b = item(2, "b", "", &["CONCRETE"]);
        assert_eq!(tag_similarity(&a, &b), 1.0);
    }

    #[test]
    fn test_category_similarity_is_binary_and_symmetric() {
        let a = item(1, "a", "QC", &[]);
        let b = item(2, "b", "qc", &[]);
        let c = item(3, "c", "Safety", &[]);
        assert_eq!(category_similarity(&a, &b), 1.0);
        assert_eq!(category_similarity(&b, &a), 1.0);
        assert_eq!(category_similarity(&a, &c), 0.0);
    }

    #[test]
    fn test_category_similarity_empty_is_zero() {
        let a = item(1, "a", "", &[]);
        assert_eq!(category_similarity(&a, &a), 0.0);
    }

    #[test]
    fn test_content_similarity_self_with_own_corpus() {
        let a = item(1, "concrete curing procedure", "", &[]);
        let corpus = TfIdfCorpus::build(std::slice::from_ref(&a));
        let result = content_similarity(&a, &a, Some(&corpus));
        assert!(result.score > 0.0);
        assert!(result.score <= 1.0);
    }

    #[test]
    fn test_content_similarity_disjoint_is_zero() {
        let a = item(1, "concrete curing", "", &[]);
        let b = item(2, "scaffold inspection", "", &[]);
        let result = content_similarity(&a, &b, None);
        assert_eq!(result.score, 0.0);
        assert!(result.common_keywords.is_empty());
    }

    #[test]
    fn test_content_similarity_empty_text_is_zero() {
        let a = item(1, "", "", &[]);
        let b = item(2, "concrete", "", &[]);
        assert_eq!(content_similarity(&a, &b, None).score, 0.0);
        assert_eq!(content_similarity(&a, &a, None).score, 0.0);
    }

    #[test]
    fn test_content_similarity_common_keywords() {
        let a = item(1, "concrete curing schedule", "", &[]);
        let b = item(2, "concrete curing checklist", "", &[]);
        let result = content_similarity(&a, &b, None);
        assert!(result.score > 0.0);
        assert!(result.common_keywords.contains(&"concrete".to_string()));
        assert!(result.common_keywords.contains(&"curing".to_string()));
        assert!(!result.common_keywords.contains(&"schedule".to_string()));
    }

    #[test]
    fn test_idf_favours_rare_words() {
        let items = vec![
            item(1, "concrete curing", "", &[]),
            item(2, "concrete formwork", "", &[]),
            item(3, "concrete placement", "", &[]),
        ];
        let corpus = TfIdfCorpus::build(&items);
        assert!(corpus.idf("curing") > corpus.idf("concrete"));
    }

    #[test]
    fn test_cjk_content_similarity() {
        let a = item(1, "コンクリート打設の品質管理", "", &[]);
        let b = item(2, "コンクリート打設の手順", "", &[]);
        let c = item(3, "足場の点検", "", &[]);
        let sim_ab = content_similarity(&a, &b, None).score;
        let sim_ac = content_similarity(&a, &c, None).score;
        assert!(sim_ab > sim_ac);
    }
}
