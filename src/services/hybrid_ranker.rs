//! "Related items" ranking.
//!
//! Combines the tag, category, and content scorers with fixed weights,
//! filters by a minimum combined score, and returns the top results in
//! descending score order (stable, so ties keep input order).

use std::collections::HashMap;
use std::str::FromStr;

use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{KnowledgeItem, ScoredResult};
use crate::services::similarity::{
    category_similarity, content_similarity, tag_similarity, TfIdfCorpus,
};

pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_MIN_SCORE: f64 = 0.1;

/// Scoring strategy for related-item lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedAlgorithm {
    Tag,
    Category,
    Keyword,
    Hybrid,
}

impl RelatedAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelatedAlgorithm::Tag => "tag",
            RelatedAlgorithm::Category => "category",
            RelatedAlgorithm::Keyword => "keyword",
            RelatedAlgorithm::Hybrid => "hybrid",
        }
    }

    fn uses_tags(&self) -> bool {
        matches!(self, RelatedAlgorithm::Tag | RelatedAlgorithm::Hybrid)
    }

    fn uses_category(&self) -> bool {
        matches!(self, RelatedAlgorithm::Category | RelatedAlgorithm::Hybrid)
    }

    fn uses_content(&self) -> bool {
        matches!(self, RelatedAlgorithm::Keyword | RelatedAlgorithm::Hybrid)
    }
}

impl FromStr for RelatedAlgorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tag" => Ok(RelatedAlgorithm::Tag),
            "category" => Ok(RelatedAlgorithm::Category),
            "keyword" => Ok(RelatedAlgorithm::Keyword),
            "hybrid" => Ok(RelatedAlgorithm::Hybrid),
            other => Err(AppError::InvalidArgument(format!(
                "unknown algorithm: {}",
                other
            ))),
        }
    }
}

/// Signal weights for the combined score.
#[derive(Debug, Clone, Copy)]
pub struct HybridWeights {
    pub tag: f64,
    pub category: f64,
    pub content: f64,
}

impl HybridWeights {
    /// Default balanced weights.
    pub fn balanced() -> Self {
        Self {
            tag: 0.4,
            category: 0.3,
            content: 0.3,
        }
    }

    /// Validate weights sum to 1.0
    pub fn validate(&self) -> Result<()> {
        let sum = self.tag + self.category + self.content;
        if (sum - 1.0).abs() > 0.01 {
            return Err(AppError::InvalidArgument(format!(
                "weights must sum to 1.0 (got {})",
                sum
            )));
        }
        Ok(())
    }
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Rank candidates by similarity to `target`.
///
/// The target itself is excluded by id before scoring; an empty candidate set
/// after exclusion yields an empty result.
pub fn rank_related(
    target: &KnowledgeItem,
    candidates: &[KnowledgeItem],
    limit: usize,
    algorithm: RelatedAlgorithm,
    min_score: f64,
) -> Result<Vec<ScoredResult>> {
    if limit == 0 {
        return Err(AppError::InvalidArgument(
            "limit must be positive".to_string(),
        ));
    }

    let weights = HybridWeights::balanced();
    let corpus = if algorithm.uses_content() {
        Some(TfIdfCorpus::build(candidates))
    } else {
        None
    };

    // Candidates carry their unrounded combined score until after sorting;
    // only the output field is rounded.
    let mut scored: Vec<(f64, ScoredResult)> = Vec::new();
    for candidate in candidates.iter().filter(|c| c.id != target.id) {
        let mut score = 0.0;
        let mut reasons = Vec::new();
        let mut details = HashMap::new();

        if algorithm.uses_tags() {
            let tag_score = tag_similarity(target, candidate);
            details.insert("tag".to_string(), tag_score);
            if tag_score > 0.0 {
                reasons.push(format!("shared tags, similarity {:.2}", tag_score));
            }
            score += weights.tag * tag_score;
        }

        if algorithm.uses_category() {
            let category_score = category_similarity(target, candidate);
            details.insert("category".to_string(), category_score);
            if category_score > 0.0 {
                reasons.push("shared category".to_string());
            }
            score += weights.category * category_score;
        }

        if algorithm.uses_content() {
            let content = content_similarity(target, candidate, corpus.as_ref());
            details.insert("content".to_string(), content.score);
            if content.score > 0.0 && !content.common_keywords.is_empty() {
                reasons.push(format!(
                    "shared keywords: {}",
                    content.common_keywords.join(", ")
                ));
            }
            score += weights.content * content.score;
        }

        if score < min_score {
            continue;
        }

        scored.push((
            score,
            ScoredResult {
                item: candidate.clone(),
                recommendation_score: round3(score),
                recommendation_reasons: reasons,
                recommendation_details: details,
            },
        ));
    }

    // Stable sort: ties keep candidate input order.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    let mut results: Vec<ScoredResult> = scored.into_iter().map(|(_, result)| result).collect();
    results.truncate(limit);

    debug!(
        target_id = target.id,
        algorithm = algorithm.as_str(),
        results = results.len(),
        "ranked related items"
    );
    Ok(results)
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
