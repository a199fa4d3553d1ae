//! Service layer: scorers, rankers, and the unified engine facade.
//!
//! Modules:
//! - tokenizer: mixed-script (CJK + Latin) token extraction
//! - similarity: tag / category / content pairwise scorers
//! - hybrid_ranker: weighted "related items" ranking
//! - collaborative_filtering: personalized recommendations from the access log

pub mod collaborative_filtering;
pub mod hybrid_ranker;
pub mod similarity;
pub mod tokenizer;

pub use collaborative_filtering::{recommend_for_user, DEFAULT_DAYS};
pub use hybrid_ranker::{
    rank_related, HybridWeights, RelatedAlgorithm, DEFAULT_LIMIT, DEFAULT_MIN_SCORE,
};
pub use similarity::{
    category_similarity, content_similarity, tag_similarity, ContentSimilarity, TfIdfCorpus,
};
pub use tokenizer::tokenize;

use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheStats, ResultCache};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::models::{AccessLogEntry, KnowledgeItem, ScoredResult};

/// Unified recommendation engine owning the result cache.
///
/// All inputs are caller-supplied snapshots; the engine performs no I/O. The
/// cache lives for the lifetime of the engine instance; callers wanting
/// shared caching share one instance (and serialize access themselves -- the
/// get/put pair is not atomic across threads).
pub struct RecommendationEngine {
    config: EngineConfig,
    cache: ResultCache,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Self {
        let cache = ResultCache::new(Duration::from_secs(config.cache_ttl_secs));
        Self { config, cache }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ranked list of items related to `target`.
    ///
    /// Cached by (target id, algorithm, limit); a hit within the TTL returns
    /// the stored list unchanged even if the underlying corpus has changed.
    pub fn related(
        &mut self,
        target: &KnowledgeItem,
        candidates: &[KnowledgeItem],
        limit: usize,
        algorithm: RelatedAlgorithm,
        min_score: f64,
    ) -> Result<Vec<ScoredResult>> {
        let key = format!("related:{}:{}:{}", target.id, algorithm.as_str(), limit);
        if let Some(cached) = self.fresh(&key) {
            return Ok(cached);
        }

        let results = rank_related(target, candidates, limit, algorithm, min_score)?;
        self.cache.put(key, results.clone());
        Ok(results)
    }

    /// Personalized recommendations for `user_id`.
    ///
    /// Cached by (user id, limit, days), same TTL semantics as `related`.
    pub fn personalized(
        &mut self,
        user_id: i64,
        access_log: &[AccessLogEntry],
        all_items: &[KnowledgeItem],
        limit: usize,
        days: i64,
    ) -> Result<Vec<ScoredResult>> {
        let key = format!("personalized:{}:{}:{}", user_id, limit, days);
        if let Some(cached) = self.fresh(&key) {
            return Ok(cached);
        }

        let results = recommend_for_user(
            user_id,
            access_log,
            all_items,
            limit,
            days,
            &self.config,
        )?;
        self.cache.put(key, results.clone());
        Ok(results)
    }

    /// Force immediate invalidation of every cached result.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Cache lookup honoring the TTL; expired entries count as misses.
    fn fresh(&self, key: &str) -> Option<Vec<ScoredResult>> {
        match self.cache.get(key) {
            Some(entry) if entry.is_fresh(self.cache.ttl()) => {
                debug!(key = %key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!(key = %key, "cache entry expired");
                None
            }
            None => {
                debug!(key = %key, "cache miss");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, category: &str, tags: &[&str]) -> KnowledgeItem {
        KnowledgeItem {
            id,
            title: format!("item {}", id),
            summary: String::new(),
            content: String::new(),
            category: category.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_related_cache_hit_returns_stale_list() {
        let mut engine = RecommendationEngine::new(EngineConfig::default());
        let target = item(1, "QC", &["concrete"]);
        let candidates = vec![item(2, "QC", &["concrete"])];

        let first = engine
            .related(&target, &candidates, 5, RelatedAlgorithm::Tag, 0.0)
            .unwrap();

        // Same key, different corpus: the cached list is returned unchanged.
        let changed = vec![item(2, "QC", &["unrelated"]), item(3, "QC", &["concrete"])];
        let second = engine
            .related(&target, &changed, 5, RelatedAlgorithm::Tag, 0.0)
            .unwrap();
        assert_eq!(first, second);

        // clear() forces recomputation against the new corpus.
        engine.clear_cache();
        let third = engine
            .related(&target, &changed, 5, RelatedAlgorithm::Tag, 0.0)
            .unwrap();
        assert_ne!(first, third);
        assert!(third.iter().any(|r| r.item.id == 3));
    }

    #[test]
    fn test_related_distinct_keys_computed_separately() {
        let mut engine = RecommendationEngine::new(EngineConfig::default());
        let target = item(1, "QC", &["concrete"]);
        let candidates = vec![item(2, "QC", &["concrete"]), item(3, "QC", &["concrete"])];

        engine
            .related(&target, &candidates, 1, RelatedAlgorithm::Tag, 0.0)
            .unwrap();
        engine
            .related(&target, &candidates, 2, RelatedAlgorithm::Tag, 0.0)
            .unwrap();
        engine
            .related(&target, &candidates, 2, RelatedAlgorithm::Hybrid, 0.0)
            .unwrap();

        assert_eq!(engine.cache_stats().total_entries, 3);
    }

    #[test]
    fn test_expired_entry_is_recomputed() {
        let config = EngineConfig {
            cache_ttl_secs: 0,
            ..EngineConfig::default()
        };
        let mut engine = RecommendationEngine::new(config);
        let target = item(1, "QC", &["concrete"]);

        engine
            .related(&target, &[item(2, "QC", &["concrete"])], 5, RelatedAlgorithm::Tag, 0.0)
            .unwrap();
        let results = engine
            .related(&target, &[item(3, "QC", &["concrete"])], 5, RelatedAlgorithm::Tag, 0.0)
            .unwrap();

        // TTL 0 means the first entry was already expired, so the second call
        // recomputed against the new corpus.
        assert_eq!(results[0].item.id, 3);
        let stats = engine.cache_stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expired_entries, 1);
    }

    #[test]
    fn test_invalid_arguments_are_not_cached() {
        let mut engine = RecommendationEngine::new(EngineConfig::default());
        let target = item(1, "QC", &[]);

        assert!(engine
            .related(&target, &[], 0, RelatedAlgorithm::Tag, 0.0)
            .is_err());
        assert!(engine.personalized(1, &[], &[], 0, DEFAULT_DAYS).is_err());
        assert_eq!(engine.cache_stats().total_entries, 0);
    }

    #[test]
    fn test_personalized_is_cached() {
        let mut engine = RecommendationEngine::new(EngineConfig::default());
        let first = engine.personalized(1, &[], &[], 5, DEFAULT_DAYS).unwrap();
        assert!(first.is_empty());
        assert_eq!(engine.cache_stats().total_entries, 1);
        assert_eq!(engine.cache_stats().valid_entries, 1);
    }
}
