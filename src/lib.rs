//! Content-similarity and recommendation engine for knowledge items.
//!
//! Given a snapshot of short text documents and a log of user view events,
//! the engine computes ranked lists of related or personally relevant items:
//! - related items: tag / category / TF-IDF content similarity combined with
//!   fixed weights (mixed-script tokenization handles CJK + Latin text)
//! - personalized recommendations: user-user collaborative filtering over
//!   recently viewed item sets, with a popularity fallback for cold starts
//! - a TTL result cache in front of both, with manual clear and inspection
//!
//! The engine never performs I/O: items and log entries are supplied by the
//! caller on every invocation, and results are plain in-memory lists.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use cache::{CacheEntry, CacheStats, ResultCache};
pub use config::EngineConfig;
pub use error::{AppError, Result};
pub use models::{AccessLogEntry, KnowledgeItem, ScoredResult, VIEW_ACTIONS};
pub use services::{
    HybridWeights, RecommendationEngine, RelatedAlgorithm, DEFAULT_DAYS, DEFAULT_LIMIT,
    DEFAULT_MIN_SCORE,
};
