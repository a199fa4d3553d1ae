use serde::{Deserialize, Serialize};

/// Engine configuration.
///
/// The cache TTL is the only tunable the public contract recognizes; the peer
/// parameters are exposed for operational tuning but default to the contract
/// values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Result cache TTL in seconds (5 minutes)
    pub cache_ttl_secs: u64,
    /// Maximum number of similar users considered per personalization call
    pub max_peers: usize,
    /// Minimum Jaccard similarity for a user to count as a peer
    pub peer_similarity_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300, // 5 minutes
            max_peers: 10,
            peer_similarity_threshold: 0.1,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let defaults = Self::default();
        Ok(Self {
            cache_ttl_secs: std::env::var("CACHE_TTL_SECS")
                .ok()
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.cache_ttl_secs),
            max_peers: std::env::var("MAX_PEERS")
                .ok()
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.max_peers),
            peer_similarity_threshold: std::env::var("PEER_SIMILARITY_THRESHOLD")
                .ok()
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.peer_similarity_threshold),
        })
    }
}
