use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actions that count as a view of a knowledge item.
pub const VIEW_ACTIONS: &[&str] = &["view", "view_detail"];

/// A short text document in the knowledge corpus.
///
/// Records arrive from loosely-structured sources, so every field beyond the
/// id and title defaults to empty; the scoring code never needs `None` checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl KnowledgeItem {
    /// Concatenated text used for content similarity.
    pub fn full_text(&self) -> String {
        format!("{} {} {}", self.title, self.summary, self.content)
    }

    /// Lower-cased tag set; duplicate tags collapse here.
    pub fn tag_set(&self) -> HashSet<String> {
        self.tags.iter().map(|t| t.to_lowercase()).collect()
    }
}

/// One entry of the user access log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessLogEntry {
    pub user_id: i64,
    pub action: String,
    #[serde(default)]
    pub resource_id: Option<i64>,
    pub timestamp: String,
}

impl AccessLogEntry {
    /// Whether this entry counts as a view of a knowledge item.
    pub fn is_view(&self) -> bool {
        VIEW_ACTIONS.contains(&self.action.as_str())
    }

    /// Parse the ISO-8601 timestamp; `None` means the entry is skipped.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(ts.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(&self.timestamp, format) {
                return Some(naive.and_utc());
            }
        }
        None
    }
}

/// A copy of a knowledge item annotated with the engine's output fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub item: KnowledgeItem,
    /// Combined score, rounded to 3 decimals
    pub recommendation_score: f64,
    /// Human-readable strings describing the contributing signals
    pub recommendation_reasons: Vec<String>,
    /// Signal name -> raw sub-score, for diagnostics
    pub recommendation_details: HashMap<String, f64>,
}
