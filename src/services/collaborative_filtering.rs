//! Personalized recommendations from the access log.
//!
//! User-user collaborative filtering: peers are users whose recently viewed
//! item sets overlap the target user's (Jaccard), and candidate items are
//! scored by the summed similarity of the peers who viewed them plus a
//! category/tag affinity bonus. Users with no usable history fall back to
//! global popularity ranking; the fallback score is a raw view count on a
//! different scale and is never mixed into a collaborative-scored list.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{AppError, Result};
use crate::models::{AccessLogEntry, KnowledgeItem, ScoredResult};
use crate::services::hybrid_ranker::round3;

pub const DEFAULT_DAYS: i64 = 30;

/// Score bonus when a candidate's category matches one the user has viewed.
const CATEGORY_AFFINITY_BONUS: f64 = 0.5;
/// Score bonus per distinct candidate tag the user has encountered.
const TAG_AFFINITY_BONUS: f64 = 0.3;

/// Produce personalized recommendations for `user_id`.
///
/// Entries outside the `days` window or with unparseable timestamps are
/// skipped; a user with no windowed views gets the popularity fallback.
pub fn recommend_for_user(
    user_id: i64,
    access_log: &[AccessLogEntry],
    all_items: &[KnowledgeItem],
    limit: usize,
    days: i64,
    config: &EngineConfig,
) -> Result<Vec<ScoredResult>> {
    if limit == 0 {
        return Err(AppError::InvalidArgument(
            "limit must be positive".to_string(),
        ));
    }

    let item_index: HashMap<i64, &KnowledgeItem> =
        all_items.iter().map(|item| (item.id, item)).collect();

    // Windowed view events: (user, item). Out-of-range windows saturate
    // instead of panicking: a huge positive window keeps everything, a huge
    // negative one drops everything.
    let cutoff = Duration::try_days(days)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .unwrap_or(if days > 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
    let events: Vec<(i64, i64)> = access_log
        .iter()
        .filter(|entry| entry.is_view())
        .filter_map(|entry| {
            let timestamp = entry.parsed_timestamp()?;
            if timestamp < cutoff {
                return None;
            }
            Some((entry.user_id, entry.resource_id?))
        })
        .collect();

    let mut viewed_by_user: HashMap<i64, HashSet<i64>> = HashMap::new();
    for (user, item) in &events {
        viewed_by_user.entry(*user).or_default().insert(*item);
    }

    let user_viewed = viewed_by_user.remove(&user_id).unwrap_or_default();
    if user_viewed.is_empty() {
        // Cold start: no usable history for this user.
        debug!(user_id, "no view history, using popularity fallback");
        return Ok(popularity_ranking(&events, &item_index, limit));
    }

    // Category/tag affinity from the items the user actually viewed.
    let mut viewed_categories: HashSet<String> = HashSet::new();
    let mut viewed_tags: HashSet<String> = HashSet::new();
    for item_id in &user_viewed {
        if let Some(item) = item_index.get(item_id) {
            if !item.category.is_empty() {
                viewed_categories.insert(item.category.to_lowercase());
            }
            viewed_tags.extend(item.tag_set());
        }
    }

    // Peer discovery: overlap of viewed sets, deterministic tie-break by id.
    let mut peers: Vec<(i64, f64)> = viewed_by_user
        .iter()
        .map(|(other_user, viewed)| (*other_user, jaccard(viewed, &user_viewed)))
        .filter(|(_, similarity)| *similarity > config.peer_similarity_threshold)
        .collect();
    peers.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    peers.truncate(config.max_peers);

    // Candidate scores: peer view sums plus content affinity.
    let mut scores: HashMap<i64, f64> = HashMap::new();
    for (peer, similarity) in &peers {
        for item_id in &viewed_by_user[peer] {
            if !user_viewed.contains(item_id) {
                *scores.entry(*item_id).or_insert(0.0) += similarity;
            }
        }
    }
    for item in all_items {
        if user_viewed.contains(&item.id) {
            continue;
        }
        let mut bonus = 0.0;
        if !item.category.is_empty() && viewed_categories.contains(&item.category.to_lowercase()) {
            bonus += CATEGORY_AFFINITY_BONUS;
        }
        let matching_tags = item
            .tag_set()
            .iter()
            .filter(|tag| viewed_tags.contains(*tag))
            .count();
        bonus += TAG_AFFINITY_BONUS * matching_tags as f64;
        if bonus > 0.0 {
            *scores.entry(item.id).or_insert(0.0) += bonus;
        }
    }

    let mut ranked: Vec<(i64, f64)> = scores
        .into_iter()
        .filter(|(item_id, score)| *score > 0.0 && item_index.contains_key(item_id))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    debug!(
        user_id,
        peers = peers.len(),
        candidates = ranked.len(),
        "collaborative filtering complete"
    );

    Ok(ranked
        .into_iter()
        .take(limit)
        .map(|(item_id, score)| ScoredResult {
            item: item_index[&item_id].clone(),
            recommendation_score: round3(score),
            recommendation_reasons: vec!["based on your viewing history".to_string()],
            recommendation_details: HashMap::from([("collaborative".to_string(), score)]),
        })
        .collect())
}

/// Global popularity ranking over the windowed view events.
///
/// The score is the raw view count, which is not comparable to the
/// collaborative scores.
fn popularity_ranking(
    events: &[(i64, i64)],
    item_index: &HashMap<i64, &KnowledgeItem>,
    limit: usize,
) -> Vec<ScoredResult> {
    let mut view_counts: HashMap<i64, usize> = HashMap::new();
    for (_, item_id) in events {
        *view_counts.entry(*item_id).or_insert(0) += 1;
    }

    let mut ranked: Vec<(i64, usize)> = view_counts
        .into_iter()
        .filter(|(item_id, _)| item_index.contains_key(item_id))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(item_id, views)| ScoredResult {
            item: item_index[&item_id].clone(),
            recommendation_score: views as f64,
            recommendation_reasons: vec!["popular item".to_string()],
            recommendation_details: HashMap::from([("views".to_string(), views as f64)]),
        })
        .collect()
}

/// Jaccard coefficient over two id sets; either side empty is 0.0.
fn jaccard(a: &HashSet<i64>, b: &HashSet<i64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}
