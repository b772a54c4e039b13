//! Hit deduplication by normalised URL.
//!
//! Hits that refer to the same page (after URL normalisation) collapse to
//! a single entry. The survivor is chosen by, in order: higher score, lower
//! provider priority, lower position in the provider's list, provider id.
//! That makes the outcome independent of the order in which provider
//! responses arrived.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::SearchHit;

use super::url_normalize::normalize_url;

/// A scored hit together with the facts needed to break ties.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub hit: SearchHit,
    /// Priority of the originating provider (lower wins).
    pub priority: u32,
    /// 0-based position in the originating provider's list.
    pub position: usize,
    /// Normalised URL, the deduplication key.
    pub key: String,
}

impl Candidate {
    pub fn new(hit: SearchHit, priority: u32, position: usize) -> Self {
        let key = normalize_url(&hit.url);
        Self {
            hit,
            priority,
            position,
            key,
        }
    }

    /// `Ordering::Greater` when `self` should survive over `other`.
    fn preference(&self, other: &Self) -> Ordering {
        self.hit
            .score
            .total_cmp(&other.hit.score)
            .then_with(|| other.priority.cmp(&self.priority))
            .then_with(|| other.position.cmp(&self.position))
            .then_with(|| other.hit.provider.cmp(&self.hit.provider))
    }
}

/// Collapse candidates sharing a normalised URL into one survivor each.
///
/// Output order follows first appearance of each key; callers sort
/// afterwards.
pub fn deduplicate(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut survivors: Vec<Candidate> = Vec::new();

    for candidate in candidates {
        match index.get(&candidate.key) {
            Some(&slot) => {
                if candidate.preference(&survivors[slot]) == Ordering::Greater {
                    tracing::trace!(
                        url = %candidate.key,
                        winner = %candidate.hit.provider,
                        loser = %survivors[slot].hit.provider,
                        "duplicate hit replaced"
                    );
                    survivors[slot] = candidate;
                }
            }
            None => {
                index.insert(candidate.key.clone(), survivors.len());
                survivors.push(candidate);
            }
        }
    }

    survivors
}
