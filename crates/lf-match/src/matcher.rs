//! # Matcher
//!
//! Orchestrates one match attempt for a freshly stored item: scan the
//! outstanding opposite-status pool, score each candidate, and commit the
//! first pair that clears the threshold. First-match-wins is deliberate
//! (no best-of-N ranking), so scan order (creation order) is the de facto
//! tie-break.

use std::sync::Arc;

use lf_core::{BlobStore, Item, ItemRepo, MatchEvent};

use crate::scorer;

/// Fixed similarity cutoff above which two items are declared the same
/// physical object.
pub const MATCH_THRESHOLD: f64 = 0.85;

/// Result of one match attempt. `Unmatched` is a normal outcome, not an
/// error: most submissions have no counterpart yet.
#[derive(Debug)]
pub enum MatchOutcome {
    Matched { partner: Item, event: MatchEvent },
    Unmatched,
}

/// Carries the collaborators explicitly rather than reaching for globals.
pub struct Matcher {
    items: Arc<dyn ItemRepo>,
    blobs: Arc<dyn BlobStore>,
    threshold: f64,
}

impl Matcher {
    pub fn new(items: Arc<dyn ItemRepo>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            items,
            blobs,
            threshold: MATCH_THRESHOLD,
        }
    }

    /// Attempts to pair `new_item` (already persisted, unmatched) with an
    /// outstanding opposite-status item.
    ///
    /// Only repo errors on the candidate fetch propagate. Unreadable
    /// blobs score 0 and are skipped; a commit that loses the race moves
    /// on to the next candidate; a store failure during commit abandons
    /// the attempt and leaves the item unmatched.
    pub async fn try_match(&self, new_item: &Item) -> anyhow::Result<MatchOutcome> {
        let candidates = self.items.list_unmatched(new_item.status.opposite()).await?;
        if candidates.is_empty() {
            return Ok(MatchOutcome::Unmatched);
        }

        let reference = match self.blobs.load(&new_item.image_ref).await {
            Ok(bytes) => Arc::new(bytes),
            Err(err) => {
                log::warn!(
                    "image {} for item {} unreadable, skipping scan: {err:#}",
                    new_item.image_ref,
                    new_item.id
                );
                return Ok(MatchOutcome::Unmatched);
            }
        };

        for candidate in candidates {
            if candidate.owner_id == new_item.owner_id {
                continue;
            }

            let candidate_bytes = match self.blobs.load(&candidate.image_ref).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    log::debug!("candidate {} blob unreadable, skipped: {err:#}", candidate.id);
                    continue;
                }
            };

            // Pixel math runs on the blocking pool so request workers
            // stay responsive. A panicked scoring task counts as
            // undecodable input.
            let a = Arc::clone(&reference);
            let similarity =
                tokio::task::spawn_blocking(move || scorer::score(&a, &candidate_bytes))
                    .await
                    .unwrap_or(0.0);

            if similarity < self.threshold {
                continue;
            }

            match self.items.commit_match(new_item.id, candidate.id).await {
                Ok(true) => {
                    let event = MatchEvent::new(new_item, &candidate, similarity);
                    log::info!(
                        "matched {} with {} at {:.2}%",
                        new_item.id,
                        candidate.id,
                        event.similarity_percent
                    );
                    return Ok(MatchOutcome::Matched {
                        partner: candidate,
                        event,
                    });
                }
                Ok(false) => {
                    // A concurrent submission claimed one of the rows
                    // first; the rest of the pool is still fair game.
                    log::debug!("lost match race for candidate {}", candidate.id);
                    continue;
                }
                Err(err) => {
                    log::warn!(
                        "match commit for {} failed, item stays unmatched: {err:#}",
                        new_item.id
                    );
                    return Ok(MatchOutcome::Unmatched);
                }
            }
        }

        Ok(MatchOutcome::Unmatched)
    }
}
