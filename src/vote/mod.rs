/// Voting
///
/// A voter can add at most one vote to a given photo. The check and the
/// increment happen in a single store transaction; the coordinator only
/// moves that transaction off the async runtime and reports the outcome.

pub mod store;

use log::{debug, info, warn};
use std::sync::Arc;
use tokio::task;

pub use store::{SqliteVoteStore, VoteStore};

use crate::error::VoteError;

/// A vote that was counted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteReceipt {
    pub photo_id: String,
    pub voter_id: String,
    /// Vote count right after this vote committed
    pub vote_count: u32,
}

/// Records votes, at most once per (photo, voter) pair.
///
/// Failures are reported, never retried here.
pub struct VoteCoordinator<S: VoteStore> {
    store: Arc<S>,
}

impl<S: VoteStore> Clone for VoteCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: VoteStore> VoteCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Vote for `photo_id` on behalf of `voter_id`
    pub async fn vote(&self, photo_id: &str, voter_id: &str) -> Result<VoteReceipt, VoteError> {
        let store = Arc::clone(&self.store);
        let (photo, voter) = (photo_id.to_string(), voter_id.to_string());

        // The transaction blocks on the database, keep it off the runtime threads
        let outcome = task::spawn_blocking(move || store.vote_transaction(&photo, &voter))
            .await
            .map_err(|e| VoteError::TransientFailure(format!("vote task failed: {e}")))?;

        match outcome {
            Ok(vote_count) => {
                info!("Vote by {} on {} counted ({} total)", voter_id, photo_id, vote_count);
                Ok(VoteReceipt {
                    photo_id: photo_id.to_string(),
                    voter_id: voter_id.to_string(),
                    vote_count,
                })
            }
            Err(VoteError::AlreadyVoted) => {
                debug!("{} already voted on {}", voter_id, photo_id);
                Err(VoteError::AlreadyVoted)
            }
            Err(err) => {
                warn!("Vote by {} on {} failed: {}", voter_id, photo_id, err);
                Err(err)
            }
        }
    }
}
