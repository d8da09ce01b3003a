use std::path::{Path, PathBuf};

use crate::error::VoteError;
use crate::state::data::VoteLedgerEntry;
use crate::state::library::{fetch_ledger, fetch_photo, increment_votes, put_ledger, Library};

/// Backing store for votes.
///
/// `vote_transaction` must run the whole check-and-increment as one atomic
/// unit and return the photo's new vote count.
pub trait VoteStore: Send + Sync + 'static {
    fn vote_transaction(&self, photo_id: &str, voter_id: &str) -> Result<u32, VoteError>;
}

/// Votes recorded in the SQLite catalog
#[derive(Debug, Clone)]
pub struct SqliteVoteStore {
    db_path: PathBuf,
}

impl SqliteVoteStore {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }
}

impl VoteStore for SqliteVoteStore {
    fn vote_transaction(&self, photo_id: &str, voter_id: &str) -> Result<u32, VoteError> {
        // Each vote gets its own connection so concurrent votes contend on
        // the database lock, not on a shared handle
        let mut library = Library::connect(&self.db_path)?;

        library.run_transaction(|tx| -> Result<u32, VoteError> {
            if fetch_photo(tx, photo_id)?.is_none() {
                return Err(VoteError::PhotoNotFound(photo_id.to_string()));
            }

            let mut ledger = fetch_ledger(tx, voter_id)?
                .unwrap_or_else(|| VoteLedgerEntry::empty(voter_id));
            if ledger.has_voted(photo_id) {
                return Err(VoteError::AlreadyVoted);
            }

            let vote_count = increment_votes(tx, photo_id)?;
            ledger.record(photo_id);
            put_ledger(tx, &ledger)?;
            Ok(vote_count)
        })
    }
}
