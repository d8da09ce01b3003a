//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the database layer, the vote coordinator and the gallery.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Gallery a photo was submitted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// "Cosas Lindas"
    Pretty,
    /// "Cosas Feas"
    Ugly,
}

impl Category {
    /// Value stored in the database
    pub fn as_key(&self) -> &'static str {
        match self {
            Category::Pretty => "pretty",
            Category::Ugly => "ugly",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "pretty" => Some(Category::Pretty),
            "ugly" => Some(Category::Ugly),
            _ => None,
        }
    }

    /// Title shown to users
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Pretty => "Cosas Lindas",
            Category::Ugly => "Cosas Feas",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the English keys and the Spanish gallery names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "linda" | "lindas" => Ok(Category::Pretty),
            "ugly" | "fea" | "feas" => Ok(Category::Ugly),
            other => Err(format!("unknown category '{other}' (expected pretty or ugly)")),
        }
    }
}

/// Review state of a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoStatus {
    Pending,
    Confirmed,
}

impl PhotoStatus {
    pub fn as_key(&self) -> &'static str {
        match self {
            PhotoStatus::Pending => "pending",
            PhotoStatus::Confirmed => "confirmed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "pending" => Some(PhotoStatus::Pending),
            "confirmed" => Some(PhotoStatus::Confirmed),
            _ => None,
        }
    }
}

/// A submitted photo as stored in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRecord {
    /// Store-assigned document id
    pub id: String,
    /// Publicly fetchable URL from the object store
    pub image_url: String,
    /// Email of the uploader (used for "my photos")
    pub uploader_email: String,
    /// Name shown next to the photo
    pub uploader_label: String,
    pub category: Category,
    pub status: PhotoStatus,
    /// Store-assigned creation time
    pub created_at: DateTime<Utc>,
    /// Only ever changed by the vote transaction
    pub vote_count: u32,
}

/// Fields supplied by the client when creating a photo.
/// The id, timestamp and vote count are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPhoto {
    pub image_url: String,
    pub uploader_email: String,
    pub uploader_label: String,
    pub category: Category,
    pub status: PhotoStatus,
}

/// Every photo a voter has voted for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoteLedgerEntry {
    pub voter_id: String,
    pub voted_photo_ids: BTreeSet<String>,
}

impl VoteLedgerEntry {
    /// Empty ledger for a voter with no votes yet
    pub fn empty(voter_id: &str) -> Self {
        Self {
            voter_id: voter_id.to_string(),
            voted_photo_ids: BTreeSet::new(),
        }
    }

    pub fn has_voted(&self, photo_id: &str) -> bool {
        self.voted_photo_ids.contains(photo_id)
    }

    /// Add a vote; returns false if it was already recorded
    pub fn record(&mut self, photo_id: &str) -> bool {
        self.voted_photo_ids.insert(photo_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!("pretty".parse::<Category>(), Ok(Category::Pretty));
        assert_eq!("Lindas".parse::<Category>(), Ok(Category::Pretty));
        assert_eq!(" fea ".parse::<Category>(), Ok(Category::Ugly));
        assert!("bonitas".parse::<Category>().is_err());
    }

    #[test]
    fn test_keys_match() {
        for category in [Category::Pretty, Category::Ugly] {
            assert_eq!(Category::from_key(category.as_key()), Some(category));
        }
        for status in [PhotoStatus::Pending, PhotoStatus::Confirmed] {
            assert_eq!(PhotoStatus::from_key(status.as_key()), Some(status));
        }
    }

    #[test]
    fn test_ledger_records_once() {
        let mut ledger = VoteLedgerEntry::empty("u1");
        assert!(!ledger.has_voted("p1"));
        assert!(ledger.record("p1"));
        assert!(!ledger.record("p1"));
        assert!(ledger.has_voted("p1"));
        assert_eq!(ledger.voted_photo_ids.len(), 1);
    }
}
