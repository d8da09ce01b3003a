use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{
    params, Connection, OpenFlags, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data::{Category, NewPhoto, PhotoRecord, PhotoStatus, VoteLedgerEntry};
use crate::error::{LibraryError, Result};

/// How long a connection waits for another writer before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const PHOTO_COLUMNS: &str =
    "id, image_url, uploader_email, uploader_label, category, status, created_at, votes";

/// The Library manages the SQLite catalog database.
///
/// It is the document store of the app: one `photos` document per submitted
/// photo and one `user_votes` document per voter. Ids and timestamps are
/// assigned here, never by callers.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the catalog at `db_path` and initialize the schema
    pub fn open(db_path: &Path) -> Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        let mut library = Self::from_connection(conn, db_path)?;
        library.init_schema()?;

        info!("Catalog initialized at: {}", db_path.display());
        Ok(library)
    }

    /// Open another connection to an existing catalog.
    ///
    /// rusqlite::Connection is not Sync, so background work opens its own
    /// connection instead of sharing the main one.
    ///
    /// Unlike `open`, this never creates a missing database file.
    pub fn connect(db_path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::from_connection(conn, db_path)
    }

    fn from_connection(conn: Connection, db_path: &Path) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Library {
            conn,
            db_path: db_path.to_path_buf(),
        })
    }

    /// Initialize the database schema.
    /// Creates all necessary tables and indexes if they don't exist.
    fn init_schema(&mut self) -> Result<()> {
        // Photo documents; the id default gives Firestore-style random ids
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS photos (
                id              TEXT PRIMARY KEY NOT NULL DEFAULT (lower(hex(randomblob(10)))),
                image_url       TEXT NOT NULL,
                uploader_email  TEXT NOT NULL,
                uploader_label  TEXT NOT NULL,
                category        TEXT NOT NULL,
                status          TEXT NOT NULL,
                created_at      INTEGER NOT NULL,
                votes           INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0)
            )",
            [],
        )?;

        // One ledger document per voter, photo ids stored as a JSON array
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS user_votes (
                voter_id        TEXT PRIMARY KEY NOT NULL,
                votes_json      TEXT NOT NULL
            )",
            [],
        )?;

        // Gallery query: category + status, newest first
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_photos_gallery
             ON photos(category, status, created_at DESC)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_photos_uploader
             ON photos(uploader_email, created_at DESC)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_photos_votes
             ON photos(category, votes DESC)",
            [],
        )?;

        debug!("Catalog schema ready");
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Get a count of photos in the catalog
    pub fn photo_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert a new photo document.
    /// The store assigns the id, the creation time and a zero vote count.
    pub fn add_photo(&self, photo: &NewPhoto) -> Result<PhotoRecord> {
        let created_at = Utc::now().timestamp_millis();

        let id: String = self.conn.query_row(
            "INSERT INTO photos (image_url, uploader_email, uploader_label, category, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id",
            params![
                photo.image_url,
                photo.uploader_email,
                photo.uploader_label,
                photo.category.as_key(),
                photo.status.as_key(),
                created_at,
            ],
            |row| row.get(0),
        )?;

        debug!("Stored photo {} ({})", id, photo.category.as_key());

        fetch_photo(&self.conn, &id)?.ok_or(LibraryError::PhotoNotFound(id))
    }

    /// Point read by id
    pub fn photo(&self, id: &str) -> Result<Option<PhotoRecord>> {
        fetch_photo(&self.conn, id)
    }

    /// Confirmed photos of one category, newest first.
    /// This is the sequence fed to the gallery.
    pub fn confirmed_in_category(&self, category: Category) -> Result<Vec<PhotoRecord>> {
        self.query_photos(
            &format!(
                "SELECT {PHOTO_COLUMNS} FROM photos
                 WHERE category = ?1 AND status = ?2
                 ORDER BY created_at DESC, rowid DESC"
            ),
            params![category.as_key(), PhotoStatus::Confirmed.as_key()],
        )
    }

    /// Every photo uploaded by one user, newest first
    pub fn photos_by_uploader(&self, email: &str) -> Result<Vec<PhotoRecord>> {
        self.query_photos(
            &format!(
                "SELECT {PHOTO_COLUMNS} FROM photos
                 WHERE uploader_email = ?1
                 ORDER BY created_at DESC, rowid DESC"
            ),
            params![email],
        )
    }

    /// Most voted confirmed photos of one category
    pub fn top_photos(&self, category: Category, limit: usize) -> Result<Vec<PhotoRecord>> {
        self.query_photos(
            &format!(
                "SELECT {PHOTO_COLUMNS} FROM photos
                 WHERE category = ?1 AND status = ?2
                 ORDER BY votes DESC, created_at ASC
                 LIMIT ?3"
            ),
            params![category.as_key(), PhotoStatus::Confirmed.as_key(), limit as i64],
        )
    }

    /// A voter's ledger; voters without votes get an empty one
    pub fn ledger(&self, voter_id: &str) -> Result<VoteLedgerEntry> {
        Ok(fetch_ledger(&self.conn, voter_id)?.unwrap_or_else(|| VoteLedgerEntry::empty(voter_id)))
    }

    /// Run `f` inside one atomic transaction.
    ///
    /// The transaction starts with `BEGIN IMMEDIATE`, so it holds the write
    /// lock from its first read: two transactions never interleave their
    /// read-then-write. Returning `Err` from `f` rolls everything back.
    pub fn run_transaction<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> std::result::Result<T, E>,
        E: From<rusqlite::Error>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn query_photos(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<PhotoRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, read_photo_row)?;

        let mut photos = Vec::new();
        for row in rows {
            photos.push(row?.into_record()?);
        }
        Ok(photos)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Raw column values of a photo row, before validation
struct PhotoRow {
    id: String,
    image_url: String,
    uploader_email: String,
    uploader_label: String,
    category: String,
    status: String,
    created_at: i64,
    votes: i64,
}

fn read_photo_row(row: &Row<'_>) -> rusqlite::Result<PhotoRow> {
    Ok(PhotoRow {
        id: row.get(0)?,
        image_url: row.get(1)?,
        uploader_email: row.get(2)?,
        uploader_label: row.get(3)?,
        category: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
        votes: row.get(7)?,
    })
}

impl PhotoRow {
    fn into_record(self) -> Result<PhotoRecord> {
        let category = Category::from_key(&self.category).ok_or_else(|| {
            LibraryError::InvalidData(format!("photo {}: category '{}'", self.id, self.category))
        })?;
        let status = PhotoStatus::from_key(&self.status).ok_or_else(|| {
            LibraryError::InvalidData(format!("photo {}: status '{}'", self.id, self.status))
        })?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(self.created_at).ok_or_else(|| {
            LibraryError::InvalidData(format!("photo {}: timestamp {}", self.id, self.created_at))
        })?;
        let vote_count = u32::try_from(self.votes).map_err(|_| {
            LibraryError::InvalidData(format!("photo {}: vote count {}", self.id, self.votes))
        })?;

        Ok(PhotoRecord {
            id: self.id,
            image_url: self.image_url,
            uploader_email: self.uploader_email,
            uploader_label: self.uploader_label,
            category,
            status,
            created_at,
            vote_count,
        })
    }
}

// Document helpers. They take a plain connection so they work both on the
// library connection and inside `run_transaction` (Transaction derefs to it).

/// Read one photo document
pub fn fetch_photo(conn: &Connection, id: &str) -> Result<Option<PhotoRecord>> {
    let row = conn
        .query_row(
            &format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = ?1"),
            params![id],
            read_photo_row,
        )
        .optional()?;
    row.map(PhotoRow::into_record).transpose()
}

/// Read one ledger document; `None` if the voter never voted
pub fn fetch_ledger(conn: &Connection, voter_id: &str) -> Result<Option<VoteLedgerEntry>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT votes_json FROM user_votes WHERE voter_id = ?1",
            params![voter_id],
            |row| row.get(0),
        )
        .optional()?;

    match json {
        Some(json) => {
            let voted_photo_ids: BTreeSet<String> = serde_json::from_str(&json)?;
            Ok(Some(VoteLedgerEntry {
                voter_id: voter_id.to_string(),
                voted_photo_ids,
            }))
        }
        None => Ok(None),
    }
}

/// Write (create or replace) a ledger document
pub fn put_ledger(conn: &Connection, ledger: &VoteLedgerEntry) -> Result<()> {
    let json = serde_json::to_string(&ledger.voted_photo_ids)?;
    conn.execute(
        "INSERT INTO user_votes (voter_id, votes_json) VALUES (?1, ?2)
         ON CONFLICT(voter_id) DO UPDATE SET votes_json = excluded.votes_json",
        params![ledger.voter_id, json],
    )?;
    Ok(())
}

/// Add exactly one vote to a photo and return the new count
pub fn increment_votes(conn: &Connection, photo_id: &str) -> Result<u32> {
    let votes: Option<i64> = conn
        .query_row(
            "UPDATE photos SET votes = votes + 1 WHERE id = ?1 RETURNING votes",
            params![photo_id],
            |row| row.get(0),
        )
        .optional()?;

    let votes = votes.ok_or_else(|| LibraryError::PhotoNotFound(photo_id.to_string()))?;
    u32::try_from(votes)
        .map_err(|_| LibraryError::InvalidData(format!("photo {photo_id}: vote count {votes}")))
}
