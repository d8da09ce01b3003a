/// State management module
///
/// This module handles all application state, including:
/// - Database connections and queries (library.rs)
/// - Shared data structures (data.rs)
/// - The signed-in user (session.rs)
/// - Captures waiting for confirmation (pending.rs)
/// - Object storage and the confirm flow (uploads.rs)
/// - Per-category leaderboards (leaderboard.rs)

pub mod library;
pub mod data;
pub mod session;
pub mod pending;
pub mod uploads;
pub mod leaderboard;

pub use data::{Category, NewPhoto, PhotoRecord, PhotoStatus, VoteLedgerEntry};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use library::Library;
pub use pending::{capture_folder, CapturedPhoto, PendingCaptures};
pub use session::Session;
pub use uploads::{confirm_pending, discard_pending, LocalObjectStore, ObjectStore};
