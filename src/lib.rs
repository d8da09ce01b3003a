//! Tilt-controlled photo gallery with at-most-once voting.
//!
//! The pieces:
//! - [`sensor`]: accelerometer samples to debounced orientation changes
//! - [`gallery`]: orientation changes to gallery index transitions
//! - [`vote`]: one vote per voter per photo, enforced in a store transaction
//! - [`state`]: the catalog database, uploads, pending captures, leaderboards

pub mod config;
pub mod error;
pub mod gallery;
pub mod sensor;
pub mod state;
pub mod vote;

pub use config::{AppConfig, SensorConfig};
pub use error::{LibraryError, TraceError, VoteError};
