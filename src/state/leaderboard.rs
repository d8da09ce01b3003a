use super::data::{Category, PhotoRecord};
use super::library::Library;
use crate::error::Result;

/// One bar of a category leaderboard
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    /// First word of the uploader's name, used as the chart label
    pub short_label: String,
    pub votes: u32,
    pub photo: PhotoRecord,
}

/// Most voted photos of a category, best first
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    pub category: Category,
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn load(library: &Library, category: Category, limit: usize) -> Result<Self> {
        let photos = library.top_photos(category, limit)?;
        Ok(Self::from_photos(category, photos))
    }

    pub fn from_photos(category: Category, photos: Vec<PhotoRecord>) -> Self {
        let entries = photos
            .into_iter()
            .map(|photo| LeaderboardEntry {
                short_label: photo
                    .uploader_label
                    .split_whitespace()
                    .next()
                    .unwrap_or("Usuario")
                    .to_string(),
                votes: photo.vote_count,
                photo,
            })
            .collect();
        Self { category, entries }
    }

    pub fn title(&self) -> String {
        format!("Top {} {}", self.entries.len(), self.category.display_name())
    }

    pub fn total_votes(&self) -> u32 {
        self.entries.iter().map(|e| e.votes).sum()
    }

    /// Fraction of the leaderboard's votes held by `entry` (0.0 when nobody voted)
    pub fn share(&self, entry: &LeaderboardEntry) -> f64 {
        match self.total_votes() {
            0 => 0.0,
            total => entry.votes as f64 / total as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::PhotoStatus;
    use chrono::Utc;

    fn photo(id: &str, label: &str, votes: u32) -> PhotoRecord {
        PhotoRecord {
            id: id.to_string(),
            image_url: format!("file:///{id}.jpg"),
            uploader_email: "x@mail.com".to_string(),
            uploader_label: label.to_string(),
            category: Category::Pretty,
            status: PhotoStatus::Confirmed,
            created_at: Utc::now(),
            vote_count: votes,
        }
    }

    #[test]
    fn test_labels_and_shares() {
        let board = Leaderboard::from_photos(
            Category::Pretty,
            vec![photo("p1", "Ana Pérez", 3), photo("p2", "   ", 1)],
        );

        assert_eq!(board.title(), "Top 2 Cosas Lindas");
        assert_eq!(board.entries[0].short_label, "Ana");
        assert_eq!(board.entries[1].short_label, "Usuario");
        assert_eq!(board.total_votes(), 4);
        assert!((board.share(&board.entries[0]) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_empty_board_has_no_share() {
        let board = Leaderboard::from_photos(Category::Ugly, vec![photo("p1", "Ana", 0)]);
        assert_eq!(board.share(&board.entries[0]), 0.0);
    }
}
