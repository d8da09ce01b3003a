use log::debug;
use std::str::FromStr;

use crate::sensor::Orientation;
use crate::state::data::PhotoRecord;

/// How the render layer should lay out the current photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Landscape,
    /// Device held upright: photo is letterboxed with an info overlay
    Portrait,
}

/// Manual navigation, for devices without a usable motion sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "next" | "n" | "siguiente" => Ok(Direction::Next),
            "prev" | "previous" | "p" | "anterior" => Ok(Direction::Previous),
            other => Err(format!("unknown step '{other}' (expected next or prev)")),
        }
    }
}

/// What an orientation change did to the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// There is nothing to show
    Empty,
    /// Settling, or the orientation was already handled
    Ignored,
    /// The displayed photo changed (or was reloaded in place)
    Moved { from: usize, to: usize },
    /// Only the layout changed
    Display(DisplayMode),
}

/// Index state machine over a fixed photo sequence.
///
/// Tilting right goes back, tilting left goes forward (both wrap around),
/// laying the phone flat returns to the first photo and holding it upright
/// only switches the layout. Every move marks the new photo as loading until
/// the render layer reports it loaded.
#[derive(Debug, Clone)]
pub struct GalleryNavigator {
    sequence: Vec<PhotoRecord>,
    current_index: Option<usize>,
    item_loading: bool,
    last_handled: Option<Orientation>,
    display_mode: DisplayMode,
}

impl GalleryNavigator {
    pub fn new(sequence: Vec<PhotoRecord>) -> Self {
        let current_index = if sequence.is_empty() { None } else { Some(0) };
        Self {
            item_loading: current_index.is_some(),
            sequence,
            current_index,
            last_handled: None,
            display_mode: DisplayMode::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current(&self) -> Option<&PhotoRecord> {
        self.current_index.and_then(|i| self.sequence.get(i))
    }

    pub fn is_loading(&self) -> bool {
        self.item_loading
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn photos(&self) -> &[PhotoRecord] {
        &self.sequence
    }

    /// Apply one orientation change
    pub fn on_orientation_change(&mut self, orientation: Orientation, is_settling: bool) -> Transition {
        let Some(index) = self.current_index else {
            return Transition::Empty;
        };
        if is_settling || self.last_handled == Some(orientation) {
            return Transition::Ignored;
        }
        self.last_handled = Some(orientation);

        let n = self.sequence.len();
        match orientation {
            Orientation::TiltRight => {
                self.display_mode = DisplayMode::Landscape;
                self.move_to(index, (index + n - 1) % n)
            }
            Orientation::TiltLeft => {
                self.display_mode = DisplayMode::Landscape;
                self.move_to(index, (index + 1) % n)
            }
            Orientation::Horizontal => {
                self.display_mode = DisplayMode::Landscape;
                self.move_to(index, 0)
            }
            Orientation::Vertical => {
                self.display_mode = DisplayMode::Portrait;
                Transition::Display(DisplayMode::Portrait)
            }
        }
    }

    /// Move one photo without a gesture
    pub fn step(&mut self, direction: Direction) -> Transition {
        let Some(index) = self.current_index else {
            return Transition::Empty;
        };
        let n = self.sequence.len();
        let to = match direction {
            Direction::Next => (index + 1) % n,
            Direction::Previous => (index + n - 1) % n,
        };
        self.move_to(index, to)
    }

    /// The render layer finished loading `photo_id`.
    ///
    /// Only clears the loading flag when it is the photo currently shown; a
    /// late load for a photo we already moved away from changes nothing.
    pub fn on_image_loaded(&mut self, photo_id: &str) -> bool {
        match self.current() {
            Some(photo) if photo.id == photo_id => {
                self.item_loading = false;
                true
            }
            _ => false,
        }
    }

    /// Refresh the displayed vote count after a successful vote
    pub fn record_vote(&mut self, photo_id: &str, vote_count: u32) {
        if let Some(photo) = self.sequence.iter_mut().find(|p| p.id == photo_id) {
            photo.vote_count = vote_count;
        }
    }

    fn move_to(&mut self, from: usize, to: usize) -> Transition {
        self.current_index = Some(to);
        self.item_loading = true;
        debug!("Gallery moved {} -> {} of {}", from, to, self.sequence.len());
        Transition::Moved { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{Category, PhotoStatus};
    use chrono::Utc;

    fn photos(n: usize) -> Vec<PhotoRecord> {
        (0..n)
            .map(|i| PhotoRecord {
                id: format!("p{i}"),
                image_url: format!("file:///images/p{i}.jpg"),
                uploader_email: "ana@mail.com".to_string(),
                uploader_label: "Ana".to_string(),
                category: Category::Pretty,
                status: PhotoStatus::Confirmed,
                created_at: Utc::now(),
                vote_count: 0,
            })
            .collect()
    }

    #[test]
    fn test_wraparound_both_ways() {
        let mut nav = GalleryNavigator::new(photos(5));
        assert_eq!(nav.current_index(), Some(0));

        assert_eq!(
            nav.on_orientation_change(Orientation::TiltRight, false),
            Transition::Moved { from: 0, to: 4 }
        );
        assert_eq!(
            nav.on_orientation_change(Orientation::TiltLeft, false),
            Transition::Moved { from: 4, to: 0 }
        );
    }

    #[test]
    fn test_horizontal_resets_from_any_index() {
        for start in 0..5 {
            let mut nav = GalleryNavigator::new(photos(5));
            for _ in 0..start {
                nav.step(Direction::Next);
            }
            assert_eq!(nav.current_index(), Some(start));

            assert_eq!(
                nav.on_orientation_change(Orientation::Horizontal, false),
                Transition::Moved { from: start, to: 0 }
            );
            assert_eq!(nav.current_index(), Some(0));
        }
    }

    #[test]
    fn test_empty_gallery_never_moves() {
        let mut nav = GalleryNavigator::new(Vec::new());
        assert!(nav.is_empty());
        assert_eq!(nav.current_index(), None);
        assert!(nav.current().is_none());

        for orientation in [
            Orientation::TiltLeft,
            Orientation::TiltRight,
            Orientation::Horizontal,
            Orientation::Vertical,
        ] {
            assert_eq!(nav.on_orientation_change(orientation, false), Transition::Empty);
        }
        assert_eq!(nav.step(Direction::Next), Transition::Empty);
        assert_eq!(nav.current_index(), None);
        assert!(!nav.is_loading());
    }

    #[test]
    fn test_vertical_only_changes_layout() {
        let mut nav = GalleryNavigator::new(photos(3));
        nav.on_orientation_change(Orientation::TiltLeft, false);
        nav.on_image_loaded("p1");

        assert_eq!(
            nav.on_orientation_change(Orientation::Vertical, false),
            Transition::Display(DisplayMode::Portrait)
        );
        assert_eq!(nav.current_index(), Some(1));
        assert_eq!(nav.display_mode(), DisplayMode::Portrait);
        assert!(!nav.is_loading());

        nav.on_orientation_change(Orientation::TiltLeft, false);
        assert_eq!(nav.display_mode(), DisplayMode::Landscape);
    }

    #[test]
    fn test_settling_and_repeats_are_ignored() {
        let mut nav = GalleryNavigator::new(photos(3));

        assert_eq!(nav.on_orientation_change(Orientation::TiltLeft, true), Transition::Ignored);
        assert_eq!(nav.current_index(), Some(0));

        assert!(matches!(
            nav.on_orientation_change(Orientation::TiltLeft, false),
            Transition::Moved { to: 1, .. }
        ));
        assert_eq!(nav.on_orientation_change(Orientation::TiltLeft, false), Transition::Ignored);
        assert_eq!(nav.current_index(), Some(1));
    }

    #[test]
    fn test_loading_flag_follows_current_item() {
        let mut nav = GalleryNavigator::new(photos(3));
        assert!(nav.is_loading());
        assert!(nav.on_image_loaded("p0"));
        assert!(!nav.is_loading());

        nav.on_orientation_change(Orientation::TiltLeft, false);
        assert!(nav.is_loading());

        // Stale load callback for the previous photo
        assert!(!nav.on_image_loaded("p0"));
        assert!(nav.is_loading());

        assert!(nav.on_image_loaded("p1"));
        assert!(!nav.is_loading());

        // Flat again while on the first photo still reloads it
        nav.on_orientation_change(Orientation::Horizontal, false);
        assert!(nav.is_loading());
    }

    #[test]
    fn test_events_apply_in_order() {
        let mut nav = GalleryNavigator::new(photos(4));
        let events = [
            Orientation::TiltLeft,
            Orientation::Vertical,
            Orientation::TiltLeft,
            Orientation::TiltRight,
            Orientation::TiltLeft,
        ];
        for orientation in events {
            nav.on_orientation_change(orientation, false);
        }
        assert_eq!(nav.current_index(), Some(2));
    }

    #[test]
    fn test_manual_steps_and_vote_refresh() {
        let mut nav = GalleryNavigator::new(photos(2));
        assert_eq!(nav.step(Direction::Previous), Transition::Moved { from: 0, to: 1 });
        assert_eq!(nav.step(Direction::Next), Transition::Moved { from: 1, to: 0 });

        nav.record_vote("p0", 7);
        assert_eq!(nav.current().unwrap().vote_count, 7);
        nav.record_vote("unknown", 3);
        assert_eq!(nav.photos()[1].vote_count, 0);
    }

    #[test]
    fn test_parse_steps() {
        let steps: Vec<Direction> = "next, N,prev,Anterior"
            .split(',')
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(
            steps,
            vec![Direction::Next, Direction::Next, Direction::Previous, Direction::Previous]
        );
        assert!("sideways".parse::<Direction>().is_err());
    }
}
