/// Tilt-controlled gallery
///
/// - The index state machine (navigator.rs)
/// - The mounted screen tying the sensor subscription to it (screen.rs)

pub mod navigator;
pub mod screen;

pub use navigator::{Direction, DisplayMode, GalleryNavigator, Transition};
pub use screen::{GalleryMode, GalleryScreen};
