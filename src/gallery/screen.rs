use log::{info, warn};
use tokio::sync::mpsc;

use super::navigator::{Direction, GalleryNavigator, Transition};
use crate::config::SensorConfig;
use crate::sensor::{probe, MotionSource, OrientationEvent, OrientationSubscription, SensorAvailability};
use crate::state::data::PhotoRecord;

/// How the user moves through the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryMode {
    /// Tilt gestures drive the navigator
    Gesture,
    /// No sensor data: only manual steps
    Manual,
}

/// A mounted gallery: the navigator plus, when a sensor answered, the
/// orientation subscription feeding it.
///
/// Tearing the screen down (or dropping it) cancels the subscription.
#[derive(Debug)]
pub struct GalleryScreen {
    navigator: GalleryNavigator,
    mode: GalleryMode,
    subscription: Option<OrientationSubscription>,
    events: Option<mpsc::UnboundedReceiver<OrientationEvent>>,
}

impl GalleryScreen {
    /// Mount a gallery over `sequence`.
    ///
    /// The sensor is probed with a clone of `source` first; if no sample
    /// shows up within the probe timeout the screen falls back to manual mode.
    pub async fn mount<S: MotionSource + Clone>(
        sequence: Vec<PhotoRecord>,
        source: S,
        config: SensorConfig,
    ) -> Self {
        let navigator = GalleryNavigator::new(sequence);

        if navigator.is_empty() {
            info!("Gallery is empty, not subscribing to the sensor");
            return Self::manual(navigator);
        }

        let mut probe_source = source.clone();
        match probe(&mut probe_source, &config).await {
            SensorAvailability::Available => {
                let (subscription, events) = OrientationSubscription::start(source, config);
                info!("Gallery mounted in gesture mode ({} photos)", navigator.len());
                Self {
                    navigator,
                    mode: GalleryMode::Gesture,
                    subscription: Some(subscription),
                    events: Some(events),
                }
            }
            SensorAvailability::Unavailable => {
                warn!("Motion sensor unavailable, gallery falls back to manual mode");
                Self::manual(navigator)
            }
        }
    }

    fn manual(navigator: GalleryNavigator) -> Self {
        Self {
            navigator,
            mode: GalleryMode::Manual,
            subscription: None,
            events: None,
        }
    }

    pub fn mode(&self) -> GalleryMode {
        self.mode
    }

    pub fn navigator(&self) -> &GalleryNavigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut GalleryNavigator {
        &mut self.navigator
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Wait for the next orientation change and apply it.
    ///
    /// Returns `None` once the sensor stream has ended or the screen has been
    /// torn down. Events only arrive after the settling window, so they are
    /// applied as settled.
    pub async fn next_event(&mut self) -> Option<(OrientationEvent, Transition)> {
        let events = self.events.as_mut()?;
        let event = events.recv().await?;
        let transition = self.navigator.on_orientation_change(event.orientation, false);
        Some((event, transition))
    }

    /// Manual navigation, available in both modes
    pub fn step(&mut self, direction: Direction) -> Transition {
        self.navigator.step(direction)
    }

    /// Forward the render layer's load-complete callback
    pub fn image_loaded(&mut self, photo_id: &str) -> bool {
        self.navigator.on_image_loaded(photo_id)
    }

    /// Cancel the sensor subscription. Safe to call more than once.
    pub fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            info!("Gallery torn down");
        }
        self.events = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::{MotionSample, Orientation, TraceSource, UnavailableSource};
    use crate::state::data::{Category, PhotoStatus};
    use chrono::Utc;

    fn photos(n: usize) -> Vec<PhotoRecord> {
        (0..n)
            .map(|i| PhotoRecord {
                id: format!("p{i}"),
                image_url: format!("file:///images/p{i}.jpg"),
                uploader_email: "ana@mail.com".to_string(),
                uploader_label: "Ana".to_string(),
                category: Category::Ugly,
                status: PhotoStatus::Confirmed,
                created_at: Utc::now(),
                vote_count: 0,
            })
            .collect()
    }

    /// Settle flat, tilt right (back one), then lay flat again
    fn gesture_trace() -> TraceSource {
        let mut samples: Vec<MotionSample> = (0..=1_000)
            .step_by(100)
            .map(|ms| MotionSample::at_millis(ms, 0.0, 0.0, 9.8))
            .collect();
        samples.push(MotionSample::at_millis(1_100, 5.0, 0.0, 6.0));
        samples.push(MotionSample::at_millis(1_200, 5.0, 0.0, 6.0));
        samples.push(MotionSample::at_millis(1_300, 0.0, 0.0, 9.8));
        TraceSource::new(samples)
    }

    #[tokio::test(start_paused = true)]
    async fn test_gestures_drive_the_navigator() {
        let mut screen = GalleryScreen::mount(photos(3), gesture_trace(), SensorConfig::default()).await;
        assert_eq!(screen.mode(), GalleryMode::Gesture);

        let (event, transition) = screen.next_event().await.unwrap();
        assert_eq!(event.orientation, Orientation::TiltRight);
        assert_eq!(transition, Transition::Moved { from: 0, to: 2 });
        assert!(screen.image_loaded("p2"));

        let (_, transition) = screen.next_event().await.unwrap();
        assert_eq!(transition, Transition::Moved { from: 2, to: 0 });

        assert!(screen.next_event().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_sensor_falls_back_to_manual() {
        let mut screen = GalleryScreen::mount(photos(3), UnavailableSource, SensorConfig::default()).await;

        assert_eq!(screen.mode(), GalleryMode::Manual);
        assert!(!screen.is_subscribed());
        assert!(screen.next_event().await.is_none());
        assert_eq!(screen.step(Direction::Next), Transition::Moved { from: 0, to: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_stops_events() {
        let mut screen = GalleryScreen::mount(photos(3), gesture_trace(), SensorConfig::default()).await;
        assert!(screen.is_subscribed());

        screen.teardown();
        screen.teardown();

        assert!(!screen.is_subscribed());
        assert!(screen.next_event().await.is_none());
        assert_eq!(screen.navigator().current_index(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_gallery_skips_sensor() {
        let mut screen = GalleryScreen::mount(Vec::new(), gesture_trace(), SensorConfig::default()).await;
        assert_eq!(screen.mode(), GalleryMode::Manual);
        assert!(screen.navigator().is_empty());
        assert_eq!(screen.step(Direction::Next), Transition::Empty);
    }
}
