use log::debug;
use std::time::Duration;

use super::sample::{MotionSample, Orientation, OrientationEvent};
use crate::config::SensorConfig;

/// Classify a single sample into an orientation.
///
/// Rules are checked in priority order and the first match wins. Tilts are
/// only accepted once `vertical_guard` has passed since the last vertical
/// reading, so lowering the phone from an upright hold does not register as
/// a tilt. No vertical reading yet counts as "long ago".
pub fn classify(
    sample: &MotionSample,
    previous: Orientation,
    last_vertical_at: Option<Duration>,
    config: &SensorConfig,
) -> Orientation {
    if sample.y.abs() > config.vertical_threshold {
        return Orientation::Vertical;
    }

    let guard_passed = match last_vertical_at {
        Some(at) => sample.timestamp.saturating_sub(at) > config.vertical_guard(),
        None => true,
    };

    if sample.x.abs() > config.tilt_threshold && guard_passed {
        if sample.x > 0.0 {
            Orientation::TiltRight
        } else {
            Orientation::TiltLeft
        }
    } else if sample.z.abs() > config.horizontal_threshold {
        Orientation::Horizontal
    } else {
        previous
    }
}

/// Whether `elapsed` (time since the subscription started) still falls
/// inside the settling window
pub fn is_settling(elapsed: Duration, config: &SensorConfig) -> bool {
    elapsed < config.settling()
}

/// Snapshot of the classifier state machine.
///
/// Never mutated in place: `reduce` returns the next value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassifierState {
    /// Last stabilized orientation (tracked during settling too)
    pub current: Orientation,
    /// Timestamp of the most recent vertical reading
    pub last_vertical_at: Option<Duration>,
}

/// Advance the state machine by one sample.
///
/// `elapsed` is the time since the subscription started, on the
/// subscription's clock. Returns the next state and, when the stabilized
/// orientation changed outside of the settling window, the change event.
pub fn reduce(
    state: ClassifierState,
    sample: &MotionSample,
    elapsed: Duration,
    config: &SensorConfig,
) -> (ClassifierState, Option<OrientationEvent>) {
    let next_orientation = classify(sample, state.current, state.last_vertical_at, config);

    // Only a real vertical reading restarts the guard, not a carried-over one
    let last_vertical_at = if sample.y.abs() > config.vertical_threshold {
        Some(sample.timestamp)
    } else {
        state.last_vertical_at
    };

    let next = ClassifierState {
        current: next_orientation,
        last_vertical_at,
    };

    if next_orientation == state.current {
        return (next, None);
    }

    if is_settling(elapsed, config) {
        debug!(
            "Settling ({} ms in): {} -> {} tracked without event (x={:.2} y={:.2} z={:.2})",
            elapsed.as_millis(),
            state.current,
            next_orientation,
            sample.x,
            sample.y,
            sample.z
        );
        return (next, None);
    }

    debug!(
        "Orientation change: {} -> {} (x={:.2} y={:.2} z={:.2})",
        state.current, next_orientation, sample.x, sample.y, sample.z
    );

    let event = OrientationEvent {
        orientation: next_orientation,
        previous: state.current,
        at: sample.timestamp,
    };
    (next, Some(event))
}

/// Stateful wrapper around `reduce` for a single sample stream
#[derive(Debug, Clone)]
pub struct OrientationClassifier {
    state: ClassifierState,
    config: SensorConfig,
}

impl OrientationClassifier {
    pub fn new(config: SensorConfig) -> Self {
        Self {
            state: ClassifierState::default(),
            config,
        }
    }

    /// Feed one sample read `elapsed` after the subscription started;
    /// returns an event when the stabilized orientation changed
    pub fn push(&mut self, sample: &MotionSample, elapsed: Duration) -> Option<OrientationEvent> {
        let (next, event) = reduce(self.state, sample, elapsed, &self.config);
        self.state = next;
        event
    }

    pub fn current(&self) -> Orientation {
        self.state.current
    }

    pub fn state(&self) -> ClassifierState {
        self.state
    }

    pub fn is_settling_at(&self, elapsed: Duration) -> bool {
        is_settling(elapsed, &self.config)
    }
}
