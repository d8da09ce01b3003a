use std::fmt;
use std::time::Duration;

/// One accelerometer reading in m/s²
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Time since the sensor's epoch (monotonic)
    pub timestamp: Duration,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp: Duration) -> Self {
        Self { x, y, z, timestamp }
    }

    /// Convenience constructor for traces and tests
    pub fn at_millis(millis: u64, x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, Duration::from_millis(millis))
    }
}

/// Discrete device pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Lying flat, screen up
    #[default]
    Horizontal,
    /// Held upright
    Vertical,
    TiltLeft,
    TiltRight,
}

impl Orientation {
    pub fn label(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
            Orientation::TiltLeft => "tilt-left",
            Orientation::TiltRight => "tilt-right",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stabilized orientation change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationEvent {
    pub orientation: Orientation,
    pub previous: Orientation,
    /// Timestamp of the sample that caused the change
    pub at: Duration,
}
