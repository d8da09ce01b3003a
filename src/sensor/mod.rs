/// Motion sensing
///
/// This module turns accelerometer samples into orientation changes:
/// - Sample and orientation types (sample.rs)
/// - The classifier state machine (classifier.rs)
/// - Motion sources, including trace replay (source.rs)
/// - The sampling task and the availability probe (subscription.rs)

pub mod sample;
pub mod classifier;
pub mod source;
pub mod subscription;

pub use classifier::{classify, is_settling, reduce, ClassifierState, OrientationClassifier};
pub use sample::{MotionSample, Orientation, OrientationEvent};
pub use source::{MotionSource, SensorReading, TraceSource, UnavailableSource};
pub use subscription::{probe, OrientationSubscription, SensorAvailability};
