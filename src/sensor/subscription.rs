use log::{debug, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::classifier::OrientationClassifier;
use super::sample::OrientationEvent;
use super::source::{MotionSource, SensorReading};
use crate::config::SensorConfig;

/// A running sensor subscription.
///
/// Samples are read and classified one at a time inside a single task, so
/// classification is never concurrent for one stream. Dropping the handle
/// aborts the task: nothing touches the event channel after teardown.
#[derive(Debug)]
pub struct OrientationSubscription {
    handle: JoinHandle<()>,
}

impl OrientationSubscription {
    /// Start sampling `source` and forward orientation changes.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start<S: MotionSource>(
        mut source: S,
        config: SensorConfig,
    ) -> (Self, mpsc::UnboundedReceiver<OrientationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        source.set_update_interval(config.sample_interval());
        // Settling counts from here, however long the sensor takes to deliver
        let started = Instant::now();

        let handle = tokio::spawn(async move {
            let mut classifier = OrientationClassifier::new(config);
            let mut ticker = time::interval(config.sample_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match source.read() {
                    SensorReading::Sample(sample) => {
                        if let Some(event) = classifier.push(&sample, started.elapsed()) {
                            if tx.send(event).is_err() {
                                debug!("Orientation receiver dropped, stopping subscription");
                                break;
                            }
                        }
                    }
                    SensorReading::Pending => {}
                    SensorReading::Closed => {
                        info!("Motion source closed");
                        break;
                    }
                }
            }
        });

        info!(
            "Orientation subscription started ({} ms interval)",
            config.sample_interval_ms
        );
        (Self { handle }, rx)
    }

    /// Whether the sampling task is still running
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop sampling. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl Drop for OrientationSubscription {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            debug!("Cancelling orientation subscription");
        }
        self.handle.abort();
    }
}

/// Whether a motion sensor delivered data within the probe timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorAvailability {
    Available,
    Unavailable,
}

/// Wait for one sample from `source`, giving up after the probe timeout.
///
/// The probe consumes what it reads; subscribe with a fresh source afterwards.
pub async fn probe<S: MotionSource>(source: &mut S, config: &SensorConfig) -> SensorAvailability {
    source.set_update_interval(config.sample_interval());
    let interval = config.sample_interval();

    let first_sample = async {
        let mut ticker = time::interval(interval);
        loop {
            ticker.tick().await;
            match source.read() {
                SensorReading::Sample(_) => return true,
                SensorReading::Closed => return false,
                SensorReading::Pending => {}
            }
        }
    };

    match time::timeout(config.probe_timeout(), first_sample).await {
        Ok(true) => SensorAvailability::Available,
        Ok(false) | Err(_) => {
            info!("No motion data within {} ms", config.probe_timeout_ms);
            SensorAvailability::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::sample::{MotionSample, Orientation};
    use crate::sensor::source::{TraceSource, UnavailableSource};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Counts reads and never delivers
    struct CountingSource {
        reads: Arc<AtomicUsize>,
    }

    impl MotionSource for CountingSource {
        fn read(&mut self) -> SensorReading {
            self.reads.fetch_add(1, Ordering::SeqCst);
            SensorReading::Pending
        }
    }

    /// Sensor that warms up slowly: nothing for 900 ms, then flat readings
    /// and a left tilt from 1100 ms on, all timed from creation
    struct SlowStart {
        created: Instant,
    }

    impl MotionSource for SlowStart {
        fn read(&mut self) -> SensorReading {
            let elapsed = self.created.elapsed();
            let ms = elapsed.as_millis();
            if ms < 900 {
                SensorReading::Pending
            } else if ms < 1_100 {
                SensorReading::Sample(MotionSample::new(0.0, 0.0, 9.8, elapsed))
            } else if ms <= 1_300 {
                SensorReading::Sample(MotionSample::new(-5.0, 0.0, 6.0, elapsed))
            } else {
                SensorReading::Closed
            }
        }
    }

    fn trace() -> TraceSource {
        let mut samples = Vec::new();
        // One second of the phone lying flat, then a left tilt and back
        for ms in (0..=1_000).step_by(100) {
            samples.push(MotionSample::at_millis(ms, 0.0, 0.0, 9.8));
        }
        samples.push(MotionSample::at_millis(1_100, -4.5, 0.5, 6.0));
        samples.push(MotionSample::at_millis(1_200, -4.5, 0.5, 6.0));
        samples.push(MotionSample::at_millis(1_300, 0.0, 0.0, 9.8));
        TraceSource::new(samples)
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscription_forwards_changes_in_order() {
        let (subscription, mut rx) = OrientationSubscription::start(trace(), SensorConfig::default());

        let mut seen = Vec::new();
        while let Some(event) = rx.recv().await {
            seen.push(event.orientation);
        }
        assert_eq!(seen, vec![Orientation::TiltLeft, Orientation::Horizontal]);
        assert!(!subscription.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settling_counts_from_subscription_start() {
        let source = SlowStart {
            created: Instant::now(),
        };
        let (_subscription, mut rx) = OrientationSubscription::start(source, SensorConfig::default());

        let mut seen = Vec::new();
        while let Some(event) = rx.recv().await {
            seen.push((event.orientation, event.at));
        }
        assert_eq!(seen, vec![(Orientation::TiltLeft, Duration::from_millis(1_100))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_sampling() {
        let reads = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            reads: Arc::clone(&reads),
        };
        let (subscription, mut rx) = OrientationSubscription::start(source, SensorConfig::default());

        time::sleep(Duration::from_millis(350)).await;
        assert!(reads.load(Ordering::SeqCst) >= 3);

        drop(subscription);
        assert!(rx.recv().await.is_none());

        let after_teardown = reads.load(Ordering::SeqCst);
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(reads.load(Ordering::SeqCst), after_teardown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_times_out_without_data() {
        let started = time::Instant::now();
        let availability = probe(&mut UnavailableSource, &SensorConfig::default()).await;

        assert_eq!(availability, SensorAvailability::Unavailable);
        assert!(started.elapsed() >= Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_sees_first_sample() {
        let mut source = trace();
        let availability = probe(&mut source, &SensorConfig::default()).await;
        assert_eq!(availability, SensorAvailability::Available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_on_empty_trace() {
        let availability = probe(&mut TraceSource::default(), &SensorConfig::default()).await;
        assert_eq!(availability, SensorAvailability::Unavailable);
    }
}
