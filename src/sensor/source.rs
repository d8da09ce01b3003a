//! Motion sources
//!
//! A source is polled by the subscription task once per sampling interval.
//! Hardware backends live outside this crate; `TraceSource` replays a
//! recorded trace and `UnavailableSource` stands in for a missing sensor.

use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use super::sample::MotionSample;
use crate::error::TraceError;

/// Result of polling a source once
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    Sample(MotionSample),
    /// No new data this tick
    Pending,
    /// The source will never produce data again
    Closed,
}

/// Something that produces accelerometer samples
pub trait MotionSource: Send + 'static {
    /// Requested sampling interval; sources that cannot honour it may ignore it
    fn set_update_interval(&mut self, _interval: Duration) {}

    fn read(&mut self) -> SensorReading;
}

/// Replays recorded samples in order, one per poll
#[derive(Debug, Clone, Default)]
pub struct TraceSource {
    samples: VecDeque<MotionSample>,
}

/// One entry of a JSON trace file
#[derive(Debug, Deserialize)]
struct TraceRecord {
    t_ms: u64,
    x: f64,
    y: f64,
    z: f64,
}

impl TraceSource {
    pub fn new(samples: Vec<MotionSample>) -> Self {
        Self {
            samples: samples.into(),
        }
    }

    /// Load a trace from a JSON file.
    ///
    /// Expected format:
    /// `[{"t_ms": 0, "x": 0.1, "y": 0.2, "z": 9.8}, ...]`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TraceError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|_| TraceError::NotFound(path.as_ref().display().to_string()))?;
        Self::parse(&contents)
    }

    /// Parse trace JSON, rejecting non-finite values and timestamps that go backwards
    pub fn parse(json: &str) -> Result<Self, TraceError> {
        let records: Vec<TraceRecord> = serde_json::from_str(json)?;

        let mut samples = Vec::with_capacity(records.len());
        let mut last_t = 0;
        for (index, record) in records.into_iter().enumerate() {
            if ![record.x, record.y, record.z].iter().all(|v| v.is_finite()) {
                return Err(TraceError::Format {
                    index,
                    message: "non-finite acceleration".to_string(),
                });
            }
            if record.t_ms < last_t {
                return Err(TraceError::Format {
                    index,
                    message: format!("timestamp {} goes back from {}", record.t_ms, last_t),
                });
            }
            last_t = record.t_ms;
            samples.push(MotionSample::at_millis(record.t_ms, record.x, record.y, record.z));
        }

        Ok(Self::new(samples))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl MotionSource for TraceSource {
    fn read(&mut self) -> SensorReading {
        match self.samples.pop_front() {
            Some(sample) => SensorReading::Sample(sample),
            None => SensorReading::Closed,
        }
    }
}

/// A sensor that is present in the API but never delivers data
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSource;

impl MotionSource for UnavailableSource {
    fn read(&mut self) -> SensorReading {
        SensorReading::Pending
    }
}
