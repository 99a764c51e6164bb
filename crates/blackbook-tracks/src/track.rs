use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One GPS sample from a recorded track.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct TrackPoint {
    /// Seconds since the Epoch.
    pub timestamp: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// A time-ordered sequence of GPS samples, possibly merged from several
/// recordings.
#[derive(Clone, Debug, Default)]
pub struct Track {
    points: Vec<TrackPoint>,
}

impl Track {
    /// Builds a track from samples in any order.
    pub fn new(mut points: Vec<TrackPoint>) -> Self {
        points.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { points }
    }

    /// Merges the samples of one or more JSON track files, each an
    /// array of `{timestamp, latitude, longitude}` objects, into a
    /// single time-ordered track.
    pub fn from_files(paths: &[impl AsRef<Path>]) -> Result<Self> {
        let mut points = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read track {}", path.display()))?;
            let samples: Vec<TrackPoint> = serde_json::from_str(&text)
                .with_context(|| format!("failed to parse track {}", path.display()))?;
            info!(path = %path.display(), samples = samples.len(), "loaded track");
            points.extend(samples);
        }
        Ok(Self::new(points))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Linearly interpolates a location for the given timestamp.
    /// Timestamps outside the recorded range clamp to the first or last
    /// sample; an empty track locates nothing.
    pub fn locate(&self, timestamp: f64) -> Option<(f64, f64)> {
        let first = self.points.first()?;
        let last = self.points.last()?;

        if timestamp <= first.timestamp {
            return Some((first.latitude, first.longitude));
        }
        if timestamp >= last.timestamp {
            return Some((last.latitude, last.longitude));
        }

        let upper = self
            .points
            .partition_point(|point| point.timestamp < timestamp);
        let hi = self.points[upper];
        let lo = self.points[upper - 1];

        if hi.timestamp == lo.timestamp {
            return Some((hi.latitude, hi.longitude));
        }

        let fraction = (timestamp - lo.timestamp) / (hi.timestamp - lo.timestamp);
        Some((
            lo.latitude + fraction * (hi.latitude - lo.latitude),
            lo.longitude + fraction * (hi.longitude - lo.longitude),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(timestamp: f64, latitude: f64, longitude: f64) -> TrackPoint {
        TrackPoint {
            timestamp,
            latitude,
            longitude,
        }
    }

    fn track() -> Track {
        Track::new(vec![
            point(100.0, 44.0, -123.0),
            point(200.0, 45.0, -122.0),
            point(400.0, 45.0, -120.0),
        ])
    }

    #[test]
    fn interpolates_between_samples() {
        let track = track();
        assert_eq!(track.locate(150.0), Some((44.5, -122.5)));
        assert_eq!(track.locate(300.0), Some((45.0, -121.0)));
    }

    #[test]
    fn exact_sample_timestamps_return_the_sample() {
        let track = track();
        assert_eq!(track.locate(200.0), Some((45.0, -122.0)));
    }

    #[test]
    fn out_of_range_timestamps_clamp_to_the_ends() {
        let track = track();
        assert_eq!(track.locate(0.0), Some((44.0, -123.0)));
        assert_eq!(track.locate(9999.0), Some((45.0, -120.0)));
    }

    #[test]
    fn samples_are_sorted_on_construction() {
        let track = Track::new(vec![
            point(400.0, 45.0, -120.0),
            point(100.0, 44.0, -123.0),
            point(200.0, 45.0, -122.0),
        ]);
        assert_eq!(track.len(), 3);
        assert_eq!(track.points()[0].timestamp, 100.0);
        assert_eq!(track.locate(150.0), Some((44.5, -122.5)));
    }

    #[test]
    fn empty_track_locates_nothing() {
        let track = Track::new(Vec::new());
        assert!(track.is_empty());
        assert_eq!(track.locate(100.0), None);
    }

    #[test]
    fn single_sample_answers_everything() {
        let track = Track::new(vec![point(100.0, 44.0, -123.0)]);
        assert_eq!(track.locate(50.0), Some((44.0, -123.0)));
        assert_eq!(track.locate(100.0), Some((44.0, -123.0)));
        assert_eq!(track.locate(500.0), Some((44.0, -123.0)));
    }

    #[test]
    fn track_points_round_trip_through_json() {
        let samples = vec![point(100.0, 44.0462, -123.0236)];
        let text = serde_json::to_string(&samples).unwrap();
        let parsed: Vec<TrackPoint> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, samples);
    }
}
