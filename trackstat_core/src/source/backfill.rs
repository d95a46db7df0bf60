use std::collections::VecDeque;

use log::{debug, warn};
use time::OffsetDateTime;

use crate::{
    geo_math::{Lat, Lon},
    model::RawPoint,
};

/// One sample from a device, as decoded. Devices sometimes log elevation
/// and heart rate for a while before they get a GPS fix, so the position
/// may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSample {
    pub latitude: Option<Lat>,
    pub longitude: Option<Lon>,
    pub elevation: Option<f64>,
    pub time: OffsetDateTime,
    pub heart_rate: Option<u16>,
    pub cadence: Option<u16>,
}

impl DeviceSample {
    pub fn has_position(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Fills in every field that is missing here from `other`. Fields we
    /// already have are never overwritten.
    fn fill_missing_from(&mut self, other: &DeviceSample) {
        self.latitude = self.latitude.or(other.latitude);
        self.longitude = self.longitude.or(other.longitude);
        self.elevation = self.elevation.or(other.elevation);
        self.heart_rate = self.heart_rate.or(other.heart_rate);
        self.cadence = self.cadence.or(other.cadence);
    }

    fn into_raw_point(self, point_no: u32) -> RawPoint {
        RawPoint {
            point_no,
            track_no: 0,
            segment_no: 0,
            latitude: self.latitude,
            longitude: self.longitude,
            elevation: self.elevation,
            time: Some(self.time),
            heart_rate: self.heart_rate,
            cadence: self.cadence,
        }
    }
}

/// Holds samples that arrived without a position until a sample with a
/// position turns up, then patches them from it and releases them in
/// their original order. Point numbers are handed out as points are
/// released, so they follow emission order.
#[derive(Debug)]
pub struct BackfillQueue {
    pending: VecDeque<DeviceSample>,
    limit: usize,
    emitted: Vec<RawPoint>,
    discarded: usize,
}

impl BackfillQueue {
    /// Creates a queue that holds at most `limit` samples. When it is full
    /// the oldest sample is dropped to make room.
    pub fn new(limit: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            limit,
            emitted: Vec::new(),
            discarded: 0,
        }
    }

    pub fn push(&mut self, sample: DeviceSample) {
        if !sample.has_position() {
            self.hold(sample);
            return;
        }

        if !self.pending.is_empty() {
            debug!(
                "Backfilling {} samples from the sample at {}",
                self.pending.len(),
                sample.time
            );
        }

        while let Some(mut held) = self.pending.pop_front() {
            held.fill_missing_from(&sample);
            self.emit(held);
        }

        self.emit(sample);
    }

    fn hold(&mut self, sample: DeviceSample) {
        if self.limit == 0 {
            self.discarded += 1;
            return;
        }

        if self.pending.len() == self.limit {
            if let Some(dropped) = self.pending.pop_front() {
                warn!(
                    "Backfill queue is full ({} samples), dropping the sample at {}",
                    self.limit, dropped.time
                );
                self.discarded += 1;
            }
        }

        self.pending.push_back(sample);
    }

    fn emit(&mut self, sample: DeviceSample) {
        let point_no = self.emitted.len() as u32;
        self.emitted.push(sample.into_raw_point(point_no));
    }

    /// Number of samples currently waiting for a position.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Ends the stream. Samples that never got a position are discarded.
    pub fn finish(mut self) -> Vec<RawPoint> {
        self.discarded += self.pending.len();
        if self.discarded > 0 {
            warn!(
                "Discarded {} samples that had no resolvable position",
                self.discarded
            );
        }
        self.pending.clear();
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use time::{macros::datetime, Duration};

    use super::*;

    fn sample(secs: i64, position: Option<(f64, f64)>) -> DeviceSample {
        DeviceSample {
            latitude: position.map(|p| p.0),
            longitude: position.map(|p| p.1),
            elevation: Some(100.0 + secs as f64),
            time: datetime!(2021-03-04 09:00:00 UTC) + Duration::seconds(secs),
            heart_rate: Some(120 + secs as u16),
            cadence: Some(80 + secs as u16),
        }
    }

    #[test]
    fn samples_without_position_are_backfilled_in_order() {
        let mut queue = BackfillQueue::new(100);
        queue.push(sample(0, None));
        queue.push(sample(1, None));
        queue.push(sample(2, None));
        assert_eq!(queue.pending_len(), 3);
        queue.push(sample(3, Some((10.0, 20.0))));
        assert_eq!(queue.pending_len(), 0);

        let points = queue.finish();
        assert_eq!(points.len(), 4);
        for (idx, p) in points.iter().enumerate() {
            let secs = idx as i64;
            assert_eq!(p.point_no, idx as u32);
            assert_eq!(p.latitude, Some(10.0));
            assert_eq!(p.longitude, Some(20.0));
            // Everything else is as it was recorded.
            assert_eq!(p.elevation, Some(100.0 + secs as f64));
            assert_eq!(p.heart_rate, Some(120 + secs as u16));
            assert_eq!(p.cadence, Some(80 + secs as u16));
            assert_eq!(
                p.time,
                Some(datetime!(2021-03-04 09:00:00 UTC) + Duration::seconds(secs))
            );
        }
    }

    #[test]
    fn present_values_are_never_overwritten() {
        let mut queue = BackfillQueue::new(100);
        let mut partial = sample(0, None);
        partial.latitude = Some(11.0);
        partial.heart_rate = None;
        queue.push(partial);
        queue.push(sample(1, Some((10.0, 20.0))));

        let points = queue.finish();
        assert_eq!(points[0].latitude, Some(11.0));
        assert_eq!(points[0].longitude, Some(20.0));
        assert_eq!(points[0].heart_rate, Some(121));
        assert_eq!(points[0].cadence, Some(80));
    }

    #[test]
    fn trailing_samples_are_discarded() {
        let mut queue = BackfillQueue::new(100);
        queue.push(sample(0, Some((1.0, 2.0))));
        queue.push(sample(1, None));
        queue.push(sample(2, None));

        let points = queue.finish();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].point_no, 0);
    }

    #[test]
    fn point_numbers_follow_emission_order() {
        let mut queue = BackfillQueue::new(100);
        queue.push(sample(0, Some((1.0, 2.0))));
        queue.push(sample(1, None));
        queue.push(sample(2, Some((1.0, 2.1))));

        let numbers: Vec<u32> = queue.finish().iter().map(|p| p.point_no).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
    }

    #[test]
    fn full_queue_drops_oldest() {
        let mut queue = BackfillQueue::new(2);
        queue.push(sample(0, None));
        queue.push(sample(1, None));
        queue.push(sample(2, None));
        queue.push(sample(3, Some((5.0, 6.0))));

        let points = queue.finish();
        let hrs: Vec<Option<u16>> = points.iter().map(|p| p.heart_rate).collect();
        assert_eq!(hrs, vec![Some(121), Some(122), Some(123)]);
    }
}
