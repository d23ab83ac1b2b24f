#[cfg(test)]
#[path = "../../../tests/unit/models/common/domain_test.rs"]
mod domain_test;

use crate::models::common::{Duration, Timestamp};
use crate::utils::compare_floats;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Represents a geographical position.
#[derive(Clone, Copy, Debug)]
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Location {
    /// Creates a new `Location`.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Checks whether two locations are considered the same place.
    pub fn is_same_place(&self, other: &Self) -> bool {
        compare_floats(self.lat, other.lat) == Ordering::Equal && compare_floats(self.lon, other.lon) == Ordering::Equal
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_place(other)
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lat.to_bits().hash(state);
        self.lon.to_bits().hash(state);
    }
}

/// Represents a time window.
#[derive(Clone, Debug)]
pub struct TimeWindow {
    /// Earliest possible time.
    pub start: Timestamp,
    /// Latest possible time.
    pub end: Timestamp,
}

impl TimeWindow {
    /// Creates a new `TimeWindow`.
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Returns an unlimited time window.
    pub fn max() -> Self {
        Self { start: 0., end: f64::MAX }
    }

    /// Returns duration of the time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks whether time window has intersection with another one (boundaries inclusive).
    pub fn intersects(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Checks whether a given timestamp lies within the time window.
    pub fn contains(&self, time: Timestamp) -> bool {
        self.start <= time && time <= self.end
    }

    /// Returns a new time window as an overlap of two, if any.
    pub fn overlapping(&self, other: &Self) -> Option<TimeWindow> {
        if self.intersects(other) {
            Some(TimeWindow::new(self.start.max(other.start), self.end.min(other.end)))
        } else {
            None
        }
    }

    /// Checks whether the time window is well formed.
    pub fn is_well_formed(&self) -> bool {
        compare_floats(self.start, self.end) != Ordering::Greater
    }
}

impl PartialEq<TimeWindow> for TimeWindow {
    fn eq(&self, other: &TimeWindow) -> bool {
        compare_floats(self.start, other.start) == Ordering::Equal
            && compare_floats(self.end, other.end) == Ordering::Equal
    }
}

impl Eq for TimeWindow {}

impl Hash for TimeWindow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.to_bits().hash(state);
        self.end.to_bits().hash(state);
    }
}

/// Represents a schedule of a single visit.
#[derive(Clone, Debug)]
pub struct Schedule {
    /// Arrival time.
    pub arrival: Timestamp,
    /// Departure time.
    pub departure: Timestamp,
}

impl Schedule {
    /// Creates a new `Schedule`.
    pub fn new(arrival: Timestamp, departure: Timestamp) -> Self {
        Self { arrival, departure }
    }
}

impl PartialEq<Schedule> for Schedule {
    fn eq(&self, other: &Schedule) -> bool {
        compare_floats(self.arrival, other.arrival) == Ordering::Equal
            && compare_floats(self.departure, other.departure) == Ordering::Equal
    }
}

impl Eq for Schedule {}
