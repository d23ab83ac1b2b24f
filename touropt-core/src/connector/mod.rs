//! Resolves element-to-element travel distance and duration.

#[cfg(test)]
#[path = "../../tests/unit/connector/connector_test.rs"]
mod connector_test;

use crate::models::common::{Distance, Duration, Location};
use crate::models::element::Resource;
use rustc_hash::FxHashMap;
use std::sync::Arc;

const EARTH_RADIUS_METERS: f64 = 6_371_000.;

/// Travel data between two elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct Connection {
    /// Travel distance.
    pub distance: Distance,
    /// Driving duration at nominal speed.
    pub duration: Duration,
}

/// A caller replaceable strategy used when no explicit edge was registered.
pub trait BackupElementConnector: Send + Sync {
    /// Estimates a connection between two locations.
    fn estimate(&self, from: &Location, to: &Location) -> Connection;
}

/// Estimates travel over a flat-earth (equirectangular) distance at an average speed.
pub struct FlatEarthConnector {
    /// Average speed in meters per second.
    pub average_speed: f64,
}

impl Default for FlatEarthConnector {
    fn default() -> Self {
        // 50 km/h
        Self { average_speed: 50_000. / 3_600. }
    }
}

impl BackupElementConnector for FlatEarthConnector {
    fn estimate(&self, from: &Location, to: &Location) -> Connection {
        let mean_lat = ((from.lat + to.lat) / 2.).to_radians();
        let x = (to.lon - from.lon).to_radians() * mean_lat.cos();
        let y = (to.lat - from.lat).to_radians();
        let distance = EARTH_RADIUS_METERS * (x * x + y * y).sqrt();

        Connection { distance, duration: distance / self.average_speed }
    }
}

/// Estimates travel over a great-circle (haversine) distance with a road correction factor.
pub struct HaversineConnector {
    /// Average speed in meters per second.
    pub average_speed: f64,
    /// Multiplier applied to the beeline distance to approximate road distance.
    pub correction_factor: f64,
}

impl Default for HaversineConnector {
    fn default() -> Self {
        Self { average_speed: 50_000. / 3_600., correction_factor: 1.3 }
    }
}

impl BackupElementConnector for HaversineConnector {
    fn estimate(&self, from: &Location, to: &Location) -> Connection {
        let d_lat = (to.lat - from.lat).to_radians();
        let d_lon = (to.lon - from.lon).to_radians();
        let a = (d_lat / 2.).sin().powi(2)
            + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lon / 2.).sin().powi(2);
        let distance = 2. * EARTH_RADIUS_METERS * a.sqrt().asin() * self.correction_factor;

        Connection { distance, duration: distance / self.average_speed }
    }
}

/// Resolves travel data between elements using an explicit edge table with a backup estimator
/// fallback. Pure over its inputs and the registered edges, deterministic within one run.
pub struct NodeConnector {
    edges: FxHashMap<(String, String), Connection>,
    backup: Arc<dyn BackupElementConnector>,
}

impl Default for NodeConnector {
    fn default() -> Self {
        Self { edges: FxHashMap::default(), backup: Arc::new(FlatEarthConnector::default()) }
    }
}

impl NodeConnector {
    /// Creates a connector with the given backup strategy.
    pub fn new(backup: Arc<dyn BackupElementConnector>) -> Self {
        Self { edges: FxHashMap::default(), backup }
    }

    /// Registers an explicit edge between two element ids.
    pub fn add_edge(&mut self, from: &str, to: &str, distance: Distance, duration: Duration) {
        self.edges.insert((from.to_string(), to.to_string()), Connection { distance, duration });
    }

    /// Returns registered edges.
    pub fn edges(&self) -> impl Iterator<Item = (&(String, String), &Connection)> + '_ {
        self.edges.iter()
    }

    /// Resolves a connection between two elements for a specific visiting resource. Duration is
    /// scaled by the resource connection time efficiency. Pure-event endpoints yield an empty
    /// connection.
    pub fn connection(
        &self,
        from: (&str, Option<Location>),
        to: (&str, Option<Location>),
        resource: &Resource,
    ) -> Connection {
        let connection = self
            .edges
            .get(&(from.0.to_string(), to.0.to_string()))
            .copied()
            .or_else(|| match (from.1, to.1) {
                (Some(from), Some(to)) => Some(self.backup.estimate(&from, &to)),
                _ => None,
            })
            .unwrap_or_default();

        Connection {
            distance: connection.distance,
            duration: connection.duration / resource.connection_time_efficiency,
        }
    }
}
