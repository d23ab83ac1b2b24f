//! A flat, string keyed configuration surface of engine properties.

#[cfg(test)]
#[path = "../../tests/unit/config/config_test.rs"]
mod config_test;

use crate::utils::{GenericError, GenericResult};
use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

/// Well known property keys.
pub mod keys {
    /// Exit condition: amount of non-improving generations before a heuristic stage stops.
    pub const EXIT_GENERATIONS: &str = "exit.generations";
    /// Iterations per simulated annealing repetition.
    pub const ANNEALING_ITERATIONS: &str = "annealing.iterations";
    /// Simulated annealing repetitions, each restarted from the incumbent best.
    pub const ANNEALING_REPETITIONS: &str = "annealing.repetitions";
    /// Generations of the genetic evolution stage.
    pub const GENETIC_GENERATIONS: &str = "genetic.generations";
    /// Population size of the genetic evolution stage.
    pub const GENETIC_POPULATION: &str = "genetic.population";
    /// CPU core budget of the engine.
    pub const CPU_CORES: &str = "cpu.cores";
    /// Cost weight per emitted CO2 unit.
    pub const COST_CO2_WEIGHT: &str = "cost.co2.weight";
    /// Cost per crossing into a zone the resource is not qualified for.
    pub const COST_ZONE_CROSSING: &str = "cost.zone.crossing";
    /// Penalty weight for skipping an optional node, scaled by node importance.
    pub const COST_SKIP_PENALTY: &str = "cost.skip.penalty";
    /// Cost weight of magnetic constraint violations.
    pub const COST_MAGNETIC_WEIGHT: &str = "cost.magnetic.weight";
    /// Cost weight of first/last route position preferences.
    pub const COST_POSITION_WEIGHT: &str = "cost.position.weight";
    /// Toggles the pre-run capacity plausibility check.
    pub const CAPACITY_CHECK_ENABLED: &str = "plausibility.capacity.enabled";
    /// Ratio of required to available working time above which a request is rejected.
    pub const CAPACITY_CHECK_FACTOR: &str = "plausibility.capacity.factor";
    /// Toggles license validation, handled by an external collaborator.
    pub const LICENSE_CHECK_ENABLED: &str = "license.check.enabled";
}

lazy_static! {
    /// Known keys with their engine built-in defaults.
    static ref BUILT_IN_DEFAULTS: FxHashMap<&'static str, &'static str> = {
        let mut map = FxHashMap::default();
        map.insert(keys::EXIT_GENERATIONS, "1000");
        map.insert(keys::ANNEALING_ITERATIONS, "500");
        map.insert(keys::ANNEALING_REPETITIONS, "1");
        map.insert(keys::GENETIC_GENERATIONS, "200");
        map.insert(keys::GENETIC_POPULATION, "16");
        map.insert(keys::CPU_CORES, "0");
        map.insert(keys::COST_CO2_WEIGHT, "0.0");
        map.insert(keys::COST_ZONE_CROSSING, "100.0");
        map.insert(keys::COST_SKIP_PENALTY, "1000.0");
        map.insert(keys::COST_MAGNETIC_WEIGHT, "100.0");
        map.insert(keys::COST_POSITION_WEIGHT, "10.0");
        map.insert(keys::CAPACITY_CHECK_ENABLED, "true");
        map.insert(keys::CAPACITY_CHECK_FACTOR, "2.0");
        map.insert(keys::LICENSE_CHECK_ENABLED, "false");
        map
    };
}

/// A flat map of string keyed engine properties.
#[derive(Clone, Debug, Default)]
pub struct Properties {
    values: FxHashMap<String, String>,
}

impl Properties {
    /// Sets a property value.
    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Returns a raw property value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|value| value.as_str())
    }

    /// Returns all set properties.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.values.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Rejects unknown keys with a descriptive plausibility error.
    pub fn validate(&self) -> GenericResult<()> {
        let mut unknown = self
            .values
            .keys()
            .filter(|key| !BUILT_IN_DEFAULTS.contains_key(key.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        if unknown.is_empty() {
            Ok(())
        } else {
            unknown.sort();
            Err(format!(
                "unknown engine properties: [{}], known keys are: [{}]",
                unknown.join(", "),
                get_known_keys().join(", ")
            )
            .into())
        }
    }
}

/// Returns a sorted list of all known property keys.
pub fn get_known_keys() -> Vec<&'static str> {
    let mut keys = BUILT_IN_DEFAULTS.keys().copied().collect::<Vec<_>>();
    keys.sort_unstable();
    keys
}

/// A layered, read-only view over explicit caller properties, scheme defaults and engine
/// built-in defaults. Explicit settings always win over scheme defaults which always win over
/// built-in defaults.
#[derive(Clone, Debug, Default)]
pub struct Config {
    explicit: Properties,
    scheme_defaults: Properties,
}

impl Config {
    /// Creates a config view from explicit and scheme provided layers.
    pub fn new(explicit: Properties, scheme_defaults: Properties) -> GenericResult<Self> {
        explicit.validate()?;
        scheme_defaults.validate()?;

        Ok(Self { explicit, scheme_defaults })
    }

    /// Returns explicit caller properties.
    pub fn explicit(&self) -> &Properties {
        &self.explicit
    }

    /// Resolves a raw value applying layer precedence.
    pub fn get_raw(&self, key: &str) -> GenericResult<&str> {
        self.explicit
            .get(key)
            .or_else(|| self.scheme_defaults.get(key))
            .or_else(|| BUILT_IN_DEFAULTS.get(key).copied())
            .ok_or_else(|| GenericError::from(format!("unknown engine property: '{key}'")))
    }

    /// Resolves a float property.
    pub fn get_f64(&self, key: &str) -> GenericResult<f64> {
        let raw = self.get_raw(key)?;
        raw.parse().map_err(|_| format!("property '{key}' expects a float value, got '{raw}'").into())
    }

    /// Resolves an unsigned integer property.
    pub fn get_usize(&self, key: &str) -> GenericResult<usize> {
        let raw = self.get_raw(key)?;
        raw.parse().map_err(|_| format!("property '{key}' expects an integer value, got '{raw}'").into())
    }

    /// Resolves a boolean property.
    pub fn get_bool(&self, key: &str) -> GenericResult<bool> {
        let raw = self.get_raw(key)?;
        raw.parse().map_err(|_| format!("property '{key}' expects a boolean value, got '{raw}'").into())
    }
}
