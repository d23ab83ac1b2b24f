#[cfg(test)]
#[path = "../../../tests/unit/models/element/constraint_test.rs"]
mod constraint_test;

use crate::utils::{GenericError, GenericResult};
use rustc_hash::FxHashSet;

/// Specifies an ordering preference of a magnetic constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionPreference {
    /// Prefer placement at the beginning of the route.
    Front,
    /// Prefer placement at the end of the route.
    Back,
}

/// A constraint attached to exactly one node or resource, evaluated during scoring.
#[derive(Clone, Debug)]
pub enum Constraint {
    /// Restricts a node to resources which are members of the given alias group.
    MandatoryResource {
        /// A constraint alias id shared by allowed resources.
        alias_id: String,
        /// Whether a violation makes the route infeasible.
        hard: bool,
    },
    /// Draws a node towards (attraction) or away from (repulsion) co-location with target
    /// nodes in the same route. This variant is soft-only.
    Magnetic {
        /// Ids of target nodes.
        targets: FxHashSet<String>,
        /// True for attraction, false for repulsion.
        attraction: bool,
        /// An optional front/back ordering preference.
        preference: Option<PositionPreference>,
    },
    /// Penalizes visits whose zone codes are not covered by the visiting resource.
    ZoneCrossing {
        /// Zone codes guarded by this constraint.
        zones: FxHashSet<String>,
        /// Whether a crossing makes the route infeasible.
        hard: bool,
    },
}

impl Constraint {
    /// Creates a mandatory resource constraint.
    pub fn mandatory_resource(alias_id: &str, hard: bool) -> Self {
        Self::MandatoryResource { alias_id: alias_id.to_string(), hard }
    }

    /// Creates a magnetic constraint. Magnetic constraints are always soft.
    pub fn magnetic<I: IntoIterator<Item = String>>(
        targets: I,
        attraction: bool,
        preference: Option<PositionPreference>,
    ) -> Self {
        Self::Magnetic { targets: targets.into_iter().collect(), attraction, preference }
    }

    /// Creates a zone crossing constraint.
    pub fn zone_crossing<I: IntoIterator<Item = String>>(zones: I, hard: bool) -> Self {
        Self::ZoneCrossing { zones: zones.into_iter().collect(), hard }
    }

    /// Tries to mark the constraint as hard. Soft-only variants reject the flag.
    pub fn into_hard(self) -> GenericResult<Self> {
        match self {
            Self::MandatoryResource { alias_id, .. } => Ok(Self::MandatoryResource { alias_id, hard: true }),
            Self::ZoneCrossing { zones, .. } => Ok(Self::ZoneCrossing { zones, hard: true }),
            Self::Magnetic { .. } => {
                Err(GenericError::from("a magnetic constraint is soft-only and cannot be marked as hard"))
            }
        }
    }

    /// Checks whether the constraint is hard.
    pub fn is_hard(&self) -> bool {
        match self {
            Self::MandatoryResource { hard, .. } | Self::ZoneCrossing { hard, .. } => *hard,
            Self::Magnetic { .. } => false,
        }
    }
}
