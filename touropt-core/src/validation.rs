//! Input plausibility validation, performed before any optimization work begins.

#[cfg(test)]
#[path = "../tests/unit/validation_test.rs"]
mod validation_test;

use crate::config::{keys, Config};
use crate::models::element::{Node, Resource};
use crate::utils::GenericResult;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// The outcome of a successful plausibility validation. Warnings report non-fatal anomalies,
/// e.g. a capacity check override in effect.
#[derive(Debug, Default)]
pub struct PlausibilityReport {
    /// Non-fatal anomalies detected during validation.
    pub warnings: Vec<String>,
}

/// Validates the request. Errors reported here are raised synchronously to the caller before
/// the background run starts.
pub fn validate_request(
    nodes: &[Arc<Node>],
    resources: &[Arc<Resource>],
    config: &Config,
) -> GenericResult<PlausibilityReport> {
    let mut report = PlausibilityReport::default();

    if config.get_bool(keys::LICENSE_CHECK_ENABLED)? {
        return Err("license validation is handled by an external collaborator and is not available here".into());
    }

    if resources.is_empty() {
        return Err("a request requires at least one resource".into());
    }

    let mut ids = FxHashSet::default();
    for id in nodes.iter().map(|node| node.id.as_str()).chain(resources.iter().map(|resource| resource.id.as_str())) {
        if !ids.insert(id) {
            return Err(format!("duplicate element id: '{id}'").into());
        }
    }

    validate_capacity(nodes, resources, config, &mut report)?;

    Ok(report)
}

/// Rejects the request when the required working time of mandatory nodes grossly exceeds the
/// available working hour capacity. The factor and the check itself are configurable.
fn validate_capacity(
    nodes: &[Arc<Node>],
    resources: &[Arc<Resource>],
    config: &Config,
    report: &mut PlausibilityReport,
) -> GenericResult<()> {
    let required: f64 = nodes.iter().filter(|node| !node.optional).map(|node| node.duration).sum();
    let available: f64 = resources.iter().map(|resource| resource.available_working_time()).sum();

    if !config.get_bool(keys::CAPACITY_CHECK_ENABLED)? {
        report.warnings.push("capacity plausibility check is overridden and skipped".to_string());
        return Ok(());
    }

    let factor = config.get_f64(keys::CAPACITY_CHECK_FACTOR)?;
    if required > available * factor {
        return Err(format!(
            "implausible request: mandatory nodes require {required:.0}s of working time \
             while only {available:.0}s are available (factor {factor})"
        )
        .into());
    }

    Ok(())
}
