//! A versioned json representation of requests and solutions, kept apart from the core model.

#[cfg(test)]
#[path = "../tests/unit/format_test.rs"]
mod format_test;

use crate::builder::OptimizationBuilder;
use crate::runner::{InitialRoute, InitialSolution};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;
use touropt_core::models::element::{PositionPreference, StayOutPolicy};
use touropt_core::prelude::*;

/// The current document format version. Readers reject documents with a newer version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LocationDto {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TimeWindowDto {
    pub start: f64,
    pub end: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionPreferenceDto {
    Front,
    Back,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConstraintDto {
    #[serde(rename_all = "camelCase")]
    MandatoryResource { alias_id: String, hard: bool },
    #[serde(rename_all = "camelCase")]
    Magnetic {
        targets: Vec<String>,
        attraction: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preference: Option<PositionPreferenceDto>,
    },
    #[serde(rename_all = "camelCase")]
    ZoneCrossing { zones: Vec<String>, hard: bool },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PillarDto {
    pub window: TimeWindowDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDto {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationDto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opening_hours: Vec<TimeWindowDto>,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joint_duration: Option<f64>,
    #[serde(default)]
    pub min_duration: f64,
    #[serde(default = "default_importance")]
    pub importance: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load: Vec<i64>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub prefer_first_in_route: bool,
    #[serde(default)]
    pub prefer_last_in_route: bool,
    #[serde(default)]
    pub unload_all: bool,
    #[serde(default)]
    pub return_to_start: bool,
    #[serde(default = "default_true")]
    pub wait_on_early_arrival: bool,
    #[serde(default)]
    pub route_dependent_duration: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra_info: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pillar: Option<PillarDto>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHoursDto {
    pub window: TimeWindowDto,
    #[serde(default)]
    pub available_for_stay_out: bool,
    #[serde(default)]
    pub open_route: bool,
    #[serde(default = "default_true")]
    pub planning_relevant: bool,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostFactorsDto {
    #[serde(default)]
    pub fixed: f64,
    #[serde(default)]
    pub per_time: f64,
    #[serde(default)]
    pub per_distance: f64,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayOutPolicyDto {
    #[serde(default)]
    pub min_distance: f64,
    #[serde(default)]
    pub min_duration: f64,
    #[serde(default)]
    pub max_consecutive: usize,
    #[serde(default)]
    pub min_recovery_days: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDto {
    pub id: String,
    pub location: LocationDto,
    pub working_hours: Vec<WorkingHoursDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_working_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capacity: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_load: Vec<i64>,
    #[serde(default)]
    pub costs: CostFactorsDto,
    #[serde(default)]
    pub co2_emission_factor: f64,
    #[serde(default = "default_efficiency")]
    pub visit_duration_efficiency: f64,
    #[serde(default = "default_efficiency")]
    pub connection_time_efficiency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_alias_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stay_out_policy: Option<StayOutPolicyDto>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra_info: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintDto>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDto {
    pub from: String,
    pub to: String,
    pub distance: f64,
    pub duration: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionRouteDto {
    pub resource_id: String,
    pub window_idx: usize,
    pub node_ids: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionDto {
    pub routes: Vec<SolutionRouteDto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unassigned: Vec<String>,
}

/// The root of the json format: a complete request, optionally bundled with a prior solution.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub version: u32,
    pub nodes: Vec<NodeDto>,
    pub resources: Vec<ResourceDto>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgeDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<SolutionDto>,
}

fn default_importance() -> f64 {
    1.
}

fn default_true() -> bool {
    true
}

fn default_efficiency() -> f64 {
    1.
}

impl From<LocationDto> for Location {
    fn from(dto: LocationDto) -> Self {
        Self { lat: dto.lat, lon: dto.lon }
    }
}

impl From<Location> for LocationDto {
    fn from(location: Location) -> Self {
        Self { lat: location.lat, lon: location.lon }
    }
}

impl From<TimeWindowDto> for TimeWindow {
    fn from(dto: TimeWindowDto) -> Self {
        Self::new(dto.start, dto.end)
    }
}

impl From<&TimeWindow> for TimeWindowDto {
    fn from(window: &TimeWindow) -> Self {
        Self { start: window.start, end: window.end }
    }
}

impl From<PositionPreferenceDto> for PositionPreference {
    fn from(dto: PositionPreferenceDto) -> Self {
        match dto {
            PositionPreferenceDto::Front => PositionPreference::Front,
            PositionPreferenceDto::Back => PositionPreference::Back,
        }
    }
}

impl From<PositionPreference> for PositionPreferenceDto {
    fn from(preference: PositionPreference) -> Self {
        match preference {
            PositionPreference::Front => PositionPreferenceDto::Front,
            PositionPreference::Back => PositionPreferenceDto::Back,
        }
    }
}

impl From<&Constraint> for ConstraintDto {
    fn from(constraint: &Constraint) -> Self {
        match constraint {
            Constraint::MandatoryResource { alias_id, hard } => {
                ConstraintDto::MandatoryResource { alias_id: alias_id.clone(), hard: *hard }
            }
            Constraint::Magnetic { targets, attraction, preference } => ConstraintDto::Magnetic {
                targets: sorted(targets.iter()),
                attraction: *attraction,
                preference: preference.map(Into::into),
            },
            Constraint::ZoneCrossing { zones, hard } => {
                ConstraintDto::ZoneCrossing { zones: sorted(zones.iter()), hard: *hard }
            }
        }
    }
}

impl From<ConstraintDto> for Constraint {
    fn from(dto: ConstraintDto) -> Self {
        match dto {
            ConstraintDto::MandatoryResource { alias_id, hard } => Constraint::mandatory_resource(&alias_id, hard),
            ConstraintDto::Magnetic { targets, attraction, preference } => {
                Constraint::magnetic(targets, attraction, preference.map(Into::into))
            }
            ConstraintDto::ZoneCrossing { zones, hard } => Constraint::zone_crossing(zones, hard),
        }
    }
}

fn sorted<'a, I: Iterator<Item = &'a String>>(iter: I) -> Vec<String> {
    let mut values = iter.cloned().collect::<Vec<_>>();
    values.sort();
    values
}

impl Document {
    /// Captures a request and, optionally, an entity as a document of the current version.
    pub fn from_request(
        nodes: &[Arc<Node>],
        resources: &[Arc<Resource>],
        properties: &Properties,
        connector: &NodeConnector,
        solution: Option<&Entity>,
    ) -> Self {
        let mut edges = connector
            .edges()
            .map(|((from, to), connection)| EdgeDto {
                from: from.clone(),
                to: to.clone(),
                distance: connection.distance,
                duration: connection.duration,
            })
            .collect::<Vec<_>>();
        edges.sort_by(|left, right| (&left.from, &left.to).cmp(&(&right.from, &right.to)));

        Self {
            version: FORMAT_VERSION,
            nodes: nodes.iter().map(|node| node_to_dto(node)).collect(),
            resources: resources.iter().map(|resource| resource_to_dto(resource)).collect(),
            properties: properties.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect(),
            edges,
            solution: solution.map(entity_to_dto),
        }
    }

    /// Writes the document as pretty printed json.
    pub fn write<W: Write>(&self, writer: W) -> GenericResult<()> {
        serde_json::to_writer_pretty(writer, self).map_err(|err| format!("cannot serialize document: {err}").into())
    }

    /// Reads a document, rejecting unknown format versions.
    pub fn read<R: Read>(reader: R) -> GenericResult<Self> {
        let document: Self =
            serde_json::from_reader(reader).map_err(|err| GenericError::from(format!("cannot deserialize document: {err}")))?;

        if document.version > FORMAT_VERSION {
            return Err(format!(
                "unsupported document version {}, the latest supported is {FORMAT_VERSION}",
                document.version
            )
            .into());
        }

        Ok(document)
    }

    /// Turns the document into a preconfigured request builder. A bundled solution becomes the
    /// prior solution of the request, skipping construction.
    pub fn into_builder(self) -> GenericResult<OptimizationBuilder> {
        let nodes = self.nodes.into_iter().map(node_from_dto).collect::<GenericResult<Vec<_>>>()?;
        let resources = self.resources.into_iter().map(resource_from_dto).collect::<GenericResult<Vec<_>>>()?;

        let mut connector = NodeConnector::default();
        self.edges.iter().for_each(|edge| connector.add_edge(&edge.from, &edge.to, edge.distance, edge.duration));

        let mut builder = OptimizationBuilder::new();

        let rejected = builder.add_nodes(nodes);
        if !rejected.is_empty() {
            let ids = sorted(rejected.iter().map(|node| &node.id)).join(", ");
            return Err(format!("document contains duplicate node ids: [{ids}]").into());
        }

        let rejected = builder.add_resources(resources);
        if !rejected.is_empty() {
            let ids = sorted(rejected.iter().map(|resource| &resource.id)).join(", ");
            return Err(format!("document contains duplicate resource ids: [{ids}]").into());
        }

        builder.with_connector(connector);
        self.properties.iter().for_each(|(key, value)| {
            builder.with_property(key, value);
        });

        if let Some(solution) = self.solution {
            builder.with_initial_solution(InitialSolution {
                routes: solution
                    .routes
                    .into_iter()
                    .map(|route| InitialRoute {
                        resource_id: route.resource_id,
                        window_idx: route.window_idx,
                        node_ids: route.node_ids,
                    })
                    .collect(),
            });
        }

        Ok(builder)
    }
}

fn node_to_dto(node: &Arc<Node>) -> NodeDto {
    NodeDto {
        id: node.id.clone(),
        location: node.location.map(Into::into),
        opening_hours: node.opening_hours.iter().map(Into::into).collect(),
        duration: node.duration,
        joint_duration: node.joint_duration,
        min_duration: node.min_duration,
        importance: node.importance,
        load: if node.load.is_empty() { vec![] } else { node.load.as_vec() },
        optional: node.optional,
        prefer_first_in_route: node.prefer_first_in_route,
        prefer_last_in_route: node.prefer_last_in_route,
        unload_all: node.unload_all,
        return_to_start: node.return_to_start,
        wait_on_early_arrival: node.wait_on_early_arrival,
        route_dependent_duration: node.route_dependent_duration,
        extra_info: node.extra_info.clone(),
        qualifications: sorted(node.qualifications.iter()),
        constraints: node.constraints.iter().map(Into::into).collect(),
        pillar: node.pillar.as_ref().map(|pillar| PillarDto {
            window: (&pillar.window).into(),
            resource_id: pillar.resource_id.clone(),
        }),
    }
}

fn node_from_dto(dto: NodeDto) -> GenericResult<Arc<Node>> {
    let mut builder = NodeBuilder::new(&dto.id)
        .duration(dto.duration)
        .min_duration(dto.min_duration)
        .importance(dto.importance)
        .optional(dto.optional)
        .route_position(dto.prefer_first_in_route, dto.prefer_last_in_route)
        .unload_all(dto.unload_all)
        .return_to_start(dto.return_to_start)
        .wait_on_early_arrival(dto.wait_on_early_arrival)
        .route_dependent_duration(dto.route_dependent_duration)
        .extra_info(&dto.extra_info);

    if let Some(location) = dto.location {
        builder = builder.location(location.into());
    }
    if let Some(duration) = dto.joint_duration {
        builder = builder.joint_duration(duration);
    }
    if !dto.load.is_empty() {
        builder = builder.load(Load::try_new(dto.load)?);
    }
    if let Some(pillar) = dto.pillar {
        builder = builder.pillar(pillar.window.into(), pillar.resource_id.as_deref());
    }
    for window in dto.opening_hours {
        builder = builder.add_opening_hours(window.into());
    }
    for code in dto.qualifications.iter() {
        builder = builder.add_qualification(code);
    }
    for constraint in dto.constraints {
        builder = builder.add_constraint(constraint.into());
    }

    builder.build()
}

fn resource_to_dto(resource: &Arc<Resource>) -> ResourceDto {
    ResourceDto {
        id: resource.id.clone(),
        location: resource.location.into(),
        working_hours: resource
            .working_hours
            .iter()
            .map(|hours| WorkingHoursDto {
                window: (&hours.window).into(),
                available_for_stay_out: hours.available_for_stay_out,
                open_route: hours.open_route,
                planning_relevant: hours.planning_relevant,
            })
            .collect(),
        max_working_time: (resource.max_working_time != f64::MAX).then_some(resource.max_working_time),
        max_distance: (resource.max_distance != f64::MAX).then_some(resource.max_distance),
        capacity: if resource.capacity.is_empty() { vec![] } else { resource.capacity.as_vec() },
        initial_load: if resource.initial_load.is_empty() { vec![] } else { resource.initial_load.as_vec() },
        costs: CostFactorsDto {
            fixed: resource.costs.fixed,
            per_time: resource.costs.per_time,
            per_distance: resource.costs.per_distance,
        },
        co2_emission_factor: resource.co2_emission_factor,
        visit_duration_efficiency: resource.visit_duration_efficiency,
        connection_time_efficiency: resource.connection_time_efficiency,
        constraint_alias_id: resource.constraint_alias_id.clone(),
        stay_out_policy: Some(StayOutPolicyDto {
            min_distance: resource.stay_out_policy.min_distance,
            min_duration: resource.stay_out_policy.min_duration,
            max_consecutive: resource.stay_out_policy.max_consecutive,
            min_recovery_days: resource.stay_out_policy.min_recovery_days,
        }),
        extra_info: resource.extra_info.clone(),
        qualifications: sorted(resource.qualifications.iter()),
        constraints: resource.constraints.iter().map(Into::into).collect(),
    }
}

fn resource_from_dto(dto: ResourceDto) -> GenericResult<Arc<Resource>> {
    let mut builder = ResourceBuilder::new(&dto.id, dto.location.into())
        .costs(CostFactors { fixed: dto.costs.fixed, per_time: dto.costs.per_time, per_distance: dto.costs.per_distance })
        .co2_emission_factor(dto.co2_emission_factor)
        .efficiency(dto.visit_duration_efficiency, dto.connection_time_efficiency)
        .extra_info(&dto.extra_info);

    for hours in dto.working_hours {
        builder = builder.add_working_hours(WorkingHours {
            window: hours.window.into(),
            available_for_stay_out: hours.available_for_stay_out,
            open_route: hours.open_route,
            planning_relevant: hours.planning_relevant,
        });
    }
    if let Some(limit) = dto.max_working_time {
        builder = builder.max_working_time(limit);
    }
    if let Some(limit) = dto.max_distance {
        builder = builder.max_distance(limit);
    }
    if !dto.capacity.is_empty() {
        builder = builder.capacity(Load::try_new(dto.capacity)?);
    }
    if !dto.initial_load.is_empty() {
        builder = builder.initial_load(Load::try_new(dto.initial_load)?);
    }
    if let Some(alias_id) = dto.constraint_alias_id.as_deref() {
        builder = builder.constraint_alias_id(alias_id);
    }
    if let Some(policy) = dto.stay_out_policy {
        builder = builder.stay_out_policy(StayOutPolicy {
            min_distance: policy.min_distance,
            min_duration: policy.min_duration,
            max_consecutive: policy.max_consecutive,
            min_recovery_days: policy.min_recovery_days,
        });
    }
    for code in dto.qualifications.iter() {
        builder = builder.add_qualification(code);
    }
    for constraint in dto.constraints {
        builder = builder.add_constraint(constraint.into());
    }

    builder.build()
}

fn entity_to_dto(entity: &Entity) -> SolutionDto {
    SolutionDto {
        routes: entity
            .routes
            .iter()
            .filter(|route| !route.visits.is_empty())
            .map(|route| SolutionRouteDto {
                resource_id: route.resource.id.clone(),
                window_idx: route.window_idx,
                node_ids: route.visits.iter().map(|visit| visit.node.id.clone()).collect(),
            })
            .collect(),
        unassigned: sorted(entity.unassigned.iter()),
    }
}
