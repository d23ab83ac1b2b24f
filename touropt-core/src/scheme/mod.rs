//! The multi-phase algorithm scheme: a construction phase followed by configurable heuristic
//! phases which repeatedly mutate and re-score candidate entities.

mod construction;
pub use self::construction::{best_insertion, build_initial_entity, ConstructionKind};

mod moves;
pub use self::moves::{apply_random_move, insertion_positions};

mod annealing;
pub use self::annealing::SimulatedAnnealing;

mod genetic;
pub use self::genetic::GeneticEvolution;

use crate::config::{keys, Config, Properties};
use crate::evaluation::{Pipeline, PipelineBuilder};
use crate::models::solution::Entity;
use crate::utils::{GenericResult, InfoLogger, Random};
use std::sync::Arc;

/// Identifies the algorithm behind a heuristic stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeuristicKind {
    /// Simulated annealing with iteration and repetition counts.
    SimulatedAnnealing,
    /// Genetic evolution with generation and population counts.
    GeneticEvolution,
}

/// An independently configured heuristic stage of a scheme.
#[derive(Clone, Debug)]
pub struct HeuristicStage {
    /// The algorithm kind.
    pub kind: HeuristicKind,
    /// Whether the stage may prune unpromising candidate neighborhoods automatically.
    pub auto_filter: bool,
    /// Stage specific property overrides, taking priority over global configuration values.
    pub overrides: Properties,
}

impl HeuristicStage {
    /// Creates a stage with no overrides.
    pub fn new(kind: HeuristicKind) -> Self {
        Self { kind, auto_filter: true, overrides: Properties::default() }
    }
}

/// Shared state handed to heuristic stages while they search.
pub struct SearchContext<'a> {
    /// The scoring pipeline.
    pub pipeline: &'a Pipeline,
    /// The random generator.
    pub random: Arc<dyn Random + Send + Sync>,
    /// The logger.
    pub logger: InfoLogger,
    /// Polled by stages between iterations; a true value stops the search.
    pub is_cancelled: &'a (dyn Fn() -> bool + Sync),
    /// Invoked whenever a stage finds a better entity, with the new cost and the stage local
    /// progress in the `[0, 1]` range.
    pub on_improvement: &'a mut dyn FnMut(&Entity, f64, f64) -> GenericResult<()>,
}

/// Orchestrates construction and heuristic phases. A scheme may be swapped wholesale by the
/// caller before a run starts and may inject custom default configuration values which are
/// overridden by any value the caller sets explicitly.
pub trait OptimizationScheme: Send + Sync {
    /// Returns a scheme id used in progress events.
    fn name(&self) -> &str;

    /// Returns scheme default properties, overridden by explicit caller settings.
    fn default_properties(&self) -> Properties {
        Properties::default()
    }

    /// The injection point for custom restrictions. Runs before construction begins.
    fn post_create(&self, _pipeline: &mut PipelineBuilder) -> GenericResult<()> {
        Ok(())
    }

    /// Returns the construction strategy, if assisted construction is enabled.
    fn construction(&self) -> Option<ConstructionKind> {
        Some(ConstructionKind::SimultaneousSavings)
    }

    /// Returns configured heuristic stages in execution order.
    fn stages(&self) -> Vec<HeuristicStage>;
}

/// The built-in scheme: simultaneous space-savings construction followed by one simulated
/// annealing stage.
#[derive(Default)]
pub struct DefaultScheme;

impl OptimizationScheme for DefaultScheme {
    fn name(&self) -> &str {
        "default"
    }

    fn stages(&self) -> Vec<HeuristicStage> {
        vec![HeuristicStage::new(HeuristicKind::SimulatedAnnealing)]
    }
}

/// Runs a single heuristic stage on the given entity, returning the improved entity and cost.
pub fn run_stage(
    stage: &HeuristicStage,
    entity: Entity,
    config: &Config,
    ctx: &mut SearchContext<'_>,
) -> GenericResult<(Entity, f64)> {
    // stage overrides win over the resolved global configuration
    let resolve_usize = |key: &str| -> GenericResult<usize> {
        match stage.overrides.get(key) {
            Some(raw) => raw.parse().map_err(|_| format!("property '{key}' expects an integer value, got '{raw}'").into()),
            None => config.get_usize(key),
        }
    };

    let (entity, cost) = match stage.kind {
        HeuristicKind::SimulatedAnnealing => {
            let algorithm = SimulatedAnnealing {
                iterations: resolve_usize(keys::ANNEALING_ITERATIONS)?,
                repetitions: resolve_usize(keys::ANNEALING_REPETITIONS)?,
                max_non_improving: resolve_usize(keys::EXIT_GENERATIONS)?,
                auto_filter: stage.auto_filter,
            };
            algorithm.solve(entity, ctx)?
        }
        HeuristicKind::GeneticEvolution => {
            let algorithm = GeneticEvolution {
                generations: resolve_usize(keys::GENETIC_GENERATIONS)?,
                population_size: resolve_usize(keys::GENETIC_POPULATION)?.max(2),
                max_non_improving: resolve_usize(keys::EXIT_GENERATIONS)?,
                auto_filter: stage.auto_filter,
            };
            algorithm.solve(entity, ctx)?
        }
    };

    (ctx.logger)(&format!("{:?} stage finished with cost {cost:.2}", stage.kind));

    Ok((entity, cost))
}
