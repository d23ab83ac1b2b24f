#[cfg(test)]
#[path = "../../tests/unit/scheme/annealing_test.rs"]
mod annealing_test;

use crate::models::solution::Entity;
use crate::scheme::moves::apply_random_move;
use crate::scheme::SearchContext;
use crate::utils::GenericResult;

const COOLING_FACTOR: f64 = 0.97;
const MIN_TEMPERATURE: f64 = 1E-3;

/// A simulated annealing stage. Each repetition restarts from the incumbent best with a fresh
/// temperature; the cooling schedule is geometric.
pub struct SimulatedAnnealing {
    /// Iterations per repetition.
    pub iterations: usize,
    /// Amount of repetitions.
    pub repetitions: usize,
    /// Stops a repetition early after this many non-improving iterations.
    pub max_non_improving: usize,
    /// Whether unpromising candidate neighborhoods are pruned automatically.
    pub auto_filter: bool,
}

impl SimulatedAnnealing {
    /// Runs the stage and returns the best found entity with its cost.
    pub fn solve(&self, entity: Entity, ctx: &mut SearchContext<'_>) -> GenericResult<(Entity, f64)> {
        let connector = ctx.pipeline.connector().clone();

        let mut best = entity;
        let mut best_cost = ctx.pipeline.evaluate(&mut best)?.cost;

        let total = (self.iterations * self.repetitions.max(1)).max(1) as f64;

        for repetition in 0..self.repetitions.max(1) {
            let mut current = best.deep_copy();
            let mut current_cost = best_cost;
            let mut temperature = (best_cost.abs() * 0.1).max(1.);
            let mut non_improving = 0_usize;

            for iteration in 0..self.iterations {
                if (ctx.is_cancelled)() {
                    return Ok((best, best_cost));
                }

                let mut candidate = current.deep_copy();
                if !apply_random_move(&mut candidate, ctx.random.as_ref(), &connector, self.auto_filter) {
                    continue;
                }

                let cost = ctx.pipeline.evaluate(&mut candidate)?.cost;
                let delta = cost - current_cost;

                if delta < 0. || ctx.random.is_hit((-delta / temperature).exp()) {
                    current = candidate;
                    current_cost = cost;
                }

                if current_cost < best_cost {
                    best = current.deep_copy();
                    best_cost = current_cost;
                    non_improving = 0;

                    let progress = ((repetition * self.iterations + iteration + 1) as f64 / total).min(1.);
                    (ctx.on_improvement)(&best, best_cost, progress)?;
                } else {
                    non_improving += 1;
                    if non_improving > self.max_non_improving {
                        break;
                    }
                }

                temperature = (temperature * COOLING_FACTOR).max(MIN_TEMPERATURE);
            }
        }

        Ok((best, best_cost))
    }
}
