#[cfg(test)]
#[path = "../../tests/unit/scheme/genetic_test.rs"]
mod genetic_test;

use crate::connector::NodeConnector;
use crate::evaluation::schedule_route;
use crate::models::solution::Entity;
use crate::scheme::moves::apply_random_move;
use crate::scheme::SearchContext;
use crate::utils::{GenericResult, Random};
use std::cmp::Ordering;

const MUTATION_MOVES: usize = 2;

/// A genetic evolution stage: tournament selection, per route order crossover and random move
/// mutation over a small elitist population.
pub struct GeneticEvolution {
    /// Amount of generations.
    pub generations: usize,
    /// Population size, at least two.
    pub population_size: usize,
    /// Stops early after this many non-improving generations.
    pub max_non_improving: usize,
    /// Whether unpromising candidate neighborhoods are pruned automatically.
    pub auto_filter: bool,
}

impl GeneticEvolution {
    /// Runs the stage and returns the best found entity with its cost.
    pub fn solve(&self, entity: Entity, ctx: &mut SearchContext<'_>) -> GenericResult<(Entity, f64)> {
        let connector = ctx.pipeline.connector().clone();

        let mut seed = entity;
        let seed_cost = ctx.pipeline.evaluate(&mut seed)?.cost;

        let mut population = vec![(seed.deep_copy(), seed_cost)];
        while population.len() < self.population_size {
            let mut individual = seed.deep_copy();
            for _ in 0..MUTATION_MOVES {
                apply_random_move(&mut individual, ctx.random.as_ref(), &connector, self.auto_filter);
            }
            let cost = ctx.pipeline.evaluate(&mut individual)?.cost;
            population.push((individual, cost));
        }
        sort_population(&mut population);

        let mut best_cost = population[0].1;
        let mut non_improving = 0_usize;

        for generation in 0..self.generations {
            if (ctx.is_cancelled)() {
                break;
            }

            let mut offspring = Vec::with_capacity(self.population_size);
            for _ in 0..self.population_size {
                let first = tournament(&population, ctx.random.as_ref());
                let second = tournament(&population, ctx.random.as_ref());

                let mut child = crossover(&population[first].0, &population[second].0, ctx.random.as_ref(), &connector);
                for _ in 0..MUTATION_MOVES {
                    apply_random_move(&mut child, ctx.random.as_ref(), &connector, self.auto_filter);
                }

                let cost = ctx.pipeline.evaluate(&mut child)?.cost;
                offspring.push((child, cost));
            }

            population.extend(offspring);
            sort_population(&mut population);
            population.truncate(self.population_size);

            if population[0].1 < best_cost {
                best_cost = population[0].1;
                non_improving = 0;

                let progress = ((generation + 1) as f64 / self.generations.max(1) as f64).min(1.);
                (ctx.on_improvement)(&population[0].0, best_cost, progress)?;
            } else {
                non_improving += 1;
                if non_improving > self.max_non_improving {
                    break;
                }
            }
        }

        let (best, best_cost) = population.swap_remove(0);
        Ok((best, best_cost))
    }
}

fn sort_population(population: &mut [(Entity, f64)]) {
    population.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
}

/// Picks the better of two random individuals.
fn tournament(population: &[(Entity, f64)], random: &dyn Random) -> usize {
    let first = random.uniform_int(0, population.len() as i32 - 1) as usize;
    let second = random.uniform_int(0, population.len() as i32 - 1) as usize;

    if population[first].1 <= population[second].1 {
        first
    } else {
        second
    }
}

/// An order crossover restricted to one route: the child inherits everything from the better
/// parent, but one of its routes is reordered to follow the relative visit order of the other
/// parent. The node set stays untouched which preserves assignment invariants.
fn crossover(first: &Entity, second: &Entity, random: &dyn Random, connector: &NodeConnector) -> Entity {
    let mut child = first.deep_copy();
    if child.routes.is_empty() {
        return child;
    }

    let route_idx = random.uniform_int(0, child.routes.len() as i32 - 1) as usize;
    let donor_order = second
        .routes
        .get(route_idx)
        .map(|route| route.visits.iter().map(|visit| visit.node.id.clone()).collect::<Vec<_>>())
        .unwrap_or_default();

    if donor_order.is_empty() {
        return child;
    }

    let route = &mut child.routes[route_idx];
    route.visits.sort_by_key(|visit| {
        donor_order.iter().position(|id| *id == visit.node.id).unwrap_or(usize::MAX)
    });
    schedule_route(route, connector);

    child
}
