//! Parallel population evaluation.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

use crate::eval::EvalError;
use crate::utils::Parallelism;

use super::{FitnessEvaluator, Individual};

/// Evaluate every individual of a population exactly once, writing each
/// fitness back into its slot.
///
/// Work is distributed over rayon's work-stealing pool when `parallelism`
/// allows it. Each individual gets its own RNG stream derived from `seed`
/// and its population index, so sequential and parallel runs produce
/// identical fitness values.
///
/// The evaluator's budget is consulted before each dispatch: once
/// exhausted, remaining individuals are assigned the objective's worst
/// fitness without being evaluated. In-flight evaluations are never
/// interrupted.
///
/// # Errors
///
/// The first [`EvalError`] raised by any individual aborts the sweep.
pub fn evaluate_population<E: FitnessEvaluator + ?Sized>(
    population: &mut [Individual],
    evaluator: &E,
    seed: u64,
    parallelism: Parallelism,
) -> Result<(), EvalError> {
    if parallelism.is_parallel() {
        population
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(index, individual)| {
                evaluate_one(evaluator, seed, index, individual)
            })
    } else {
        population
            .iter_mut()
            .enumerate()
            .try_for_each(|(index, individual)| {
                evaluate_one(evaluator, seed, index, individual)
            })
    }
}

fn evaluate_one<E: FitnessEvaluator + ?Sized>(
    evaluator: &E,
    seed: u64,
    index: usize,
    individual: &mut Individual,
) -> Result<(), EvalError> {
    if evaluator.budget_exhausted() {
        individual.fitness = evaluator.worst();
        return Ok(());
    }
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(individual_seed(seed, index));
    individual.fitness = evaluator.evaluate_individual(&mut rng, individual)?;
    Ok(())
}

/// Per-individual seed derivation: index-deterministic, independent of
/// scheduling.
#[inline]
fn individual_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, Range};
    use crate::fitness::{NmseEvaluator, Problem, RSquaredEvaluator};
    use crate::repr::{Node, NodeType, Tree};
    use crate::Scalar;

    fn sine_problem() -> Problem {
        let x: Vec<Scalar> = (0..64).map(|i| i as Scalar * 0.1).collect();
        let y: Vec<Scalar> = x.iter().map(|&v| (2.0 * v).sin() + 0.5).collect();
        let dataset =
            Dataset::from_columns(vec![("x".into(), x), ("y".into(), y)]).unwrap();
        Problem::new(dataset, "y", Range::new(0, 64), Range::new(0, 0)).unwrap()
    }

    fn sample_population(problem: &Problem) -> Vec<Individual> {
        let x = problem.dataset().variable_by_name("x").unwrap().hash;
        let mut population = Vec::new();
        for weight in [0.5, 1.0, 1.5, 2.0, 2.5, 3.0] {
            population.push(Individual::new(Tree::new(vec![
                Node::variable(x, weight),
                Node::new(NodeType::Sin),
            ])));
            population.push(Individual::new(Tree::new(vec![
                Node::variable(x, weight),
                Node::constant(weight),
                Node::new(NodeType::Mul),
            ])));
        }
        population
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let problem = sine_problem();
        let evaluator = RSquaredEvaluator::new(&problem);

        let mut sequential = sample_population(&problem);
        evaluate_population(&mut sequential, &evaluator, 99, Parallelism::Sequential).unwrap();

        let mut parallel = sample_population(&problem);
        evaluate_population(&mut parallel, &evaluator, 99, Parallelism::Parallel).unwrap();

        for (a, b) in sequential.iter().zip(&parallel) {
            assert_eq!(a.fitness.to_bits(), b.fitness.to_bits());
        }
    }

    #[test]
    fn every_individual_is_scored() {
        let problem = sine_problem();
        let evaluator = NmseEvaluator::new(&problem);
        let mut population = sample_population(&problem);
        evaluate_population(&mut population, &evaluator, 1, Parallelism::Parallel).unwrap();

        assert_eq!(
            evaluator.counters().fitness_evaluations(),
            population.len() as u64
        );
        for individual in &population {
            assert!(individual.fitness >= 0.0);
            assert!(individual.fitness < Scalar::MAX);
        }
    }

    #[test]
    fn budget_halts_dispatch() {
        let problem = sine_problem();
        let evaluator = NmseEvaluator::new(&problem).with_budget(4);
        let mut population = sample_population(&problem);
        evaluate_population(&mut population, &evaluator, 1, Parallelism::Sequential).unwrap();

        assert_eq!(evaluator.counters().fitness_evaluations(), 4);
        let skipped = population
            .iter()
            .filter(|ind| ind.fitness == evaluator.worst())
            .count();
        assert_eq!(skipped, population.len() - 4);
    }

    #[test]
    fn errors_abort_the_sweep() {
        let problem = sine_problem();
        let evaluator = NmseEvaluator::new(&problem);
        let mut population = vec![Individual::new(Tree::new(vec![Node::variable(
            0xDEAD, 1.0,
        )]))];
        let err =
            evaluate_population(&mut population, &evaluator, 1, Parallelism::Sequential)
                .unwrap_err();
        assert!(matches!(err, EvalError::MissingVariable { .. }));
    }
}
