use crate::config::{ConfigSection, EvolutionConfig};
use crate::engines::generation::fitness::FitnessFunction;
use crate::engines::generation::genotype::Genotype;
use crate::engines::generation::hall_of_fame::HallOfFame;
use crate::engines::generation::operators::{
    crossover, crossover_probability, mutate, mutation_probability, rank_selection,
};
use crate::engines::generation::progress::ProgressCallback;
use crate::error::{FeatsearchError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    MaxEpochs,
    Patience,
    TargetReached,
    Cancelled,
    Timeout,
}

/// Fitness summary of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best: f64,
    pub average: f64,
    pub worst: f64,
    /// Genotypes evaluated this generation; elites are carried over.
    pub evaluated: usize,
}

pub struct SearchResult {
    pub best: Genotype,
    pub generations: usize,
    pub stop_reason: StopReason,
    pub history: Vec<GenerationStats>,
    pub hall_of_fame: Vec<Genotype>,
    pub elapsed: Duration,
}

impl SearchResult {
    pub fn best_fitness(&self) -> f64 {
        self.best.fitness_or_min()
    }
}

/// Adaptive genetic search over genotypes.
///
/// Every generation is evaluated in parallel on a dedicated pool. Seeds for
/// each genotype are drawn from the engine rng beforehand, so a seeded run is
/// reproducible regardless of the thread count.
pub struct SearchEngine<F: FitnessFunction> {
    config: EvolutionConfig,
    fitness: F,
    hall_of_fame: HallOfFame,
    rng: StdRng,
    pool: rayon::ThreadPool,
    cancelled: Arc<AtomicBool>,
}

impl<F: FitnessFunction> SearchEngine<F> {
    pub fn new(config: EvolutionConfig, fitness: F) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .build()
            .map_err(|e| {
                FeatsearchError::Configuration(format!("Cannot build thread pool: {}", e))
            })?;

        Ok(Self {
            hall_of_fame: HallOfFame::new(config.hall_of_fame_size),
            config,
            fitness,
            rng,
            pool,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Setting the returned flag stops the search at the next generation
    /// boundary.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn get_hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    /// Runs the search from randomized copies of `prototype` and returns the
    /// best genotype seen.
    pub fn run<C: ProgressCallback>(
        &mut self,
        prototype: &Genotype,
        callback: &mut C,
    ) -> Result<SearchResult> {
        let start = Instant::now();
        self.hall_of_fame.clear();

        let mut population = self.initialize_population(prototype);
        let mut best: Option<Genotype> = None;
        let mut epochs_since_improvement = 0;
        let mut history = Vec::new();
        let mut generation = 0;

        let stop_reason = loop {
            callback.on_generation_start(generation);

            let evaluated = population.iter().filter(|g| g.fitness.is_none()).count();
            population = self.evaluate_population(population, callback)?;

            let stats = generation_stats(generation, &population, evaluated);
            let generation_best = population
                .iter()
                .max_by(|a, b| compare_fitness(a, b))
                .ok_or_else(|| FeatsearchError::Generation("Population is empty".to_string()))?;

            let overall = best_so_far(best.as_ref());
            if generation_best.fitness_or_min() > overall {
                log::info!(
                    "New best fitness {:.4} in generation {}: {}",
                    generation_best.fitness_or_min(),
                    generation + 1,
                    generation_best.signature()
                );
                best = Some(generation_best.clone());
                epochs_since_improvement = 0;
            } else {
                epochs_since_improvement += 1;
            }

            for genotype in &population {
                self.hall_of_fame.try_add(genotype);
            }

            let best_fitness = best_so_far(best.as_ref());
            callback.on_generation_complete(generation, best_fitness, self.hall_of_fame.len());
            history.push(stats);
            generation += 1;

            let stop = self.should_stop(generation, epochs_since_improvement, best_fitness, start);
            if let Some(reason) = stop {
                break reason;
            }

            population = self.create_next_generation(population, best_fitness)?;
        };

        let best = best.ok_or_else(|| {
            FeatsearchError::Generation("No genotype was evaluated".to_string())
        })?;
        log::info!(
            "Search stopped after {} generation(s) ({:?}), best fitness {:.4}",
            generation,
            stop_reason,
            best.fitness_or_min()
        );

        Ok(SearchResult {
            best,
            generations: generation,
            stop_reason,
            history,
            hall_of_fame: self.hall_of_fame.get_all().to_vec(),
            elapsed: start.elapsed(),
        })
    }

    fn initialize_population(&mut self, prototype: &Genotype) -> Vec<Genotype> {
        (0..self.config.population_size)
            .map(|_| {
                let mut genotype = prototype.offspring();
                genotype.features.randomize(&mut self.rng);
                genotype.hyperparameters.randomize(&mut self.rng);
                genotype
            })
            .collect()
    }

    /// Evaluates every genotype without a fitness; elites keep theirs.
    fn evaluate_population<C: ProgressCallback>(
        &mut self,
        population: Vec<Genotype>,
        callback: &mut C,
    ) -> Result<Vec<Genotype>> {
        let seeds: Vec<u64> = population.iter().map(|_| self.rng.gen()).collect();
        let fitness = &self.fitness;

        let evaluated: Vec<Genotype> = self.pool.install(|| {
            population
                .into_par_iter()
                .zip(seeds)
                .map(|(mut genotype, seed)| {
                    if genotype.fitness.is_none() {
                        genotype.fitness = Some(fitness.evaluate(&genotype, seed)?);
                    }
                    Ok(genotype)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let total = evaluated.len();
        for (i, genotype) in evaluated.iter().enumerate() {
            callback.on_genotype_evaluated(i + 1, total, genotype.fitness_or_min());
        }
        Ok(evaluated)
    }

    /// Breeds the next population. Adaptive rates are measured against
    /// `overall_best`, the best fitness of the whole run so far.
    fn create_next_generation(
        &mut self,
        mut population: Vec<Genotype>,
        overall_best: f64,
    ) -> Result<Vec<Genotype>> {
        population.sort_by(compare_fitness);

        let total: f64 = population.iter().map(Genotype::fitness_or_min).sum();
        let avg = total / population.len() as f64;

        let mut next_generation = Vec::with_capacity(self.config.population_size);
        next_generation.extend(population.iter().rev().take(self.config.num_elites).cloned());

        while next_generation.len() < self.config.population_size {
            let parent1 = &population[rank_selection(&population, &mut self.rng)];
            let parent2 = &population[rank_selection(&population, &mut self.rng)];
            let (f1, f2) = (parent1.fitness_or_min(), parent2.fitness_or_min());

            let p_crossover =
                self.config.crossover_rate * crossover_probability(f1, f2, overall_best, avg);
            let children = if self.rng.gen::<f64>() < p_crossover {
                let (child1, child2) = crossover(parent1, parent2, &mut self.rng)?;
                let inherited = f1.max(f2);
                [(child1, inherited), (child2, inherited)]
            } else {
                [(parent1.offspring(), f1), (parent2.offspring(), f2)]
            };

            for (mut child, inherited) in children {
                let p_mutation = self.config.mutation_rate
                    * mutation_probability(inherited, overall_best, avg);
                mutate(&mut child, p_mutation, &mut self.rng);
                if next_generation.len() < self.config.population_size {
                    next_generation.push(child);
                }
            }
        }

        Ok(next_generation)
    }

    fn should_stop(
        &self,
        generation: usize,
        epochs_since_improvement: usize,
        best_fitness: f64,
        start: Instant,
    ) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }
        if best_fitness >= self.config.max_fitness {
            return Some(StopReason::TargetReached);
        }
        if generation >= self.config.max_epochs {
            return Some(StopReason::MaxEpochs);
        }
        if epochs_since_improvement >= self.config.patience {
            return Some(StopReason::Patience);
        }
        if let Some(limit) = self.config.timeout_secs {
            if start.elapsed() >= Duration::from_secs(limit) {
                return Some(StopReason::Timeout);
            }
        }
        None
    }
}

fn compare_fitness(a: &Genotype, b: &Genotype) -> CmpOrdering {
    a.fitness_or_min()
        .partial_cmp(&b.fitness_or_min())
        .unwrap_or(CmpOrdering::Equal)
}

fn best_so_far(best: Option<&Genotype>) -> f64 {
    best.map(Genotype::fitness_or_min).unwrap_or(f64::NEG_INFINITY)
}

fn generation_stats(
    generation: usize,
    population: &[Genotype],
    evaluated: usize,
) -> GenerationStats {
    let fitness: Vec<f64> = population.iter().map(Genotype::fitness_or_min).collect();
    GenerationStats {
        generation,
        best: fitness.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        average: fitness.iter().sum::<f64>() / fitness.len().max(1) as f64,
        worst: fitness.iter().cloned().fold(f64::INFINITY, f64::min),
        evaluated,
    }
}
