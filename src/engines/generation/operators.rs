use crate::engines::generation::genotype::Genotype;
use crate::error::Result;
use rand::Rng;

/// Rank-weighted selection over a population sorted by ascending fitness:
/// the individual at position `i` is drawn with weight `i + 1`.
pub fn rank_selection<R: Rng>(ranked: &[Genotype], rng: &mut R) -> usize {
    let n = ranked.len();
    if n <= 1 {
        return 0;
    }
    let total = n * (n + 1) / 2;
    let mut spin = rng.gen_range(0..total);
    for i in 0..n {
        let weight = i + 1;
        if spin < weight {
            return i;
        }
        spin -= weight;
    }
    n - 1
}

/// Adaptive crossover probability: weak pairs always cross, pairs near the
/// best cross less often.
pub fn crossover_probability(f1: f64, f2: f64, best: f64, avg: f64) -> f64 {
    scaled_probability(f1.max(f2), best, avg)
}

/// Adaptive mutation probability for an offspring with inherited fitness `f`.
pub fn mutation_probability(f: f64, best: f64, avg: f64) -> f64 {
    scaled_probability(f, best, avg)
}

fn scaled_probability(f: f64, best: f64, avg: f64) -> f64 {
    if f <= avg || best <= avg {
        return 1.0;
    }
    ((best - f) / (best - avg)).clamp(0.0, 1.0)
}

/// Crosses both chromosomes independently. Children carry no fitness.
pub fn crossover<R: Rng>(
    parent1: &Genotype,
    parent2: &Genotype,
    rng: &mut R,
) -> Result<(Genotype, Genotype)> {
    let (features1, features2) = parent1.features.crossover(&parent2.features, rng)?;
    let (hyper1, hyper2) = parent1
        .hyperparameters
        .crossover(&parent2.hyperparameters, rng)?;

    let mut child1 = parent1.offspring();
    child1.features = features1;
    child1.hyperparameters = hyper1;

    let mut child2 = parent2.offspring();
    child2.features = features2;
    child2.hyperparameters = hyper2;

    Ok((child1, child2))
}

/// Each chromosome mutates one gene with the given probability.
pub fn mutate<R: Rng>(genotype: &mut Genotype, probability: f64, rng: &mut R) {
    if rng.gen::<f64>() < probability {
        genotype.features.mutate_one(rng);
    }
    if rng.gen::<f64>() < probability {
        genotype.hyperparameters.mutate_one(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::engines::generation::search_space::SearchSpace;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn weak_pairs_always_cross() {
        assert_eq!(crossover_probability(0.2, 0.4, 0.9, 0.5), 1.0);
        assert_eq!(crossover_probability(0.5, 0.5, 0.9, 0.5), 1.0);
    }

    #[test]
    fn probability_shrinks_towards_the_best() {
        let p = crossover_probability(0.3, 0.8, 0.9, 0.5);
        assert!((p - 0.25).abs() < 1e-9);
        assert_eq!(mutation_probability(0.9, 0.9, 0.5), 0.0);
    }

    #[test]
    fn flat_population_scales_to_one() {
        assert_eq!(mutation_probability(0.7, 0.7, 0.7), 1.0);
    }

    #[test]
    fn rank_selection_favours_the_top() {
        let prototype = SearchSpace::from_config(&AppConfig::default())
            .unwrap()
            .prototype()
            .unwrap();
        let ranked = vec![prototype; 4];
        let mut rng = StdRng::seed_from_u64(11);
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            counts[rank_selection(&ranked, &mut rng)] += 1;
        }
        // expected shares 1:2:3:4
        assert!(counts[0] < counts[1] && counts[1] < counts[2] && counts[2] < counts[3]);
    }

    #[test]
    fn crossover_clears_fitness() {
        let mut parent = SearchSpace::from_config(&AppConfig::default())
            .unwrap()
            .prototype()
            .unwrap();
        parent.fitness = Some(0.5);
        let mut rng = StdRng::seed_from_u64(2);
        let (a, b) = crossover(&parent, &parent, &mut rng).unwrap();
        assert!(a.fitness.is_none() && b.fitness.is_none());
        assert_eq!(a.features.len(), parent.features.len());
    }
}
