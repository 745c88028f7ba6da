use crate::engines::generation::genotype::Genotype;
use std::collections::HashSet;

/// Best distinct genotypes seen during a search, by descending fitness.
pub struct HallOfFame {
    entries: Vec<Genotype>,
    max_size: usize,
    seen_signatures: HashSet<String>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size,
            seen_signatures: HashSet::new(),
        }
    }

    /// Adds an evaluated genotype unless one with the same signature is
    /// already present or it would not make the cut.
    pub fn try_add(&mut self, genotype: &Genotype) -> bool {
        if self.max_size == 0 || genotype.fitness.is_none() {
            return false;
        }

        let signature = genotype.signature();
        if self.seen_signatures.contains(&signature) {
            return false;
        }

        if self.entries.len() >= self.max_size {
            let worst = self
                .entries
                .last()
                .map(Genotype::fitness_or_min)
                .unwrap_or(f64::NEG_INFINITY);
            if genotype.fitness_or_min() <= worst {
                return false;
            }
        }

        self.entries.push(genotype.clone());
        self.seen_signatures.insert(signature);

        self.entries.sort_by(|a, b| {
            b.fitness_or_min()
                .partial_cmp(&a.fitness_or_min())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        while self.entries.len() > self.max_size {
            if let Some(removed) = self.entries.pop() {
                self.seen_signatures.remove(&removed.signature());
            }
        }

        true
    }

    pub fn get_all(&self) -> &[Genotype] {
        &self.entries
    }

    pub fn best(&self) -> Option<&Genotype> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen_signatures.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::engines::generation::search_space::SearchSpace;

    fn genotype(active: usize, fitness: f64) -> Genotype {
        let mut g = SearchSpace::from_config(&AppConfig::default())
            .unwrap()
            .prototype()
            .unwrap();
        for (i, gene) in g.features.genes_mut().iter_mut().enumerate() {
            gene.set_active(i < active);
        }
        g.fitness = Some(fitness);
        g
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut hof = HallOfFame::new(3);
        assert!(hof.try_add(&genotype(1, 0.5)));
        assert!(!hof.try_add(&genotype(1, 0.9)));
        assert_eq!(hof.len(), 1);
    }

    #[test]
    fn keeps_the_best_entries_in_order() {
        let mut hof = HallOfFame::new(2);
        hof.try_add(&genotype(1, 0.3));
        hof.try_add(&genotype(2, 0.7));
        hof.try_add(&genotype(3, 0.5));
        assert!(!hof.try_add(&genotype(4, 0.1)));

        let fitness: Vec<f64> = hof.get_all().iter().map(Genotype::fitness_or_min).collect();
        assert_eq!(fitness, vec![0.7, 0.5]);
        assert_eq!(hof.best().and_then(|g| g.fitness), Some(0.7));
    }

    #[test]
    fn unevaluated_genotypes_are_ignored() {
        let mut hof = HallOfFame::new(2);
        let mut g = genotype(1, 0.0);
        g.fitness = None;
        assert!(!hof.try_add(&g));
        assert!(hof.is_empty());
    }
}
