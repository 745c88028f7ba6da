use crate::engines::generation::gene::Gene;
use crate::error::{FeatsearchError, Result};
use rand::Rng;

/// An ordered group of genes of one kind.
///
/// Working on a fixed-length list keeps crossover a plain tail swap and
/// mutation a single-gene redraw; any gene combination builds a valid phenotype.
#[derive(Debug, Clone)]
pub struct Chromosome<T> {
    genes: Vec<Gene<T>>,
}

impl<T: Clone> Chromosome<T> {
    pub fn new(genes: Vec<Gene<T>>) -> Self {
        Self { genes }
    }

    /// Single-point crossover: children swap tails after a random cut.
    pub fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Result<(Self, Self)> {
        if self.len() != other.len() {
            return Err(FeatsearchError::Configuration(format!(
                "Cannot cross chromosomes of length {} and {}",
                self.len(),
                other.len()
            )));
        }

        let len = self.len();
        if len <= 1 {
            return Ok((self.clone(), other.clone()));
        }

        let point = rng.gen_range(1..len);
        let mut child1 = self.genes[..point].to_vec();
        child1.extend_from_slice(&other.genes[point..]);
        let mut child2 = other.genes[..point].to_vec();
        child2.extend_from_slice(&self.genes[point..]);

        Ok((Self::new(child1), Self::new(child2)))
    }

    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        for gene in &mut self.genes {
            gene.randomize(rng);
        }
    }

    /// Mutates exactly one randomly chosen gene.
    pub fn mutate_one<R: Rng>(&mut self, rng: &mut R) {
        if self.genes.is_empty() {
            return;
        }
        let i = rng.gen_range(0..self.genes.len());
        self.genes[i].mutate(rng);
    }

    pub fn active_genes(&self) -> impl Iterator<Item = &Gene<T>> {
        self.genes.iter().filter(|g| g.is_active())
    }

    pub fn genes(&self) -> &[Gene<T>] {
        &self.genes
    }

    pub fn genes_mut(&mut self) -> &mut [Gene<T>] {
        &mut self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}
