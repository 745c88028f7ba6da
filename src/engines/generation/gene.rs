use crate::error::{FeatsearchError, Result};
use rand::Rng;
use std::sync::Arc;

/// One choice in the search space: whether it is used and which of its
/// possible values it currently takes.
///
/// The possible values are shared between copies, so cloning a gene only
/// copies its state.
#[derive(Debug, Clone)]
pub struct Gene<T> {
    name: String,
    active: bool,
    current: usize,
    possible_values: Arc<Vec<T>>,
    activation_probability: f64,
}

impl<T> Gene<T> {
    pub fn new(
        name: impl Into<String>,
        possible_values: Vec<T>,
        activation_probability: f64,
    ) -> Result<Self> {
        let name = name.into();
        if possible_values.is_empty() {
            return Err(FeatsearchError::Configuration(format!(
                "Gene '{}' has no possible values",
                name
            )));
        }
        if !(0.0..=1.0).contains(&activation_probability) {
            return Err(FeatsearchError::Configuration(format!(
                "Gene '{}' activation probability {} outside [0, 1]",
                name, activation_probability
            )));
        }
        Ok(Self {
            name,
            active: true,
            current: 0,
            possible_values: Arc::new(possible_values),
            activation_probability,
        })
    }

    /// Redraws both the activation flag and the value.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.active = rng.gen_bool(self.activation_probability);
        self.current = rng.gen_range(0..self.possible_values.len());
    }

    /// Redraws the activation flag; the value is only redrawn when active.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R) {
        self.active = rng.gen_bool(self.activation_probability);
        if self.active {
            self.current = rng.gen_range(0..self.possible_values.len());
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn value(&self) -> &T {
        &self.possible_values[self.current]
    }

    pub fn value_index(&self) -> usize {
        self.current
    }

    pub fn set_value_index(&mut self, index: usize) -> Result<()> {
        if index >= self.possible_values.len() {
            return Err(FeatsearchError::Configuration(format!(
                "Gene '{}' has no value #{}",
                self.name, index
            )));
        }
        self.current = index;
        Ok(())
    }

    pub fn possible_values(&self) -> &[T] {
        &self.possible_values
    }
}
