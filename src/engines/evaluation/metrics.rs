use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confusion counts for one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub correct: usize,
    pub predicted: usize,
    pub gold: usize,
}

impl LabelCounts {
    pub fn precision(&self) -> f64 {
        ratio(self.correct, self.predicted)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.correct, self.gold)
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    fn merge(&mut self, other: &LabelCounts) {
        self.correct += other.correct;
        self.predicted += other.predicted;
        self.gold += other.gold;
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Per-label confusion counts accumulated over classified instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    counts: BTreeMap<String, LabelCounts>,
    total: usize,
    correct: usize,
}

impl Evaluation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pools several evaluations into one, as if all instances were scored together.
    pub fn pooled<'a, I: IntoIterator<Item = &'a Evaluation>>(evaluations: I) -> Self {
        let mut pooled = Self::new();
        for evaluation in evaluations {
            pooled.merge(evaluation);
        }
        pooled
    }

    pub fn add(&mut self, gold: &str, predicted: &str) {
        self.total += 1;
        self.counts.entry(gold.to_string()).or_default().gold += 1;
        self.counts.entry(predicted.to_string()).or_default().predicted += 1;
        if gold == predicted {
            self.correct += 1;
            self.counts.entry(gold.to_string()).or_default().correct += 1;
        }
    }

    pub fn insert_counts(&mut self, label: impl Into<String>, counts: LabelCounts) {
        self.counts.entry(label.into()).or_default().merge(&counts);
    }

    pub fn merge(&mut self, other: &Evaluation) {
        for (label, counts) in &other.counts {
            self.counts.entry(label.clone()).or_default().merge(counts);
        }
        self.total += other.total;
        self.correct += other.correct;
    }

    pub fn counts(&self, label: &str) -> LabelCounts {
        self.counts.get(label).copied().unwrap_or_default()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn precision(&self, label: &str) -> f64 {
        self.counts(label).precision()
    }

    pub fn recall(&self, label: &str) -> f64 {
        self.counts(label).recall()
    }

    pub fn f1(&self, label: &str) -> f64 {
        self.counts(label).f1()
    }

    /// Unweighted mean of per-label F1 over every label seen as gold or prediction.
    pub fn macro_f1(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        self.counts.values().map(LabelCounts::f1).sum::<f64>() / self.counts.len() as f64
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct, self.total)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f1_from_hand_built_counts() {
        let counts = LabelCounts {
            correct: 8,
            predicted: 10,
            gold: 12,
        };
        assert!((counts.precision() - 0.8).abs() < 1e-9);
        assert!((counts.recall() - 0.6667).abs() < 1e-3);
        assert!((counts.f1() - 0.7273).abs() < 1e-3);
    }

    #[test]
    fn pooling_matches_single_evaluation() {
        let pairs = [("A", "A"), ("A", "B"), ("B", "B"), ("B", "B"), ("C", "A")];

        let mut single = Evaluation::new();
        for (g, p) in pairs {
            single.add(g, p);
        }

        let mut first = Evaluation::new();
        let mut second = Evaluation::new();
        for (i, (g, p)) in pairs.iter().enumerate() {
            if i % 2 == 0 {
                first.add(g, p);
            } else {
                second.add(g, p);
            }
        }

        let pooled = Evaluation::pooled([&first, &second]);
        assert_eq!(pooled, single);
        assert!((pooled.accuracy() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn macro_f1_averages_labels() {
        let mut evaluation = Evaluation::new();
        evaluation.add("A", "A");
        evaluation.add("B", "A");
        // A: p=0.5 r=1 f1=0.667, B: 0
        assert!((evaluation.macro_f1() - (2.0 / 3.0) / 2.0).abs() < 1e-9);
        assert_eq!(Evaluation::new().macro_f1(), 0.0);
    }
}
