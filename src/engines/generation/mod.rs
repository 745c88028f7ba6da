pub mod chromosome;
pub mod evolution_engine;
pub mod fitness;
pub mod gene;
pub mod genotype;
pub mod hall_of_fame;
pub mod operators;
pub mod progress;
pub mod search_space;

pub use chromosome::Chromosome;
pub use evolution_engine::{GenerationStats, SearchEngine, SearchResult, StopReason};
pub use fitness::{CrossValidationFitness, FitnessFunction};
pub use gene::Gene;
pub use genotype::{BuildSettings, Genotype, GenotypeSummary};
pub use hall_of_fame::HallOfFame;
pub use progress::{
    ChannelProgressCallback, ConsoleProgressCallback, ProgressCallback, ProgressMessage,
    SilentProgressCallback,
};
pub use search_space::SearchSpace;
