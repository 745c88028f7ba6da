use anyhow::{bail, Context};
use featsearch::config::ConfigManager;
use featsearch::engines::evaluation::CrossValidator;
use featsearch::engines::generation::{
    ConsoleProgressCallback, CrossValidationFitness, SearchEngine, SearchSpace,
};
use featsearch::{instances_from_corpus, LabeledSequence};
use rand::Rng;
use std::fs::File;
use std::io::{BufReader, BufWriter};

const USAGE: &str = "usage: featsearch <corpus.json> [config.toml] [model-out.json]";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (corpus_path, config_path, model_path) = match args.as_slice() {
        [corpus] => (corpus, None, None),
        [corpus, config] => (corpus, Some(config), None),
        [corpus, config, model] => (corpus, Some(config), Some(model)),
        _ => bail!(USAGE),
    };

    let manager = ConfigManager::new();
    match config_path {
        Some(path) => manager
            .load_from_file(path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => manager
            .load_from_env()
            .context("loading configuration from the environment")?,
    }
    let config = manager.get();

    let reader = BufReader::new(
        File::open(corpus_path).with_context(|| format!("opening corpus {}", corpus_path))?,
    );
    let records: Vec<LabeledSequence> =
        serde_json::from_reader(reader).with_context(|| format!("parsing corpus {}", corpus_path))?;
    let instances = instances_from_corpus(records)?;
    log::info!("Loaded {} instances from {}", instances.len(), corpus_path);

    let space = SearchSpace::from_config(&config)?;
    let prototype = space.prototype()?;
    log::info!(
        "Searching over {} feature templates and {} hyperparameters",
        prototype.features.len(),
        prototype.hyperparameters.len()
    );

    let validator = CrossValidator::from_config(&config.validation);
    let fitness = CrossValidationFitness::new(instances.clone(), validator);
    let mut engine = SearchEngine::new(config.evolution.clone(), fitness)?;
    let result = engine.run(&prototype, &mut ConsoleProgressCallback)?;

    log::info!(
        "Best genotype after {} generation(s), stopped by {:?}:\n{}",
        result.generations,
        result.stop_reason,
        serde_json::to_string_pretty(&result.best.summary())?
    );
    for (rank, genotype) in result.hall_of_fame.iter().enumerate() {
        log::info!("  #{} {:.4} {}", rank + 1, genotype.fitness_or_min(), genotype.signature());
    }

    if let Some(path) = model_path {
        let seed = match config.evolution.seed {
            Some(seed) => seed,
            None => rand::thread_rng().gen(),
        };
        let mut phenotype = result.best.build(seed)?;
        phenotype.train(&instances, &[])?;

        let file = File::create(path).with_context(|| format!("creating {}", path))?;
        let writer = BufWriter::new(file);
        phenotype.save(writer)?;
        log::info!("Saved model bundle to {}", path);
    }

    Ok(())
}
