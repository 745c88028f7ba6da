use std::sync::mpsc::Sender;

/// Observer of a running search. Called from the search thread only.
pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_genotype_evaluated(&mut self, genotype_num: usize, total: usize, fitness: f64);
    fn on_generation_complete(
        &mut self,
        generation: usize,
        best_fitness: f64,
        hall_of_fame_size: usize,
    );
}

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::info!("Generation {} starting...", generation + 1);
    }

    fn on_genotype_evaluated(&mut self, genotype_num: usize, total: usize, fitness: f64) {
        log::debug!("  [{}/{}] fitness {:.4}", genotype_num, total, fitness);
        if genotype_num % 10 == 0 || genotype_num == total {
            log::info!("  Evaluated {}/{} genotypes", genotype_num, total);
        }
    }

    fn on_generation_complete(
        &mut self,
        generation: usize,
        best_fitness: f64,
        hall_of_fame_size: usize,
    ) {
        log::info!(
            "Generation {} complete. Best fitness: {:.4}, Hall of Fame size: {}",
            generation + 1,
            best_fitness,
            hall_of_fame_size
        );
    }
}

/// Discards all progress events.
pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}
    fn on_genotype_evaluated(&mut self, _genotype_num: usize, _total: usize, _fitness: f64) {}
    fn on_generation_complete(
        &mut self,
        _generation: usize,
        _best_fitness: f64,
        _hall_of_fame_size: usize,
    ) {
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenotypeEvaluated {
        current: usize,
        total: usize,
        fitness: f64,
    },
    GenerationComplete {
        generation: usize,
        best_fitness: f64,
        hall_of_fame_size: usize,
    },
}

/// Forwards progress to another thread. A dropped receiver is ignored.
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_genotype_evaluated(&mut self, genotype_num: usize, total: usize, fitness: f64) {
        let _ = self.sender.send(ProgressMessage::GenotypeEvaluated {
            current: genotype_num,
            total,
            fitness,
        });
    }

    fn on_generation_complete(
        &mut self,
        generation: usize,
        best_fitness: f64,
        hall_of_fame_size: usize,
    ) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete {
            generation,
            best_fitness,
            hall_of_fame_size,
        });
    }
}
