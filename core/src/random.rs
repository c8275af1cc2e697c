use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

/// Draws distinct positions for sampling. Implementations must return
/// `amount` unique values in `[0, len)`; callers guarantee `amount <= len`.
pub trait RandomSource: Send + Sync {
    fn sample_positions(&self, len: usize, amount: usize) -> Vec<usize>;
}

/// Process entropy via the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn sample_positions(&self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut rand::thread_rng(), len, amount).into_vec()
    }
}

/// Reproducible source. The lock is held for a whole draw.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl RandomSource for SeededRandom {
    fn sample_positions(&self, len: usize, amount: usize) -> Vec<usize> {
        let mut rng = self.rng.lock();
        index::sample(&mut *rng, len, amount).into_vec()
    }
}
