//! Seeded question sampling.
//!
//! Every model answers the same sampled questions, so the shuffle must be
//! reproducible from the seed alone.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::types::QuestionRow;

/// Questions drawn per dataset.
pub const DEFAULT_SAMPLE_SIZE: usize = 200;

/// Default shuffle seed.
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

/// Draw a reproducible sample of `n` questions.
///
/// Shuffles the pool with a ChaCha8 generator seeded from `seed` and keeps
/// the first `n` rows. Asking for more rows than the pool holds returns the
/// whole shuffled pool.
pub fn sample_questions(mut rows: Vec<QuestionRow>, n: usize, seed: u64) -> Vec<QuestionRow> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rows.shuffle(&mut rng);
    rows.truncate(n);
    rows
}
