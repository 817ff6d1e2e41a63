//! Seeding for reproducible synthesis.
//!
//! Every profile draws from its own `ChaCha8Rng` seeded through `SeedableRng::seed_from_u64`.
//! ChaCha8 output is specified and portable, so a seed reproduces the same profile on any
//! platform. Batch members get independent seeds from a SplitMix64 mix of the batch seed and
//! their index, which makes a batch reproducible regardless of the order its members are
//! built in.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

pub(crate) fn profile_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// SplitMix64 finalizer.
pub fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for the `index`-th member of a batch.
pub fn derive_seed(batch_seed: u64, index: u64) -> u64 {
    splitmix64(batch_seed ^ splitmix64(index))
}

/// Separate stream for drawing a member's service history, so it never overlaps the
/// stream the synthesizer consumes for the same member.
pub(crate) fn history_seed(member_seed: u64) -> u64 {
    splitmix64(member_seed.rotate_left(17) ^ GOLDEN_GAMMA)
}
