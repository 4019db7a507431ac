//! Per-instance random sources.
//!
//! Every generated instance owns its own [`SmallRng`], seeded from the batch
//! seed, the instance number and the attempt number. Results therefore do
//! not depend on the order in which instances run.

use rand::{SeedableRng, rngs::SmallRng};

/// SplitMix64 increment (the 64-bit golden ratio), also used to space
/// instance and attempt indices apart before mixing.
const SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

/// Derives the seed for `attempt` of `instance` from a batch seed.
///
/// # Examples
/// ```
/// use harary_core::mix_instance_seed;
///
/// assert_eq!(mix_instance_seed(7, 0, 0), mix_instance_seed(7, 0, 0));
/// assert_ne!(mix_instance_seed(7, 0, 0), mix_instance_seed(7, 1, 0));
/// assert_ne!(mix_instance_seed(7, 0, 0), mix_instance_seed(7, 0, 1));
/// ```
#[must_use]
#[inline]
pub fn mix_instance_seed(base_seed: u64, instance: usize, attempt: usize) -> u64 {
    let instance = splitmix64(base_seed ^ spaced(instance));
    splitmix64(instance ^ spaced(attempt).rotate_left(32))
}

/// Returns the random source for `attempt` of `instance`.
#[must_use]
pub fn instance_rng(base_seed: u64, instance: usize, attempt: usize) -> SmallRng {
    SmallRng::seed_from_u64(mix_instance_seed(base_seed, instance, attempt))
}

#[inline]
fn spaced(index: usize) -> u64 {
    (index as u64).wrapping_add(1).wrapping_mul(SEED_SPACING)
}

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}
