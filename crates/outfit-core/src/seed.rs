use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::{SeedMode, SeedState};

/// Seed for this call under `mode`.
///
/// `random` draws from the OS CSPRNG and ignores `requested`. The stepping
/// modes start from `requested` while `state.last_seed` is 0 and otherwise
/// step one away from it, wrapping at `u32` bounds.
pub fn resolve_seed(mode: SeedMode, requested: u32, state: SeedState) -> u32 {
    resolve_seed_with(mode, requested, state, || OsRng.next_u32())
}

/// [`resolve_seed`] with the entropy source supplied by the caller.
pub fn resolve_seed_with<F>(mode: SeedMode, requested: u32, state: SeedState, entropy: F) -> u32
where
    F: FnOnce() -> u32,
{
    match mode {
        SeedMode::Fixed => requested,
        SeedMode::Random => entropy(),
        SeedMode::Increment if state.last_seed == 0 => requested,
        SeedMode::Increment => state.last_seed.wrapping_add(1),
        SeedMode::Decrement if state.last_seed == 0 => requested,
        SeedMode::Decrement => state.last_seed.wrapping_sub(1),
    }
}

/// Generator for every random resolution of one call.
pub fn rng_for(seed: u32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(u64::from(seed))
}
