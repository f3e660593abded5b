//! Deterministic RNG using PCG32.
//!
//! All randomness in dataset generation flows through a generator created
//! here and owned by the caller. Nothing touches process-wide random state,
//! so concurrent runs with different seeds never interfere.

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Creates a PCG32 RNG from a 32-bit seed.
///
/// The 32-bit seed is expanded to 64 bits by duplicating the value in both
/// halves, as required by PCG32's state initialization.
pub fn create_rng(seed: u32) -> Pcg32 {
    let seed64 = (seed as u64) | ((seed as u64) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Draws a fresh seed from the operating system.
///
/// Used when the caller did not ask for a specific seed. The drawn value is
/// recorded in the run manifest so the run can be reproduced.
pub fn entropy_seed() -> u32 {
    rand::random::<u32>()
}
