//! Injectable random source.
//!
//! Every random decision in the crate (diffusion tie-breaks, direction
//! shuffles, occupancy tolerance) draws from a generator handed in by the
//! caller. [`SimRng`] is the portable, seedable default.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub type SimRng = ChaCha8Rng;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

pub fn seeded_rng(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}

/// Derives a stable per-region seed so regions do not share one stream.
///
/// `DefaultHasher` is randomly keyed per process, so seeds are hashed with
/// FNV-1a over the little-endian world seed followed by the region name.
pub fn region_seed(world_seed: u64, region: &str) -> u64 {
    fnv1a(world_seed.to_le_bytes().into_iter().chain(region.bytes()))
}

fn fnv1a(bytes: impl IntoIterator<Item = u8>) -> u64 {
    bytes.into_iter().fold(FNV_OFFSET_BASIS, |state, byte| {
        (state ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}
