//! Seed derivation: explicit value, pull request, or fresh entropy.

use crate::context::CiEnvironment;
use crate::types::{ResolvedSeed, SeedSource};
use tracing::debug;

/// Mixing constant applied to pull-request seeds (golden ratio, 64 bit).
pub const PR_SEED_MIX: u64 = 0x9e3779b97f4a7c15;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Resolves the seed for one generation run.
///
/// Priority: `explicit` (CLI), then `RNG_SEED`, then the pull-request id,
/// then a fresh random value.
pub fn resolve_seed<E: CiEnvironment + ?Sized>(explicit: Option<&str>, env: &E) -> ResolvedSeed {
    let explicit = explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| env.seed_override());
    if let Some(text) = explicit {
        debug!(seed = %text, "using explicit seed");
        return ResolvedSeed::new(parse_seed(&text), SeedSource::Explicit);
    }

    if let Some(pr) = env.pull_request_id() {
        let value = parse_seed(&pr).wrapping_mul(PR_SEED_MIX);
        return ResolvedSeed::new(value, SeedSource::PullRequest(pr));
    }

    ResolvedSeed::new(rand::random::<u64>(), SeedSource::Random)
}

/// Numeric text is used verbatim; anything else is hashed (FNV-1a).
pub fn parse_seed(text: &str) -> u64 {
    let text = text.trim();
    text.parse::<u64>().unwrap_or_else(|_| fnv1a(text.as_bytes()))
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}
