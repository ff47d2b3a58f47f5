//! Gene-level genetic operators.
//!
//! The building blocks of [`SegmentSwapCm`](super::SegmentSwapCm), exposed
//! so custom [`CmPlugin`](super::CmPlugin)s can reuse them and so the index
//! arithmetic can be driven deterministically.
//!
//! # Crossover
//!
//! - [`crossover_count`]: how many individuals take part in one crossover pass
//! - [`draw_segment`]: random `[start, end)` segment with edge clamping
//! - [`swap_segment`]: exchange a segment between two individuals in place
//!
//! # Mutation
//!
//! - [`flip_mutation`]: independent per-gene Bernoulli flips

use super::types::{Gene, Individual};
use rand::Rng;

// ============================================================================
// Crossover
// ============================================================================

/// Number of individuals sampled for crossover in a population of `n`.
///
/// `max(floor(n * rate / 2) * 2, 2)`: always even and never below one pair.
/// For `n >= 2` and `rate` in `[0, 1]` the result is also at most `n`.
pub fn crossover_count(n: usize, crossover_rate: f64) -> usize {
    let pairs = (n as f64 * crossover_rate / 2.0).floor() as usize;
    (pairs * 2).max(2)
}

/// Draws a crossover segment `[start, end)` for genotypes of length `len`.
///
/// 1. `size` uniform in `[1, len]`
/// 2. `start` uniform in `[-size, len]`, clamped at 0
/// 3. `end = min(start + size, len)`
///
/// A start drawn left of 0 is clamped instead of wrapping. `start == len`
/// yields an empty segment.
///
/// # Panics
/// Panics if `len == 0`.
pub fn draw_segment<R: Rng + ?Sized>(len: usize, rng: &mut R) -> (usize, usize) {
    assert!(len > 0, "genotype must not be empty");

    let size = rng.random_range(1..=len);
    let start = rng.random_range(-(size as i64)..=len as i64).max(0) as usize;
    let end = (start + size).min(len);
    (start, end)
}

/// Swaps genes `[start, end)` between two individuals and clears both
/// cached phenotypes.
///
/// # Panics
/// Panics if `start > end` or `end` exceeds either genotype length.
pub fn swap_segment<G: Gene, P>(
    a: &mut Individual<G, P>,
    b: &mut Individual<G, P>,
    start: usize,
    end: usize,
) {
    a.raw_genes_mut()[start..end].swap_with_slice(&mut b.raw_genes_mut()[start..end]);
    a.invalidate();
    b.invalidate();
}

/// Returns mutable references to two distinct elements of a slice.
///
/// # Panics
/// Panics if `i == j` or either index is out of bounds.
pub fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j, "pair indices must differ");
    if i < j {
        let (left, right) = items.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

// ============================================================================
// Mutation
// ============================================================================

/// Flips every gene independently with probability `rate`.
///
/// Returns the number of flipped genes. The cached phenotype is cleared only
/// when at least one gene changed.
///
/// # Panics
/// Panics if `rate` is outside `[0, 1]`.
pub fn flip_mutation<G: Gene, P, R: Rng + ?Sized>(
    individual: &mut Individual<G, P>,
    rate: f64,
    rng: &mut R,
) -> usize {
    let mut flipped = 0;
    for gene in individual.raw_genes_mut() {
        if rng.random_bool(rate) {
            *gene = gene.flip();
            flipped += 1;
        }
    }
    if flipped > 0 {
        individual.invalidate();
    }
    flipped
}

// ============================================================================
// Tests
// ============================================================================
