#![forbid(unsafe_code)]

//! Stagger offsets for cascading reveals.
//!
//! When several elements become visible in the same intersection batch, each
//! one is delayed by its rank within the batch so they appear one after the
//! other rather than all at once.
//!
//! # Invariants
//!
//! 1. Rank 0 is always `Duration::ZERO`.
//! 2. offset(i) = i * delay, computed in integer arithmetic (no float drift).
//!
//! # Failure Modes
//!
//! - Zero delay: all offsets are `Duration::ZERO`.
//! - Ranks beyond `u32::MAX` saturate instead of wrapping.

use std::time::Duration;

/// Delay for the item at `rank` (0-based) within a batch.
#[inline]
#[must_use]
pub fn stagger_offset(rank: usize, delay: Duration) -> Duration {
    let rank = u32::try_from(rank).unwrap_or(u32::MAX);
    delay.saturating_mul(rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn first_rank_is_immediate() {
        assert_eq!(stagger_offset(0, MS_100), Duration::ZERO);
    }

    #[test]
    fn ranks_cascade_by_delay() {
        let offsets: Vec<_> = (0..3).map(|i| stagger_offset(i, MS_100)).collect();
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_millis(100),
                Duration::from_millis(200)
            ]
        );
    }

    #[test]
    fn zero_delay_all_zero() {
        assert!((0..5).all(|i| stagger_offset(i, Duration::ZERO) == Duration::ZERO));
    }

    #[test]
    fn huge_rank_saturates() {
        let d = stagger_offset(usize::MAX, Duration::from_secs(u64::MAX / 2));
        assert_eq!(d, Duration::MAX);
    }
}
