//! Column width distribution for grid-style containers.
//!
//! The ordering here is load-bearing: fixed columns are funded first, then
//! flexible columns either shrink proportionally below their minimums
//! (rounding remainder to the last flexible column) or grow by flex factor
//! with leftover cells handed out one at a time, in column order, skipping
//! columns at their max cap. Naive proportional division rounds differently
//! and moves splitter positions visibly, so the steps are followed exactly.

use crate::control::SizePolicy;

/// Result of a width distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    /// One width per input policy, in order.
    pub widths: Vec<i32>,
    /// Set when the available width cannot cover the fixed widths plus the
    /// flexible minimums; the caller may allow horizontal clipping.
    pub overflow: bool,
}

/// Distribute `available` cells across the given policies.
///
/// Splitters participate as `Fixed` entries, so when the result fits,
/// `widths.sum() == available` (the conservation invariant).
pub fn distribute(policies: &[SizePolicy], available: i32) -> Distribution {
    let available = available.max(0);
    let mut widths = vec![0i32; policies.len()];

    // Step 1: partition into fixed and flexible.
    let mut fixed_total: i64 = 0;
    let mut flexible: Vec<usize> = Vec::new();
    for (i, policy) in policies.iter().enumerate() {
        match *policy {
            SizePolicy::Fixed(w) => {
                widths[i] = w.max(0);
                fixed_total += widths[i] as i64;
            }
            SizePolicy::Flex { .. } => flexible.push(i),
        }
    }

    // Step 2: what is left after fixed columns and splitters.
    let remaining = available as i64 - fixed_total;

    if flexible.is_empty() {
        return Distribution { widths, overflow: fixed_total > available as i64 };
    }

    let min_of = |i: usize| match policies[i] {
        SizePolicy::Flex { min, .. } => min.max(0),
        SizePolicy::Fixed(_) => 0,
    };
    let max_of = |i: usize| match policies[i] {
        SizePolicy::Flex { max, .. } => max,
        SizePolicy::Fixed(_) => None,
    };
    let factor_of = |i: usize| match policies[i] {
        SizePolicy::Flex { factor, .. } => factor.max(1) as i64,
        SizePolicy::Fixed(_) => 0,
    };

    // Step 3: nothing left — every flexible column collapses to its minimum.
    if remaining <= 0 {
        for &i in &flexible {
            widths[i] = min_of(i);
        }
        return Distribution { widths, overflow: true };
    }

    let min_sum: i64 = flexible.iter().map(|&i| min_of(i) as i64).sum();

    // Step 4: not enough for the minimums — scale everyone proportionally
    // below minimum (floor 1), rounding remainder to the last column.
    if remaining < min_sum {
        let mut assigned: i64 = 0;
        for &i in &flexible {
            let scaled = (min_of(i) as i64 * remaining) / min_sum;
            widths[i] = scaled.max(1) as i32;
            assigned += widths[i] as i64;
        }
        let last = *flexible.last().expect("flexible is non-empty");
        widths[last] = ((widths[last] as i64) + remaining - assigned).max(1) as i32;
        let total: i64 = widths.iter().map(|&w| w as i64).sum();
        return Distribution { widths, overflow: total > available as i64 };
    }

    // Step 5: distribute by flex factor, floor-dividing, then hand leftover
    // cells out one at a time to columns not yet at their cap.
    let factor_sum: i64 = flexible.iter().map(|&i| factor_of(i)).sum();
    for &i in &flexible {
        let share = (remaining * factor_of(i)) / factor_sum;
        let mut w = share.max(min_of(i) as i64);
        if let Some(cap) = max_of(i) {
            w = w.min(cap.max(0) as i64);
        }
        widths[i] = w as i32;
    }

    let mut leftover = remaining - flexible.iter().map(|&i| widths[i] as i64).sum::<i64>();

    while leftover > 0 {
        let mut moved = false;
        for &i in &flexible {
            if leftover == 0 {
                break;
            }
            let capped = max_of(i).is_some_and(|cap| widths[i] >= cap);
            if !capped {
                widths[i] += 1;
                leftover -= 1;
                moved = true;
            }
        }
        if !moved {
            break; // all columns at cap; width goes unused
        }
    }
    // Raising shares to minimums can overshoot; take cells back from the
    // rightmost columns still above their minimum.
    while leftover < 0 {
        let mut moved = false;
        for &i in flexible.iter().rev() {
            if leftover == 0 {
                break;
            }
            if widths[i] > min_of(i) {
                widths[i] -= 1;
                leftover += 1;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }

    let total: i64 = widths.iter().map(|&w| w as i64).sum();
    Distribution { widths, overflow: total > available as i64 }
}

// ===========================================================================
// Tests
// ===========================================================================
