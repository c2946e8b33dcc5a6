//! Oscillation detection over a link's recent calculated costs.

use std::cmp::Ordering;

use ospf_core::MIN_OSCILLATION_SAMPLES;

/// Flags a cost that keeps reversing direction instead of trending.
///
/// One reversal inside the window is ordinary drift. `min_reversals` or more
/// means the cost is hunting around an equilibrium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OscillationDetector {
    /// Trailing history entries inspected.
    pub window: usize,
    /// Direction reversals that count as oscillation.
    pub min_reversals: usize,
}

impl Default for OscillationDetector {
    fn default() -> Self {
        Self {
            window: 5,
            min_reversals: 2,
        }
    }
}

impl OscillationDetector {
    pub fn new(window: usize, min_reversals: usize) -> Self {
        Self {
            window,
            min_reversals,
        }
    }

    /// Whether the trailing window of `history` (oldest first) oscillates.
    pub fn is_oscillating(&self, history: &[u32]) -> bool {
        let start = history.len().saturating_sub(self.window);
        let recent = &history[start..];
        if recent.len() < MIN_OSCILLATION_SAMPLES {
            return false;
        }
        count_reversals(recent) >= self.min_reversals
    }
}

/// Number of times two consecutive non-flat steps point in opposite directions.
pub fn count_reversals(costs: &[u32]) -> usize {
    let directions: Vec<Ordering> = costs.windows(2).map(|w| w[1].cmp(&w[0])).collect();
    directions
        .windows(2)
        .filter(|d| d[0] != Ordering::Equal && d[1] != Ordering::Equal && d[0] != d[1])
        .count()
}
