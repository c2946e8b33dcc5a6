//! Penalty factors.
//!
//! Each function maps one raw metric and its threshold table to a
//! dimensionless multiplier >= 1.0. Bandwidth and latency follow a
//! four-segment piecewise-linear curve that gets steeper past every
//! breakpoint; packet loss uses discrete steps because a little loss is
//! qualitatively different from none.

use ospf_core::{MetricSample, Segment, ThresholdTable, Thresholds, Weights};

/// Shape of a piecewise-linear penalty curve past each breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyCurve {
    /// Factor each segment starts from: low, medium, high, critical.
    pub bases: [f64; 4],
    /// Metric units needed to add 1.0 to the factor within each segment.
    pub divisors: [f64; 4],
}

/// Utilization curve. Past `critical` every 10 points adds a full unit.
pub const BANDWIDTH_CURVE: PenaltyCurve = PenaltyCurve {
    bases: [1.0, 1.5, 2.5, 5.0],
    divisors: [100.0, 50.0, 20.0, 10.0],
};

pub const LATENCY_CURVE: PenaltyCurve = PenaltyCurve {
    bases: [1.0, 1.5, 2.5, 5.0],
    divisors: [100.0, 50.0, 25.0, 50.0],
};

/// Loss multipliers for nominal, low, medium, high and critical loss.
pub const PACKET_LOSS_STEPS: [f64; 5] = [1.0, 1.5, 3.0, 6.0, 10.0];

impl PenaltyCurve {
    /// Evaluate the curve at `value`.
    ///
    /// A segment never starts below the value the previous segment reached
    /// at its upper breakpoint, so the curve is non-decreasing for any
    /// valid threshold table.
    pub fn factor(&self, value: f64, table: &ThresholdTable) -> f64 {
        let idx = match table.segment(value) {
            Segment::Nominal => return 1.0,
            Segment::Low => 0,
            Segment::Medium => 1,
            Segment::High => 2,
            Segment::Critical => 3,
        };
        let bounds = [table.low, table.medium, table.high, table.critical];

        let mut floor = 1.0_f64;
        for i in 0..idx {
            let start = self.bases[i].max(floor);
            floor = start + (bounds[i + 1] - bounds[i]) / self.divisors[i];
        }

        self.bases[idx].max(floor) + (value - bounds[idx]) / self.divisors[idx]
    }
}

/// Factor for bandwidth utilization (percent).
pub fn bandwidth_factor(utilization: f64, table: &ThresholdTable) -> f64 {
    BANDWIDTH_CURVE.factor(utilization, table)
}

/// Factor for round-trip latency (milliseconds).
pub fn latency_factor(latency_ms: f64, table: &ThresholdTable) -> f64 {
    LATENCY_CURVE.factor(latency_ms, table)
}

/// Factor for packet loss (percent).
pub fn packet_loss_factor(loss_percent: f64, table: &ThresholdTable) -> f64 {
    let step = match table.segment(loss_percent) {
        Segment::Nominal => 0,
        Segment::Low => 1,
        Segment::Medium => 2,
        Segment::High => 3,
        Segment::Critical => 4,
    };
    PACKET_LOSS_STEPS[step]
}

/// All three factors for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factors {
    pub bandwidth: f64,
    pub latency: f64,
    pub packet_loss: f64,
}

impl Factors {
    /// Compute the factors of a sample. The sample is expected to be sanitized.
    pub fn compute(sample: &MetricSample, thresholds: &Thresholds) -> Self {
        Self {
            bandwidth: bandwidth_factor(sample.bandwidth_utilization, &thresholds.bandwidth),
            latency: latency_factor(sample.latency_ms, &thresholds.latency),
            packet_loss: packet_loss_factor(sample.packet_loss_percent, &thresholds.packet_loss),
        }
    }

    /// Weighted sum used by the composite strategy.
    pub fn weighted(&self, weights: &Weights) -> f64 {
        self.bandwidth * weights.bandwidth
            + self.latency * weights.latency
            + self.packet_loss * weights.packet_loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn below_low_is_neutral() {
        let t = Thresholds::default();
        assert_eq!(bandwidth_factor(0.0, &t.bandwidth), 1.0);
        assert_eq!(bandwidth_factor(29.9, &t.bandwidth), 1.0);
        assert_eq!(latency_factor(9.9, &t.latency), 1.0);
        assert_eq!(packet_loss_factor(0.05, &t.packet_loss), 1.0);
    }

    #[test]
    fn bandwidth_segments() {
        let t = Thresholds::default().bandwidth;
        // [low, medium): 1.0 + (u - 30) / 100
        assert!(close(bandwidth_factor(45.0, &t), 1.15));
        // [medium, high): 1.5 + (u - 60) / 50
        assert!(close(bandwidth_factor(70.0, &t), 1.7));
        // [high, critical): 2.5 + (u - 80) / 20
        assert!(close(bandwidth_factor(85.0, &t), 2.75));
        // critical: 5.0 + (u - 90) / 10
        assert!(close(bandwidth_factor(100.0, &t), 6.0));
    }

    #[test]
    fn latency_segments() {
        let t = Thresholds::default().latency;
        assert!(close(latency_factor(30.0, &t), 1.2));
        assert!(close(latency_factor(60.0, &t), 1.7));
        assert!(close(latency_factor(150.0, &t), 4.5));
    }

    #[test]
    fn latency_critical_continues_from_high_segment() {
        let t = Thresholds::default().latency;
        // The high segment reaches 2.5 + 100/25 = 6.5 at the critical
        // breakpoint, above the nominal 5.0 critical base.
        assert!(close(latency_factor(200.0, &t), 6.5));
        assert!(latency_factor(199.9, &t) <= latency_factor(200.0, &t));
        assert!(close(latency_factor(250.0, &t), 7.5));
    }

    #[test]
    fn unreachable_latency_is_heavily_penalized() {
        let t = Thresholds::default().latency;
        let factor = latency_factor(ospf_core::UNREACHABLE_LATENCY_MS, &t);
        assert!(factor > 20.0);
        assert!(factor.is_finite());
    }

    #[test]
    fn packet_loss_steps() {
        let t = Thresholds::default().packet_loss;
        assert_eq!(packet_loss_factor(0.0, &t), 1.0);
        assert_eq!(packet_loss_factor(0.1, &t), 1.5);
        assert_eq!(packet_loss_factor(0.99, &t), 1.5);
        assert_eq!(packet_loss_factor(1.0, &t), 3.0);
        assert_eq!(packet_loss_factor(5.0, &t), 6.0);
        assert_eq!(packet_loss_factor(10.0, &t), 10.0);
        assert_eq!(packet_loss_factor(100.0, &t), 10.0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let t = Thresholds::default().bandwidth;
        let first = bandwidth_factor(87.3, &t);
        for _ in 0..100 {
            assert_eq!(bandwidth_factor(87.3, &t).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn weighted_sum() {
        let factors = Factors {
            bandwidth: 2.75,
            latency: 1.2,
            packet_loss: 1.0,
        };
        assert!(close(factors.weighted(&Weights::default()), 1.935));
    }

    fn threshold_table() -> impl Strategy<Value = ThresholdTable> {
        (0.0..100.0f64, 0.01..100.0f64, 0.01..100.0f64, 0.01..100.0f64).prop_map(
            |(low, a, b, c)| ThresholdTable::new(low, low + a, low + a + b, low + a + b + c),
        )
    }

    proptest! {
        #[test]
        fn curves_are_monotonic(
            table in threshold_table(),
            a in 0.0..1000.0f64,
            b in 0.0..1000.0f64,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(BANDWIDTH_CURVE.factor(lo, &table) <= BANDWIDTH_CURVE.factor(hi, &table));
            prop_assert!(LATENCY_CURVE.factor(lo, &table) <= LATENCY_CURVE.factor(hi, &table));
            prop_assert!(packet_loss_factor(lo, &table) <= packet_loss_factor(hi, &table));
        }

        #[test]
        fn factors_never_drop_below_one(table in threshold_table(), v in 0.0..1000.0f64) {
            prop_assert!(BANDWIDTH_CURVE.factor(v, &table) >= 1.0);
            prop_assert!(LATENCY_CURVE.factor(v, &table) >= 1.0);
            prop_assert!(packet_loss_factor(v, &table) >= 1.0);
        }
    }
}
