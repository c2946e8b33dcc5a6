//! Rolling per-link sample history.
//!
//! Keeps the most recent collected samples for each link so the optimizer
//! can evaluate a windowed average instead of a single noisy reading.

use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;
use tracing::debug;

use ospf_core::MetricSample;

/// Samples kept per link unless configured otherwise.
pub const DEFAULT_SAMPLE_CAPACITY: usize = 100;

/// Bounded history of collected samples, keyed by link name.
pub struct SampleHistory {
    capacity: usize,
    samples: RwLock<HashMap<String, VecDeque<MetricSample>>>,
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_CAPACITY)
    }
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            samples: RwLock::new(HashMap::new()),
        }
    }

    /// Store a sample, evicting the oldest one for its link when full.
    pub async fn record(&self, sample: &MetricSample) {
        let mut samples = self.samples.write().await;
        let history = samples
            .entry(sample.link_name.clone())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity));
        if history.len() == self.capacity {
            history.pop_front();
        }
        history.push_back(sample.clone());
    }

    /// Mean of the last `window` samples of a link.
    ///
    /// Bandwidth, latency, loss and jitter are averaged; `current_cost` is
    /// taken from the most recent sample. `None` if nothing was recorded.
    pub async fn average(&self, link_name: &str, window: usize) -> Option<MetricSample> {
        let samples = self.samples.read().await;
        let history = samples.get(link_name)?;
        let latest = history.back()?;

        let take = window.clamp(1, history.len());
        let recent = history.iter().skip(history.len() - take);
        let n = take as f64;

        let mut avg = MetricSample::new(link_name, latest.current_cost);
        for s in recent {
            avg.bandwidth_utilization += s.bandwidth_utilization / n;
            avg.latency_ms += s.latency_ms / n;
            avg.packet_loss_percent += s.packet_loss_percent / n;
            avg.jitter_ms += s.jitter_ms / n;
        }

        debug!(link = %link_name, samples = take, "averaged link metrics");
        Some(avg)
    }

    /// Number of samples held for a link.
    pub async fn len(&self, link_name: &str) -> usize {
        let samples = self.samples.read().await;
        samples.get(link_name).map_or(0, VecDeque::len)
    }

    /// Most recent sample of a link.
    pub async fn latest(&self, link_name: &str) -> Option<MetricSample> {
        let samples = self.samples.read().await;
        samples.get(link_name).and_then(|h| h.back().cloned())
    }

    /// Drop a link's samples.
    pub async fn forget(&self, link_name: &str) {
        self.samples.write().await.remove(link_name);
    }

    /// Names of links with at least one sample, sorted.
    pub async fn links(&self) -> Vec<String> {
        let samples = self.samples.read().await;
        let mut names: Vec<String> = samples.keys().cloned().collect();
        names.sort();
        names
    }
}
