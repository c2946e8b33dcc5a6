//! In-process stand-in for a routed network.
//!
//! Produces plausible samples without touching any device and keeps a
//! per-link cost table, so a cost applied in one cycle is observed as the
//! link's current cost in the next.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use rand::Rng;
use tracing::debug;

use ospf_core::{MetricSample, MonitoredLink, UNREACHABLE_LATENCY_MS};

use crate::source::{MetricsSource, SourceError};

/// Cost every link starts with.
pub const DEFAULT_LINK_COST: u32 = 10;

/// Fixed metric values for a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCondition {
    pub bandwidth_utilization: f64,
    pub latency_ms: f64,
    pub packet_loss_percent: f64,
    pub jitter_ms: f64,
}

impl LinkCondition {
    pub fn new(bandwidth_utilization: f64, latency_ms: f64, packet_loss_percent: f64) -> Self {
        Self {
            bandwidth_utilization,
            latency_ms,
            packet_loss_percent,
            jitter_ms: 0.0,
        }
    }
}

/// How a simulated link behaves when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LoadProfile {
    /// Fresh random values every sample.
    #[default]
    Random,
    /// The same values every sample.
    Fixed(LinkCondition),
    /// Far end does not answer: unreachable latency, total loss.
    Down,
    /// The sample cannot be collected at all.
    Unavailable,
}

#[derive(Debug, Clone, Copy)]
struct SimulatedLink {
    cost: u32,
    profile: LoadProfile,
}

/// Simulated routers and links.
pub struct SimulatedNetwork {
    links: Mutex<HashMap<String, SimulatedLink>>,
    default_cost: u32,
}

impl Default for SimulatedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedNetwork {
    pub fn new() -> Self {
        Self {
            links: Mutex::new(HashMap::new()),
            default_cost: DEFAULT_LINK_COST,
        }
    }

    /// Builder: give a link a load profile.
    pub fn with_profile(self, link_name: &str, profile: LoadProfile) -> Self {
        self.set_profile(link_name, profile);
        self
    }

    pub fn set_profile(&self, link_name: &str, profile: LoadProfile) {
        let default_cost = self.default_cost;
        self.lock()
            .entry(link_name.to_string())
            .or_insert(SimulatedLink {
                cost: default_cost,
                profile,
            })
            .profile = profile;
    }

    /// Configure a link's cost, as a router would after a cost change.
    pub fn set_cost(&self, link_name: &str, cost: u32) {
        let mut links = self.lock();
        links
            .entry(link_name.to_string())
            .or_insert(SimulatedLink {
                cost,
                profile: LoadProfile::Random,
            })
            .cost = cost;
        debug!(link = %link_name, cost, "simulated cost set");
    }

    /// Cost currently configured on a link.
    pub fn cost(&self, link_name: &str) -> u32 {
        self.lock()
            .get(link_name)
            .map_or(self.default_cost, |l| l.cost)
    }

    /// Build a sample for a link without going through the async trait.
    pub fn sample(&self, link: &MonitoredLink) -> Result<MetricSample, SourceError> {
        let state = *self
            .lock()
            .entry(link.name.clone())
            .or_insert(SimulatedLink {
                cost: self.default_cost,
                profile: LoadProfile::Random,
            });

        let condition = match state.profile {
            LoadProfile::Random => random_condition(),
            LoadProfile::Fixed(condition) => condition,
            LoadProfile::Down => LinkCondition {
                bandwidth_utilization: 0.0,
                latency_ms: UNREACHABLE_LATENCY_MS,
                packet_loss_percent: 100.0,
                jitter_ms: 0.0,
            },
            LoadProfile::Unavailable => {
                return Err(SourceError::Unreachable {
                    link: link.name.clone(),
                    router: link.source_router.clone(),
                });
            }
        };

        Ok(MetricSample {
            link_name: link.name.clone(),
            bandwidth_utilization: condition.bandwidth_utilization,
            latency_ms: condition.latency_ms,
            packet_loss_percent: condition.packet_loss_percent,
            jitter_ms: condition.jitter_ms,
            current_cost: state.cost,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SimulatedLink>> {
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricsSource for SimulatedNetwork {
    async fn collect(&self, link: &MonitoredLink) -> Result<MetricSample, SourceError> {
        self.sample(link)
    }
}

fn random_condition() -> LinkCondition {
    let mut rng = rand::rng();
    let packet_loss_percent = if rng.random_bool(0.1) {
        rng.random_range(0.1..3.0)
    } else {
        0.0
    };
    LinkCondition {
        bandwidth_utilization: rng.random_range(5.0..95.0),
        latency_ms: rng.random_range(1.0..120.0),
        packet_loss_percent,
        jitter_ms: rng.random_range(0.0..10.0),
    }
}
