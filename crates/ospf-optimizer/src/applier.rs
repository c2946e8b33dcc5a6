//! The cost application seam.

use std::future::Future;
use std::sync::Arc;

use ospf_core::MonitoredLink;
use ospf_metrics::SimulatedNetwork;

/// Writes a new cost to the source side of a link.
pub trait CostApplier: Send + Sync {
    fn apply(
        &self,
        link: &MonitoredLink,
        cost: u32,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

impl<T: CostApplier> CostApplier for Arc<T> {
    fn apply(
        &self,
        link: &MonitoredLink,
        cost: u32,
    ) -> impl Future<Output = anyhow::Result<()>> + Send {
        (**self).apply(link, cost)
    }
}

impl CostApplier for SimulatedNetwork {
    async fn apply(&self, link: &MonitoredLink, cost: u32) -> anyhow::Result<()> {
        self.set_cost(&link.name, cost);
        Ok(())
    }
}
