//! Per-link history of calculated costs.
//!
//! One bounded sequence per link, each behind its own mutex so that
//! evaluations of different links never contend and two evaluations of the
//! same link are serialized.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Bounded, oldest-first sequence of calculated costs for one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostHistory {
    costs: Vec<u32>,
    capacity: usize,
}

impl CostHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            costs: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a cost, dropping the oldest entries beyond capacity.
    pub fn push(&mut self, cost: u32) {
        self.costs.push(cost);
        if self.costs.len() > self.capacity {
            let excess = self.costs.len() - self.capacity;
            self.costs.drain(..excess);
        }
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.costs
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

/// Histories for every link the calculator has seen.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    links: RwLock<HashMap<String, Arc<Mutex<CostHistory>>>>,
}

impl HistoryStore {
    /// Create an empty store keeping `capacity` costs per link.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            links: RwLock::new(HashMap::new()),
        }
    }

    /// Run `f` with exclusive access to the history of `link_name`,
    /// creating an empty history on first use.
    pub fn with_link<R>(&self, link_name: &str, f: impl FnOnce(&mut CostHistory) -> R) -> R {
        let entry = self.entry(link_name);
        let mut history = entry.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut history)
    }

    /// Append one cost to a link's history.
    pub fn record(&self, link_name: &str, cost: u32) {
        self.with_link(link_name, |history| history.push(cost));
    }

    /// Copy of a link's history, oldest first. Empty for unknown links.
    pub fn get(&self, link_name: &str) -> Vec<u32> {
        let links = self.links.read().unwrap_or_else(PoisonError::into_inner);
        match links.get(link_name) {
            Some(entry) => entry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .as_slice()
                .to_vec(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.links.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, link_name: &str) -> Arc<Mutex<CostHistory>> {
        {
            let links = self.links.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = links.get(link_name) {
                return Arc::clone(entry);
            }
        }

        let mut links = self.links.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            links
                .entry(link_name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(CostHistory::new(self.capacity)))),
        )
    }
}
