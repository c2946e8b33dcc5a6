//! The metric acquisition seam.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use ospf_core::{MetricSample, MonitoredLink};

/// Errors raised while obtaining a sample for one link.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no sample available for link {0}")]
    Missing(String),

    #[error("router {router} unreachable while sampling link {link}")]
    Unreachable { link: String, router: String },

    #[error("failed to read samples from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no sample for link {link}: {reason}")]
    BatchUnavailable { link: String, reason: String },

    #[error("malformed sample file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Produces one [`MetricSample`] per monitored link per cycle.
pub trait MetricsSource: Send + Sync {
    fn collect(
        &self,
        link: &MonitoredLink,
    ) -> impl Future<Output = Result<MetricSample, SourceError>> + Send;

    /// Collect every link of one cycle. Results line up with `links`.
    ///
    /// The default collects link by link. Sources that read a shared
    /// snapshot override it so that one cycle sees one snapshot.
    fn collect_all(
        &self,
        links: &[MonitoredLink],
    ) -> impl Future<Output = Vec<Result<MetricSample, SourceError>>> + Send {
        async move {
            let mut results = Vec::with_capacity(links.len());
            for link in links {
                results.push(self.collect(link).await);
            }
            results
        }
    }
}

impl<T: MetricsSource> MetricsSource for Arc<T> {
    fn collect(
        &self,
        link: &MonitoredLink,
    ) -> impl Future<Output = Result<MetricSample, SourceError>> + Send {
        (**self).collect(link)
    }

    fn collect_all(
        &self,
        links: &[MonitoredLink],
    ) -> impl Future<Output = Vec<Result<MetricSample, SourceError>>> + Send {
        (**self).collect_all(links)
    }
}
