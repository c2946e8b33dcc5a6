//! Samples read from a JSON file written by an external collector.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ospf_core::{MetricSample, MonitoredLink};

use crate::source::{MetricsSource, SourceError};

/// Reads a JSON array of [`MetricSample`]s. The file is re-read every
/// cycle so an external writer can refresh it between cycles.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every sample in the file.
    pub fn load(&self) -> Result<Vec<MetricSample>, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.parse(&content)
    }

    fn parse(&self, content: &str) -> Result<Vec<MetricSample>, SourceError> {
        serde_json::from_str(content).map_err(|source| SourceError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn read(&self) -> Result<Vec<MetricSample>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        self.parse(&content)
    }
}

impl MetricsSource for FileSource {
    async fn collect(&self, link: &MonitoredLink) -> Result<MetricSample, SourceError> {
        self.read()
            .await?
            .into_iter()
            .find(|s| s.link_name == link.name)
            .ok_or_else(|| SourceError::Missing(link.name.clone()))
    }

    /// Reads the file once, so every link of the cycle comes from the same
    /// snapshot.
    async fn collect_all(
        &self,
        links: &[MonitoredLink],
    ) -> Vec<Result<MetricSample, SourceError>> {
        let samples = match self.read().await {
            Ok(samples) => samples,
            Err(e) => {
                let reason = e.to_string();
                return links
                    .iter()
                    .map(|link| {
                        Err(SourceError::BatchUnavailable {
                            link: link.name.clone(),
                            reason: reason.clone(),
                        })
                    })
                    .collect();
            }
        };

        // First entry wins when a link appears twice.
        let mut by_link: HashMap<String, MetricSample> = HashMap::with_capacity(samples.len());
        for sample in samples {
            by_link.entry(sample.link_name.clone()).or_insert(sample);
        }

        links
            .iter()
            .map(|link| {
                by_link
                    .get(&link.name)
                    .cloned()
                    .ok_or_else(|| SourceError::Missing(link.name.clone()))
            })
            .collect()
    }
}
