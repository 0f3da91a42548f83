//! Published snapshot storage and the background refresher.
//!
//! Readers always see a complete [`Snapshot`]: the refresher builds a new one
//! off to the side and swaps it in with a single pointer assignment, so a
//! request never observes a half-built story list.
//!
//! # Failure handling
//!
//! Each refresh runs the pipeline inside its own tokio task. If that task
//! panics the error is logged, the previously published snapshot stays in
//! place, and the loop carries on with the next interval.

use crate::models::Snapshot;
use crate::outputs::json;
use crate::pipeline::Pipeline;
use crate::time::TimeNormalizer;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// Holds the most recently published snapshot.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    /// A store serving an empty snapshot stamped with the current time.
    pub fn new(normalizer: TimeNormalizer) -> Self {
        Self::with_snapshot(Snapshot::empty(normalizer.now()))
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The latest published snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Replace the published snapshot.
    pub fn publish(&self, snapshot: Arc<Snapshot>) {
        *self.current.write() = snapshot;
    }
}

/// Periodically re-runs the pipeline and publishes the result.
pub struct Refresher {
    pipeline: Arc<Pipeline>,
    store: Arc<SnapshotStore>,
    interval: Duration,
    json_output_dir: Option<PathBuf>,
}

impl Refresher {
    pub fn new(pipeline: Arc<Pipeline>, store: Arc<SnapshotStore>, interval: Duration) -> Self {
        Self {
            pipeline,
            store,
            interval,
            json_output_dir: None,
        }
    }

    /// Also export every published snapshot as `latest.json` under `dir`.
    pub fn with_json_output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.json_output_dir = Some(dir.into());
        self
    }

    /// Run the pipeline once and publish its snapshot.
    ///
    /// Returns the published snapshot, or `None` when the run panicked and
    /// the previous snapshot was kept.
    #[instrument(level = "info", skip_all)]
    pub async fn refresh(&self) -> Option<Arc<Snapshot>> {
        let pipeline = Arc::clone(&self.pipeline);
        let snapshot = match tokio::spawn(async move { pipeline.snapshot().await }).await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                error!(error = %e, "Pipeline run aborted; keeping previous snapshot");
                return None;
            }
        };

        self.store.publish(Arc::clone(&snapshot));
        info!(
            stories = snapshot.stories.len(),
            refreshed_at = %snapshot.refreshed_label(),
            "Published snapshot"
        );

        if let Some(dir) = &self.json_output_dir {
            if let Err(e) = json::write_snapshot(&snapshot, dir).await {
                warn!(path = %dir.display(), error = %e, "Failed to export snapshot JSON");
            }
        }

        Some(snapshot)
    }

    /// Start the refresh loop: refresh immediately, then once per interval.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(interval_secs = self.interval.as_secs(), "Starting background refresher");
        tokio::spawn(async move {
            loop {
                self.refresh().await;
                tokio::time::sleep(self.interval).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::FetchError;
    use crate::models::RawArticle;
    use crate::pipeline::Fetcher;
    use crate::pipeline::tests::{StaticFetcher, relevant};
    use async_trait::async_trait;

    struct PanickingFetcher;

    #[async_trait]
    impl Fetcher for PanickingFetcher {
        fn source(&self) -> &str {
            "Panics"
        }

        async fn fetch(&self) -> Result<Vec<RawArticle>, FetchError> {
            panic!("markup changed under us");
        }
    }

    fn store() -> Arc<SnapshotStore> {
        Arc::new(SnapshotStore::new(TimeNormalizer::new(Config::default().offset())))
    }

    fn pipeline_with(fetcher: Box<dyn Fetcher>) -> Arc<Pipeline> {
        Arc::new(Pipeline::new(&Config::default(), vec![fetcher]))
    }

    #[test]
    fn test_store_starts_empty_and_swaps() {
        let store = store();
        let first = store.current();
        assert!(first.stories.is_empty());

        let next = Arc::new(Snapshot::empty(first.refreshed_at));
        store.publish(Arc::clone(&next));
        assert!(Arc::ptr_eq(&store.current(), &next));
        assert!(!Arc::ptr_eq(&store.current(), &first));
    }

    #[tokio::test]
    async fn test_refresh_publishes_snapshot() {
        let store = store();
        let fetcher = StaticFetcher {
            name: "NDTV".to_string(),
            articles: (0..3).map(|i| relevant(i, "NDTV")).collect(),
        };
        let refresher = Refresher::new(pipeline_with(Box::new(fetcher)), Arc::clone(&store), Duration::from_secs(300));

        let published = refresher.refresh().await.expect("refresh succeeds");
        assert_eq!(published.stories.len(), 3);
        assert!(Arc::ptr_eq(&store.current(), &published));
    }

    #[tokio::test]
    async fn test_panicking_run_keeps_previous_snapshot() {
        let store = store();
        let before = store.current();
        let refresher = Refresher::new(pipeline_with(Box::new(PanickingFetcher)), Arc::clone(&store), Duration::from_secs(300));

        assert!(refresher.refresh().await.is_none());
        assert!(Arc::ptr_eq(&store.current(), &before));
    }

    #[tokio::test]
    async fn test_refresh_exports_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = store();
        let fetcher = StaticFetcher {
            name: "TOI".to_string(),
            articles: vec![relevant(1, "TOI")],
        };
        let refresher = Refresher::new(pipeline_with(Box::new(fetcher)), store, Duration::from_secs(300))
            .with_json_output(dir.path());

        refresher.refresh().await.expect("refresh succeeds");
        let text = std::fs::read_to_string(dir.path().join("latest.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["stories"].as_array().unwrap().len(), 1);
    }
}
