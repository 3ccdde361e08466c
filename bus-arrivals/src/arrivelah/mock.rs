//! Mock arrival client for running without network access.
//!
//! Serves canned response bodies, either loaded from JSON files or
//! inserted at runtime, through the same classification as the real
//! client.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::StopId;

use super::client::classify_body;
use super::error::FetchError;
use super::source::ArrivalSource;
use super::types::RawServiceRecord;

/// Errors while loading mock data.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    /// Reading the directory or a file failed
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file is not valid JSON
    #[error("failed to parse {path:?}: {message}")]
    Json { path: PathBuf, message: String },

    /// The directory had no usable files
    #[error("no mock stop files found in {0:?}")]
    Empty(PathBuf),
}

#[derive(Default)]
struct MockState {
    bodies: HashMap<StopId, String>,
    latency: HashMap<StopId, Duration>,
}

/// Mock arrival client that serves canned responses.
///
/// Stops without a canned body answer like the real API does for unknown
/// stops (`services: null`).
#[derive(Clone, Default)]
pub struct MockArrivalClient {
    state: Arc<RwLock<MockState>>,
    fetches: Arc<AtomicUsize>,
}

impl MockArrivalClient {
    /// Create an empty mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client by loading JSON files from a directory.
    ///
    /// Expects files named `{stop}.json` (e.g. `83139.json`), each holding
    /// a full response body.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, MockError> {
        let data_dir = data_dir.as_ref();
        let mut bodies = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|source| MockError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| MockError::Io {
                path: data_dir.to_path_buf(),
                source,
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let Some(stop) = path.file_stem().and_then(|s| s.to_str()).map(StopId::new) else {
                continue;
            };
            if stop.is_empty() {
                continue;
            }

            let body = std::fs::read_to_string(&path).map_err(|source| MockError::Io {
                path: path.clone(),
                source,
            })?;

            serde_json::from_str::<serde_json::Value>(&body).map_err(|e| MockError::Json {
                path: path.clone(),
                message: e.to_string(),
            })?;

            bodies.insert(stop, body);
        }

        if bodies.is_empty() {
            return Err(MockError::Empty(data_dir.to_path_buf()));
        }

        let state = MockState {
            bodies,
            latency: HashMap::new(),
        };

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            fetches: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Serve `body` for `stop` from now on.
    pub async fn insert(&self, stop: impl Into<StopId>, body: impl Into<String>) {
        let mut state = self.state.write().await;
        state.bodies.insert(stop.into(), body.into());
    }

    /// Delay every answer for `stop`, to simulate a slow upstream.
    pub async fn set_latency(&self, stop: impl Into<StopId>, latency: Duration) {
        let mut state = self.state.write().await;
        state.latency.insert(stop.into(), latency);
    }

    /// Stops with canned data.
    pub async fn available_stops(&self) -> Vec<StopId> {
        let state = self.state.read().await;
        state.bodies.keys().cloned().collect()
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn answer(&self, stop: &StopId) -> Result<Vec<RawServiceRecord>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let (body, latency) = {
            let state = self.state.read().await;
            (
                state.bodies.get(stop).cloned(),
                state.latency.get(stop).copied(),
            )
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match body {
            Some(body) => classify_body(&body),
            None => {
                debug!(stop = %stop, "no mock data for stop");
                Err(FetchError::InvalidStop)
            }
        }
    }
}

impl ArrivalSource for MockArrivalClient {
    fn fetch<'a>(
        &'a self,
        stop: &'a StopId,
    ) -> BoxFuture<'a, Result<Vec<RawServiceRecord>, FetchError>> {
        self.answer(stop).boxed()
    }
}
