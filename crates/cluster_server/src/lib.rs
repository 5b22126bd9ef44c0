//! # Cluster Server
//!
//! Process shell around the [`cluster_core`] world: a single simulation
//! task owns the world and serializes every mutation — client commands and
//! the fixed-interval tick go through the same queue, so no two mutations
//! ever interleave. Snapshots are written on an interval and at shutdown.
//!
//! Transport and handshake mechanics live outside this crate; sessions are
//! in-process channel pairs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

use std::path::PathBuf;
use std::time::Duration;

pub mod sim;
pub mod storage;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interval between world ticks.
    pub tick_interval: Duration,
    /// Interval between periodic snapshot saves.
    pub save_interval: Duration,
    /// Snapshot file location.
    pub save_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            save_interval: Duration::from_secs(60),
            save_path: PathBuf::from("cluster.json"),
        }
    }
}

impl ServerConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// `CLUSTER_SAVE_PATH` overrides the snapshot location.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("CLUSTER_SAVE_PATH") {
            config.save_path = PathBuf::from(path);
        }
        config
    }
}
