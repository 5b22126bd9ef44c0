//! Cluster - Authoritative World Server

use cluster_core::world::World;
use cluster_server::{sim, storage, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Cluster World Server");

    let config = ServerConfig::from_env();
    let world = boot_world(&config);

    let (handle, task) = sim::spawn(world, config);

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => tracing::error!(error = %err, "failed to listen for shutdown signal"),
    }

    if handle.shutdown().await.is_err() {
        tracing::error!("simulation task was already gone at shutdown");
    }
    if let Err(err) = task.await {
        tracing::error!(error = %err, "simulation task panicked");
    }
}

/// Load the saved world, or generate a fresh one when there is none.
///
/// A corrupt snapshot is logged and set aside rather than overwritten
/// silently; the server still starts with a fresh world.
fn boot_world(config: &ServerConfig) -> World {
    let seed = rand::random::<u64>();
    match storage::load(&config.save_path) {
        Ok(Some(snapshot)) => match World::restore(&snapshot, seed) {
            Ok(world) => return world,
            Err(err) => {
                tracing::error!(error = %err, "saved world is inconsistent, generating fresh");
            }
        },
        Ok(None) => {
            tracing::info!(path = %config.save_path.display(), "no saved world, generating fresh");
        }
        Err(err) => {
            tracing::error!(error = %err, "saved world is unreadable, generating fresh");
        }
    }
    World::generate(seed)
}
