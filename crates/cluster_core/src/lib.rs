//! # Cluster Core
//!
//! Authoritative world simulation for the Cluster space-crew game.
//!
//! This crate contains **only** deterministic, IO-free logic:
//! - No networking
//! - No file IO
//! - No wall clocks (time is a tick counter)
//! - No system randomness (the world owns a seeded RNG)
//!
//! This separation enables:
//! - A single-writer server shell (commands and ticks serialized by construction)
//! - Headless scenario testing without a runtime
//! - Snapshot round-trip testing against plain data
//!
//! ## Crate Structure
//!
//! - [`identity`] - Id allocation, secret keys, name rules
//! - [`position`] - Lattice positions and course stepping
//! - [`crew`], [`ship`], [`planet`], [`spaceport`] - Entities and registries
//! - [`command`] - Command dispatcher (validation and transitions)
//! - [`room`] - Broadcast rooms and the subscription registry
//! - [`world`] - The owned world aggregate and the tick
//! - [`snapshot`] - Durable snapshot capture and restore
//! - [`upgrades`] - Ship upgrade tables

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod command;
pub mod crew;
pub mod error;
pub mod identity;
pub mod planet;
pub mod position;
pub mod room;
pub mod ship;
pub mod snapshot;
pub mod spaceport;
pub mod upgrades;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::command::{Command, Reply, Session};
    pub use crate::crew::{Crew, CrewInfo, CrewMember, Location, Role};
    pub use crate::error::{CommandError, CommandResult, SnapshotError};
    pub use crate::identity::{CrewId, MemberId, PlanetId, SecretKey, SessionId, ShipId};
    pub use crate::planet::Planet;
    pub use crate::position::Position;
    pub use crate::room::{Broadcast, Event, Room};
    pub use crate::ship::{Ship, ShipInfo};
    pub use crate::snapshot::Snapshot;
    pub use crate::world::World;
}
