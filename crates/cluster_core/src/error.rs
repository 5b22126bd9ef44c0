//! Error types for the world simulation.
//!
//! Domain errors are flat tokens: every recoverable command failure maps to
//! one camelCase token that travels back to the caller over the same channel
//! as a success reply. Snapshot errors are structured, because a broken
//! snapshot is an operator problem rather than a player-visible one.

use serde::Serialize;
use thiserror::Error;

use crate::identity::{PlanetId, ShipId};
use crate::position::Position;

/// Result type alias for command dispatch using [`CommandError`].
pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// A recoverable command failure, reported to the issuing session only.
///
/// The `Display` form of each variant is the wire token. Domain errors never
/// mutate world state and never propagate to other sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandError {
    /// The ship/crew name fails the name rules.
    #[error("invalidCrewName")]
    InvalidCrewName,
    /// The captain name fails the name rules.
    #[error("invalidCaptainName")]
    InvalidCaptainName,
    /// No crew registered under the presented id.
    #[error("noSuchCrew")]
    NoSuchCrew,
    /// No ship registered under the presented id.
    #[error("noSuchShip")]
    NoSuchShip,
    /// The presented secret key does not match.
    #[error("invalidKey")]
    InvalidKey,
    /// The session has not bound a crew yet.
    #[error("notInCrew")]
    NotInCrew,
    /// The crew is not aboard a ship.
    #[error("notOnShip")]
    NotOnShip,
    /// The crew is already aboard a ship.
    #[error("alreadyOnShip")]
    AlreadyOnShip,
    /// The crew is not at a spaceport.
    #[error("notAtSpaceport")]
    NotAtSpaceport,
    /// The ship is landed on a planet.
    #[error("shipOnPlanet")]
    ShipOnPlanet,
    /// The ship is not landed on a planet.
    #[error("shipNotOnPlanet")]
    ShipNotOnPlanet,
    /// No planet sits at the ship's exact position.
    #[error("shipNotAbovePlanet")]
    ShipNotAbovePlanet,
    /// The ship is following a course.
    #[error("shipCourseInProgress")]
    ShipCourseInProgress,
    /// A scan is already running.
    #[error("scanInProgress")]
    ScanInProgress,
    /// The target ship already carries a crew.
    #[error("shipFull")]
    ShipFull,
    /// The shout message is empty or too long.
    #[error("invalidMessage")]
    InvalidMessage,
}

/// Integrity failure while restoring a world from a snapshot.
///
/// Restore rebuilds every secondary index from primary records; any record
/// referencing a missing entity means the snapshot is corrupt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The snapshot was written by an unsupported format version.
    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the snapshot.
        found: u32,
        /// Version this build writes and reads.
        expected: u32,
    },

    /// A record references a planet that is not in the snapshot.
    #[error("Record references unknown planet {0}")]
    UnknownPlanet(PlanetId),

    /// A crew location references a ship that is not in the snapshot.
    #[error("Crew location references unknown ship {0}")]
    UnknownShip(ShipId),

    /// Two crews claim the same ship.
    #[error("Ship {0} is claimed by more than one crew")]
    ShipOccupied(ShipId),

    /// Two planets share a lattice position.
    #[error("Two planets share position {0}")]
    DuplicatePlanetPosition(Position),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_tokens() {
        assert_eq!(CommandError::InvalidCrewName.to_string(), "invalidCrewName");
        assert_eq!(CommandError::NoSuchCrew.to_string(), "noSuchCrew");
        assert_eq!(CommandError::ShipNotAbovePlanet.to_string(), "shipNotAbovePlanet");
        assert_eq!(CommandError::ScanInProgress.to_string(), "scanInProgress");
    }

    #[test]
    fn test_error_serializes_to_token() {
        let json = serde_json::to_string(&CommandError::ShipCourseInProgress).unwrap();
        assert_eq!(json, "\"shipCourseInProgress\"");

        let json = serde_json::to_string(&CommandError::InvalidMessage).unwrap();
        assert_eq!(json, "\"invalidMessage\"");
    }
}
