//! Durable snapshot capture and restore.
//!
//! A snapshot pairs each entity's public state with its secret key and
//! nothing else: occupancy, position indices, and spaceport rosters are all
//! rebuilt from primary records on restore. Restore constructs a fresh
//! world, so loading the same snapshot twice cannot double-register
//! anything.

use serde::{Deserialize, Serialize};

use crate::crew::{Crew, Location, RoleSlots};
use crate::error::SnapshotError;
use crate::identity::{CrewId, IdAllocator, PlanetId, SecretKey, ShipId};
use crate::planet::Planet;
use crate::position::Position;
use crate::ship::{Course, Scanner, Ship};
use crate::world::World;

/// Snapshot format version this build writes and reads.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A crew's durable record: public state plus the secret key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCrew {
    /// Crew id.
    pub id: CrewId,
    /// Role slots.
    pub members: RoleSlots,
    /// Credits.
    pub credits: u64,
    /// Location at save time.
    pub location: Location,
    /// Capability token.
    pub key: SecretKey,
}

/// A ship's durable record: public state plus the secret key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedShip {
    /// Ship id.
    pub id: ShipId,
    /// Hull model.
    pub model: String,
    /// Name.
    pub name: String,
    /// Hull health.
    pub health: u32,
    /// Position at save time.
    pub position: Position,
    /// Landed planet, if any.
    pub planet: Option<PlanetId>,
    /// Active course, if any.
    pub course: Option<Course>,
    /// Scanner state.
    pub scanner: Scanner,
    /// Capability token.
    pub key: SecretKey,
}

/// A spaceport's durable record. Rosters are derived state and are not
/// saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSpaceport {
    /// Owning planet.
    pub planet_id: PlanetId,
}

/// The full durable world state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// Tick counter at save time.
    pub time: u64,
    /// Id allocator watermark.
    pub next_id: u64,
    /// All crews, ascending id order.
    pub crews: Vec<SavedCrew>,
    /// All ships, ascending id order.
    pub ships: Vec<SavedShip>,
    /// All planets, ascending id order.
    pub planets: Vec<Planet>,
    /// All spaceports, ascending planet order.
    pub spaceports: Vec<SavedSpaceport>,
}

impl World {
    /// Capture the full durable state of this world.
    ///
    /// Record order is ascending id order, so two worlds with identical
    /// state produce identical snapshots.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let crews = self
            .crews
            .sorted_ids()
            .into_iter()
            .filter_map(|id| self.crews.get(id))
            .map(|crew| SavedCrew {
                id: crew.id,
                members: crew.members.clone(),
                credits: crew.credits,
                location: crew.location,
                key: crew.key.clone(),
            })
            .collect();

        let ships = self
            .ships
            .sorted_ids()
            .into_iter()
            .filter_map(|id| self.ships.get(id))
            .map(|ship| SavedShip {
                id: ship.id,
                model: ship.model.clone(),
                name: ship.name.clone(),
                health: ship.health,
                position: ship.position,
                planet: ship.planet,
                course: ship.course,
                scanner: ship.scanner.clone(),
                key: ship.key.clone(),
            })
            .collect();

        let planets = self
            .planets
            .sorted_ids()
            .into_iter()
            .filter_map(|id| self.planets.get(id))
            .cloned()
            .collect();

        let spaceports = self
            .spaceports
            .sorted_planet_ids()
            .into_iter()
            .map(|planet_id| SavedSpaceport { planet_id })
            .collect();

        Snapshot {
            version: SNAPSHOT_VERSION,
            time: self.time,
            next_id: self.alloc.watermark(),
            crews,
            ships,
            planets,
            spaceports,
        }
    }

    /// Rebuild a world from a snapshot.
    ///
    /// Every secondary index — planet position index, ship occupancy,
    /// spaceport rosters — is reconstructed from primary records; nothing
    /// is trusted to have survived. `seed` reseeds world randomness, which
    /// is not (and cannot be) part of the durable state.
    pub fn restore(snapshot: &Snapshot, seed: u64) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let mut world = Self::new(seed);
        world.time = snapshot.time;
        world.alloc = IdAllocator::resume_from(snapshot.next_id);

        for planet in &snapshot.planets {
            if world.planets.occupied(planet.position) {
                return Err(SnapshotError::DuplicatePlanetPosition(planet.position));
            }
            world.planets.insert(planet.clone());
            world.spaceports.create(planet.id);
        }
        for port in &snapshot.spaceports {
            if world.planets.get(port.planet_id).is_none() {
                return Err(SnapshotError::UnknownPlanet(port.planet_id));
            }
        }

        for saved in &snapshot.ships {
            if let Some(planet_id) = saved.planet {
                let port = world
                    .spaceports
                    .get_mut(planet_id)
                    .ok_or(SnapshotError::UnknownPlanet(planet_id))?;
                port.add_ship(saved.id);
            }
            world.ships.insert(Ship {
                id: saved.id,
                model: saved.model.clone(),
                name: saved.name.clone(),
                health: saved.health,
                position: saved.position,
                planet: saved.planet,
                course: saved.course,
                scanner: saved.scanner.clone(),
                crew: None,
                key: saved.key.clone(),
            });
        }

        for saved in &snapshot.crews {
            match saved.location {
                Location::OnShip(ship_id) => {
                    let ship = world
                        .ships
                        .get_mut(ship_id)
                        .ok_or(SnapshotError::UnknownShip(ship_id))?;
                    if ship.crew.is_some() {
                        return Err(SnapshotError::ShipOccupied(ship_id));
                    }
                    ship.crew = Some(saved.id);
                }
                Location::OnPlanet(planet_id) => {
                    if world.planets.get(planet_id).is_none() {
                        return Err(SnapshotError::UnknownPlanet(planet_id));
                    }
                }
                Location::AtSpaceport(planet_id) => {
                    let port = world
                        .spaceports
                        .get_mut(planet_id)
                        .ok_or(SnapshotError::UnknownPlanet(planet_id))?;
                    port.add_crew(saved.id);
                }
            }
            world.crews.insert(Crew {
                id: saved.id,
                members: saved.members.clone(),
                credits: saved.credits,
                location: saved.location,
                key: saved.key.clone(),
            });
        }

        Ok(world)
    }
}
