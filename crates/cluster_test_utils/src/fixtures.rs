//! Test fixtures and helpers.
//!
//! Pre-built deterministic worlds and crew spawning shortcuts for
//! consistent testing across crates.

use cluster_core::command::{Command, Reply, Session};
use cluster_core::identity::{CrewId, PlanetId, SessionId, ShipId};
use cluster_core::position::Position;
use cluster_core::world::World;

/// The seed every fixture world uses.
pub const FIXTURE_SEED: u64 = 42;

/// A crew created through the command surface, with its capability keys.
#[derive(Debug, Clone)]
pub struct SpawnedCrew {
    /// The session bound to the crew.
    pub session: Session,
    /// The crew's id.
    pub crew_id: CrewId,
    /// The crew's ship.
    pub ship_id: ShipId,
    /// Key for `returnToCrew`.
    pub crew_key: String,
    /// Key for `enterShip`.
    pub ship_key: String,
}

/// Create a position from coordinates.
#[must_use]
pub const fn pos(x: i64, y: i64, z: i64) -> Position {
    Position::new(x, y, z)
}

/// An empty deterministic world: no planets, no crews.
#[must_use]
pub fn empty_world() -> World {
    World::new(FIXTURE_SEED)
}

/// A freshly generated deterministic world (ten planets, no crews).
#[must_use]
pub fn generated_world() -> World {
    World::generate(FIXTURE_SEED)
}

/// Create a crew through `createCrew` and return its handles.
///
/// # Panics
/// Panics if crew creation fails; fixtures use known-valid names.
#[must_use]
pub fn spawn_crew(world: &mut World, session_id: u64, ship_name: &str) -> SpawnedCrew {
    let mut session = Session::new(SessionId(session_id));
    let (reply, _) = world
        .execute(
            &mut session,
            Command::CreateCrew {
                ship_name: ship_name.to_string(),
                captain_name: format!("Captain{session_id}"),
            },
        )
        .expect("fixture crew creation");
    match reply {
        Reply::CrewCreated {
            crew,
            ship,
            crew_key,
            ship_key,
        } => SpawnedCrew {
            session,
            crew_id: crew.id,
            ship_id: ship.id,
            crew_key: crew_key.expose().to_string(),
            ship_key: ship_key.expose().to_string(),
        },
        other => panic!("unexpected createCrew reply: {other:?}"),
    }
}

/// Place a planet directly beneath a ship so `landShip` can succeed.
///
/// Returns the planet already beneath the ship when one exists.
///
/// # Panics
/// Panics if the ship does not exist.
pub fn planet_under_ship(world: &mut World, ship_id: ShipId) -> PlanetId {
    let position = world
        .ships()
        .get(ship_id)
        .expect("fixture ship exists")
        .position;
    if let Some(existing) = world.planets().at_position(position) {
        return existing.id;
    }
    world.create_planet(position)
}
