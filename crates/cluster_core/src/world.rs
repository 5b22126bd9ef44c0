//! The world aggregate and the fixed-interval tick.
//!
//! One `World` owns every registry, the id allocator, the tick counter, and
//! a seeded RNG. Commands (see [`crate::command`]) and the tick are the only
//! mutation paths, and the caller is expected to run them one at a time;
//! nothing in here suspends or blocks.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::crew::{CrewRegistry, Location};
use crate::identity::{IdAllocator, PlanetId, SecretKey, SessionId};
use crate::planet::{Planet, PlanetRegistry};
use crate::position::Position;
use crate::room::{Broadcast, Event, Room, RoomRegistry};
use crate::ship::{ScannedKind, ScannedObject, ShipRegistry};
use crate::spaceport::{SpaceportRegistry, SpaceportView};
use crate::upgrades::SCANNER_RADIUS;

/// Number of planets a fresh world is generated with.
pub const PLANET_COUNT: usize = 10;

/// The authoritative world: registries, rooms, time, and randomness.
#[derive(Debug)]
pub struct World {
    /// Tick counter, incremented once per [`World::tick`].
    pub(crate) time: u64,
    /// Shared id source for all entity types.
    pub(crate) alloc: IdAllocator,
    /// Seeded world randomness (positions, keys, names).
    pub(crate) rng: StdRng,
    /// All crews.
    pub(crate) crews: CrewRegistry,
    /// All ships.
    pub(crate) ships: ShipRegistry,
    /// All planets.
    pub(crate) planets: PlanetRegistry,
    /// All spaceports.
    pub(crate) spaceports: SpaceportRegistry,
    /// Session room subscriptions.
    pub(crate) rooms: RoomRegistry,
}

impl World {
    /// Create an empty world (no planets) with the given RNG seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            time: 0,
            alloc: IdAllocator::new(),
            rng: StdRng::seed_from_u64(seed),
            crews: CrewRegistry::new(),
            ships: ShipRegistry::new(),
            planets: PlanetRegistry::new(),
            spaceports: SpaceportRegistry::new(),
            rooms: RoomRegistry::new(),
        }
    }

    /// Generate a fresh world: [`PLANET_COUNT`] planets at distinct random
    /// positions, each with an empty spaceport.
    #[must_use]
    pub fn generate(seed: u64) -> Self {
        let mut world = Self::new(seed);
        for _ in 0..PLANET_COUNT {
            let position = loop {
                let candidate = Position::random(&mut world.rng);
                if !world.planets.occupied(candidate) {
                    break candidate;
                }
            };
            world.create_planet(position);
        }
        world
    }

    /// Create a planet (with its spaceport) at an exact position.
    ///
    /// The position must be free; generation rejection-samples before
    /// calling this, and scenario tests place planets directly.
    pub fn create_planet(&mut self, position: Position) -> PlanetId {
        debug_assert!(
            !self.planets.occupied(position),
            "two planets on one position"
        );
        let id = PlanetId(self.alloc.allocate());
        let name = crate::identity::generate_planet_name(&mut self.rng);
        self.planets.insert(Planet { id, name, position });
        self.spaceports.create(id);
        id
    }

    /// Current tick counter.
    #[must_use]
    pub const fn time(&self) -> u64 {
        self.time
    }

    /// All crews.
    #[must_use]
    pub const fn crews(&self) -> &CrewRegistry {
        &self.crews
    }

    /// All ships.
    #[must_use]
    pub const fn ships(&self) -> &ShipRegistry {
        &self.ships
    }

    /// All planets.
    #[must_use]
    pub const fn planets(&self) -> &PlanetRegistry {
        &self.planets
    }

    /// All spaceports.
    #[must_use]
    pub const fn spaceports(&self) -> &SpaceportRegistry {
        &self.spaceports
    }

    /// Sessions currently subscribed to `room`.
    #[must_use]
    pub fn room_members(&self, room: Room) -> Vec<SessionId> {
        self.rooms.members(room)
    }

    /// Rooms a session is currently subscribed to.
    #[must_use]
    pub fn session_rooms(&self, session: SessionId) -> HashSet<Room> {
        self.rooms.rooms(session)
    }

    /// Drop a disconnected session from every room.
    ///
    /// World state is untouched: the crew's presence persists until it
    /// returns with its key.
    pub fn disconnect(&mut self, session: SessionId) {
        self.rooms.leave_all(session);
    }

    /// Advance the world by one tick.
    ///
    /// Walks every ship in ascending id order: ships with a course take one
    /// step (or finish), ships with a running scanner count down (and report
    /// at zero). Returns the room-scoped broadcasts the shell must deliver.
    /// The tick never fails; a ship violating the planet-XOR-course
    /// invariant is a programming error.
    pub fn tick(&mut self) -> Vec<Broadcast> {
        let mut broadcasts = Vec::new();

        for ship_id in self.ships.sorted_ids() {
            let mut scan_finished_at: Option<Position> = None;

            if let Some(ship) = self.ships.get_mut(ship_id) {
                if let Some(course) = ship.course {
                    debug_assert!(
                        ship.planet.is_none(),
                        "landed ship {ship_id} has an active course"
                    );
                    if ship.position == course.target {
                        ship.course = None;
                        broadcasts
                            .push(Broadcast::new(Room::Ship(ship_id), Event::CourseReached));
                    } else {
                        ship.position = ship.position.step_towards(course.target);
                        broadcasts.push(Broadcast::new(
                            Room::Ship(ship_id),
                            Event::ShipPosition(ship.position),
                        ));
                        if ship.position == course.target {
                            ship.course = None;
                            broadcasts
                                .push(Broadcast::new(Room::Ship(ship_id), Event::CourseReached));
                        }
                    }
                }

                if let Some(timer) = ship.scanner.timer {
                    let timer = timer.saturating_sub(1);
                    if timer == 0 {
                        ship.scanner.timer = None;
                        scan_finished_at = Some(ship.position);
                    } else {
                        ship.scanner.timer = Some(timer);
                    }
                }
            }

            if let Some(origin) = scan_finished_at {
                let results: Vec<ScannedObject> = self
                    .planets
                    .nearby(origin, SCANNER_RADIUS)
                    .into_iter()
                    .map(|planet| ScannedObject {
                        kind: ScannedKind::Planet,
                        name: planet.name.clone(),
                        position: planet.position,
                    })
                    .collect();

                if let Some(ship) = self.ships.get_mut(ship_id) {
                    ship.scanner.data = Some(results.clone());
                }
                broadcasts.push(Broadcast::new(
                    Room::Ship(ship_id),
                    Event::ScannerResults(results),
                ));
            }
        }

        self.time += 1;
        broadcasts
    }

    /// The rooms implied by a crew location.
    ///
    /// Aboard a landed ship the crew also hears the planet and spaceport;
    /// at a spaceport it hears the planet and the spaceport; on a planet
    /// surface only the planet.
    #[must_use]
    pub fn rooms_for_location(&self, location: Location) -> HashSet<Room> {
        let mut rooms = HashSet::new();
        match location {
            Location::OnShip(ship_id) => {
                rooms.insert(Room::Ship(ship_id));
                if let Some(planet) = self.ships.get(ship_id).and_then(|s| s.planet) {
                    rooms.insert(Room::Planet(planet));
                    rooms.insert(Room::Spaceport(planet));
                }
            }
            Location::OnPlanet(planet) => {
                rooms.insert(Room::Planet(planet));
            }
            Location::AtSpaceport(planet) => {
                rooms.insert(Room::Planet(planet));
                rooms.insert(Room::Spaceport(planet));
            }
        }
        rooms
    }

    /// Client-facing snapshot of a planet's spaceport.
    #[must_use]
    pub fn spaceport_view(&self, planet: PlanetId) -> Option<SpaceportView> {
        let port = self.spaceports.get(planet)?;
        Some(SpaceportView {
            planet_id: planet,
            ships: port
                .ships()
                .iter()
                .filter_map(|&id| self.ships.get(id).map(crate::ship::Ship::info))
                .collect(),
            crews: port
                .crews()
                .iter()
                .filter_map(|&id| self.crews.get(id).map(crate::crew::Crew::info))
                .collect(),
        })
    }

    /// Generate a fresh secret key from world randomness.
    pub(crate) fn generate_key(&mut self) -> SecretKey {
        SecretKey::generate(&mut self.rng)
    }
}
