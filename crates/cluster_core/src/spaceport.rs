//! Spaceports: planet-bound facilities tracking landed ships and
//! disembarked crews.
//!
//! Rosters are relational state: the ship roster mirrors `ship.planet` and
//! the crew roster mirrors `Location::AtSpaceport`. Restore rebuilds both
//! from those primary records.

use std::collections::HashMap;

use serde::Serialize;

use crate::crew::CrewInfo;
use crate::identity::{CrewId, PlanetId, ShipId};
use crate::ship::ShipInfo;

/// A planet's spaceport. Every generated planet has exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spaceport {
    /// Owning planet.
    pub planet: PlanetId,
    /// Ships currently landed here, in arrival order.
    ships: Vec<ShipId>,
    /// Crews currently at the spaceport (disembarked), in arrival order.
    crews: Vec<CrewId>,
}

impl Spaceport {
    /// Create an empty spaceport for `planet`.
    #[must_use]
    pub const fn new(planet: PlanetId) -> Self {
        Self {
            planet,
            ships: Vec::new(),
            crews: Vec::new(),
        }
    }

    /// Add a ship to the roster. Adding a ship twice keeps one entry.
    pub fn add_ship(&mut self, ship: ShipId) {
        if !self.ships.contains(&ship) {
            self.ships.push(ship);
        }
    }

    /// Remove a ship from the roster. Removing an absent ship is a no-op.
    pub fn remove_ship(&mut self, ship: ShipId) {
        self.ships.retain(|&s| s != ship);
    }

    /// Add a crew to the roster. Adding a crew twice keeps one entry.
    pub fn add_crew(&mut self, crew: CrewId) {
        if !self.crews.contains(&crew) {
            self.crews.push(crew);
        }
    }

    /// Remove a crew from the roster. Removing an absent crew is a no-op.
    pub fn remove_crew(&mut self, crew: CrewId) {
        self.crews.retain(|&c| c != crew);
    }

    /// Landed ships, in arrival order.
    #[must_use]
    pub fn ships(&self) -> &[ShipId] {
        &self.ships
    }

    /// Disembarked crews, in arrival order.
    #[must_use]
    pub fn crews(&self) -> &[CrewId] {
        &self.crews
    }
}

/// Client-facing snapshot of a spaceport, with rosters expanded to infos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaceportView {
    /// Owning planet.
    pub planet_id: PlanetId,
    /// Landed ships.
    pub ships: Vec<ShipInfo>,
    /// Disembarked crews.
    pub crews: Vec<CrewInfo>,
}

/// All spaceports, keyed by owning planet.
#[derive(Debug, Clone, Default)]
pub struct SpaceportRegistry {
    by_planet: HashMap<PlanetId, Spaceport>,
}

impl SpaceportRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register an empty spaceport for `planet`.
    pub fn create(&mut self, planet: PlanetId) {
        self.by_planet.entry(planet).or_insert_with(|| Spaceport::new(planet));
    }

    /// Look up a planet's spaceport.
    #[must_use]
    pub fn get(&self, planet: PlanetId) -> Option<&Spaceport> {
        self.by_planet.get(&planet)
    }

    /// Look up a planet's spaceport mutably.
    pub fn get_mut(&mut self, planet: PlanetId) -> Option<&mut Spaceport> {
        self.by_planet.get_mut(&planet)
    }

    /// Number of registered spaceports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_planet.len()
    }

    /// Whether no spaceports are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_planet.is_empty()
    }

    /// Iterate over all spaceports (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = &Spaceport> {
        self.by_planet.values()
    }

    /// Sorted planet ids, for deterministic iteration.
    #[must_use]
    pub fn sorted_planet_ids(&self) -> Vec<PlanetId> {
        let mut ids: Vec<_> = self.by_planet.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
