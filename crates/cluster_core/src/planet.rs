//! Planets: fixed points of interest with unique lattice positions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::PlanetId;
use crate::position::Position;

/// A fixed point of interest. Position is unique across all planets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planet {
    /// Planet id.
    pub id: PlanetId,
    /// Generated designation (`XXX-XXX`).
    pub name: String,
    /// Fixed lattice position.
    pub position: Position,
}

/// All planets, keyed by id and by position.
#[derive(Debug, Clone, Default)]
pub struct PlanetRegistry {
    planets: HashMap<PlanetId, Planet>,
    by_position: HashMap<Position, PlanetId>,
}

impl PlanetRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a planet, indexing it by position.
    pub fn insert(&mut self, planet: Planet) {
        self.by_position.insert(planet.position, planet.id);
        self.planets.insert(planet.id, planet);
    }

    /// Look up a planet by id.
    #[must_use]
    pub fn get(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(&id)
    }

    /// Look up the planet occupying an exact lattice position.
    #[must_use]
    pub fn at_position(&self, position: Position) -> Option<&Planet> {
        self.by_position
            .get(&position)
            .and_then(|id| self.planets.get(id))
    }

    /// Whether any planet occupies `position`.
    #[must_use]
    pub fn occupied(&self, position: Position) -> bool {
        self.by_position.contains_key(&position)
    }

    /// Planets within `radius` (inclusive) of `position`, in ascending
    /// id order.
    #[must_use]
    pub fn nearby(&self, position: Position, radius: f64) -> Vec<&Planet> {
        let mut found: Vec<&Planet> = self
            .planets
            .values()
            .filter(|p| p.position.distance(position) <= radius)
            .collect();
        found.sort_unstable_by_key(|p| p.id);
        found
    }

    /// Number of registered planets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.planets.len()
    }

    /// Whether no planets are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }

    /// Iterate over all planets (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = &Planet> {
        self.planets.values()
    }

    /// Sorted planet ids, for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<PlanetId> {
        let mut ids: Vec<_> = self.planets.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet(id: u64, x: i64, y: i64, z: i64) -> Planet {
        Planet {
            id: PlanetId(id),
            name: format!("P{id}"),
            position: Position::new(x, y, z),
        }
    }

    #[test]
    fn test_position_index() {
        let mut registry = PlanetRegistry::new();
        registry.insert(planet(1, 3, 4, 5));

        assert!(registry.occupied(Position::new(3, 4, 5)));
        assert!(!registry.occupied(Position::new(3, 4, 6)));
        assert_eq!(
            registry.at_position(Position::new(3, 4, 5)).map(|p| p.id),
            Some(PlanetId(1))
        );
    }

    #[test]
    fn test_nearby_is_inclusive_and_sorted() {
        let mut registry = PlanetRegistry::new();
        registry.insert(planet(3, 50, 0, 0)); // exactly on the radius
        registry.insert(planet(1, 10, 0, 0));
        registry.insert(planet(2, 51, 0, 0)); // just outside

        let near = registry.nearby(Position::new(0, 0, 0), 50.0);
        let ids: Vec<_> = near.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PlanetId(1), PlanetId(3)]);
    }
}
