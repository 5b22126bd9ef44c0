//! Ships: position, landing state, course, and scanner.
//!
//! A ship is either landed (`planet` set) or free-flying (optionally with a
//! `course`); the dispatcher and tick maintain the planet-XOR-course
//! invariant. Occupancy is at most one crew and always mirrors that crew's
//! `OnShip` location.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::{CrewId, PlanetId, SecretKey, ShipId};
use crate::position::Position;

/// The only hull model currently produced.
pub const SHIP_MODEL: &str = "CARG-0";

/// Hull health a new ship starts with.
pub const STARTING_HEALTH: u32 = 1000;

/// An in-progress movement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Target lattice point. Deliberately unbounded: free space is legal.
    pub target: Position,
}

/// What a scan can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScannedKind {
    /// A planet within scanner radius.
    Planet,
}

/// One object found by a completed scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedObject {
    /// Object classification.
    #[serde(rename = "type")]
    pub kind: ScannedKind,
    /// Object name.
    pub name: String,
    /// Object position at scan completion time.
    pub position: Position,
}

/// Scanner state: a running countdown and/or the latest results.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scanner {
    /// Ticks until the running scan completes, if one is running.
    pub timer: Option<u32>,
    /// Results of the most recent completed scan.
    pub data: Option<Vec<ScannedObject>>,
}

impl Scanner {
    /// Whether a scan is currently running.
    #[must_use]
    pub const fn in_progress(&self) -> bool {
        self.timer.is_some()
    }
}

/// Public identifying summary of a ship, used in rosters and broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipInfo {
    /// Ship id.
    pub id: ShipId,
    /// Hull model designation.
    pub model: String,
    /// Player-chosen name.
    pub name: String,
}

/// A vehicle that moves through space, lands, and carries at most one crew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ship {
    /// Ship id.
    pub id: ShipId,
    /// Hull model designation.
    pub model: String,
    /// Player-chosen name.
    pub name: String,
    /// Hull health.
    pub health: u32,
    /// Current lattice position.
    pub position: Position,
    /// Planet this ship is landed on. Mutually exclusive with `course`.
    pub planet: Option<PlanetId>,
    /// Active movement order. Mutually exclusive with `planet`.
    pub course: Option<Course>,
    /// Scanner state.
    pub scanner: Scanner,
    /// Occupying crew, if any. Relational; rebuilt from crew locations
    /// on restore, so it is not part of the ship's serialized state.
    #[serde(skip)]
    pub(crate) crew: Option<CrewId>,
    /// Capability token for `enterShip`.
    #[serde(skip)]
    pub(crate) key: SecretKey,
}

impl Ship {
    /// Create a new ship of the default model at `position`.
    #[must_use]
    pub fn new(id: ShipId, name: String, position: Position, key: SecretKey) -> Self {
        Self {
            id,
            model: SHIP_MODEL.to_string(),
            name,
            health: STARTING_HEALTH,
            position,
            planet: None,
            course: None,
            scanner: Scanner::default(),
            crew: None,
            key,
        }
    }

    /// Public identifying summary.
    #[must_use]
    pub fn info(&self) -> ShipInfo {
        ShipInfo {
            id: self.id,
            model: self.model.clone(),
            name: self.name.clone(),
        }
    }

    /// Whether the ship is landed on a planet.
    #[must_use]
    pub const fn landed(&self) -> bool {
        self.planet.is_some()
    }

    /// The occupying crew, if any.
    #[must_use]
    pub const fn crew(&self) -> Option<CrewId> {
        self.crew
    }

    /// Check a presented key against the ship's secret key.
    #[must_use]
    pub fn key_matches(&self, presented: &str) -> bool {
        self.key.matches(presented)
    }
}

/// All ships, keyed by id. Ships are never deleted.
#[derive(Debug, Clone, Default)]
pub struct ShipRegistry {
    ships: HashMap<ShipId, Ship>,
}

impl ShipRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ship.
    pub fn insert(&mut self, ship: Ship) {
        self.ships.insert(ship.id, ship);
    }

    /// Look up a ship by id.
    #[must_use]
    pub fn get(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(&id)
    }

    /// Look up a ship mutably by id.
    pub fn get_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.get_mut(&id)
    }

    /// Number of registered ships.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ships.len()
    }

    /// Whether no ships are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    /// Iterate over all ships (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = &Ship> {
        self.ships.values()
    }

    /// Sorted ship ids, for deterministic tick iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<ShipId> {
        let mut ids: Vec<_> = self.ships.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ship(id: u64) -> Ship {
        let mut rng = StdRng::seed_from_u64(id);
        Ship::new(
            ShipId(id),
            format!("Hull{id}"),
            Position::new(0, 0, 0),
            SecretKey::generate(&mut rng),
        )
    }

    #[test]
    fn test_new_ship_defaults() {
        let s = ship(1);
        assert_eq!(s.model, SHIP_MODEL);
        assert_eq!(s.health, STARTING_HEALTH);
        assert!(!s.landed());
        assert!(s.course.is_none());
        assert!(!s.scanner.in_progress());
        assert!(s.crew().is_none());
    }

    #[test]
    fn test_serialized_ship_omits_key() {
        let s = ship(1);
        let secret = s.key.expose().to_string();
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains(&secret));
    }

    #[test]
    fn test_scanned_object_wire_shape() {
        let object = ScannedObject {
            kind: ScannedKind::Planet,
            name: "QQ3-AB1".to_string(),
            position: Position::new(1, 2, 3),
        };
        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(json["type"], "planet");
        assert_eq!(json["name"], "QQ3-AB1");
    }

    #[test]
    fn test_registry_sorted_ids() {
        let mut registry = ShipRegistry::new();
        for id in [5, 2, 9] {
            registry.insert(ship(id));
        }
        assert_eq!(
            registry.sorted_ids(),
            vec![ShipId(2), ShipId(5), ShipId(9)]
        );
    }
}
