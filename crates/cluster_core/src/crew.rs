//! Crews: the player-controlled unit, its members, and its location.
//!
//! A crew occupies exactly one [`Location`] at all times. The tagged enum
//! makes "more than one location populated" unrepresentable; every
//! transition swaps the whole variant.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::{CrewId, MemberId, PlanetId, SecretKey, ShipId};

/// Credits a newly created crew starts with.
pub const STARTING_CREDITS: u64 = 50;

/// A role aboard a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The crew's founder and public face.
    Captain,
    /// Flies the ship.
    Pilot,
    /// Operates weapons.
    Weapon,
    /// Keeps the ship running.
    Mechanic,
    /// Keeps the crew running.
    Cook,
}

/// A named member filling one role slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    /// Unique member id.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    /// The role this member fills.
    pub role: Role,
}

/// The crew's ordered role slots. The captain slot is always filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSlots {
    /// The captain (always present).
    pub captain: CrewMember,
    /// Pilot slot.
    pub pilot: Option<CrewMember>,
    /// Weapon slot.
    pub weapon: Option<CrewMember>,
    /// Mechanic slot.
    pub mechanic: Option<CrewMember>,
    /// Cook slot.
    pub cook: Option<CrewMember>,
}

impl RoleSlots {
    /// Slots with only the captain filled.
    #[must_use]
    pub const fn with_captain(captain: CrewMember) -> Self {
        Self {
            captain,
            pilot: None,
            weapon: None,
            mechanic: None,
            cook: None,
        }
    }
}

/// Where a crew currently is. Exactly one variant, by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Location {
    /// Aboard a ship (in space or landed).
    OnShip(ShipId),
    /// On a planet surface, outside any facility.
    OnPlanet(PlanetId),
    /// At a planet's spaceport, between ships.
    AtSpaceport(PlanetId),
}

impl Location {
    /// The ship the crew is aboard, if any.
    #[must_use]
    pub const fn ship(self) -> Option<ShipId> {
        match self {
            Self::OnShip(id) => Some(id),
            _ => None,
        }
    }
}

/// Public identifying summary of a crew, used in rosters and broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewInfo {
    /// Crew id.
    pub id: CrewId,
    /// Name of the crew's captain.
    pub captain_name: String,
}

/// A persistent player-controlled crew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crew {
    /// Crew id.
    pub id: CrewId,
    /// Role slots; the captain is always filled.
    pub members: RoleSlots,
    /// Spendable credits.
    pub credits: u64,
    /// Authoritative location.
    pub location: Location,
    /// Capability token for `returnToCrew`. Never serialized with
    /// public state; the snapshot pairs it explicitly.
    #[serde(skip)]
    pub(crate) key: SecretKey,
}

impl Crew {
    /// Create a new crew with the given captain, aboard `ship`.
    #[must_use]
    pub fn new(id: CrewId, captain: CrewMember, ship: ShipId, key: SecretKey) -> Self {
        Self {
            id,
            members: RoleSlots::with_captain(captain),
            credits: STARTING_CREDITS,
            location: Location::OnShip(ship),
            key,
        }
    }

    /// Public identifying summary.
    #[must_use]
    pub fn info(&self) -> CrewInfo {
        CrewInfo {
            id: self.id,
            captain_name: self.members.captain.name.clone(),
        }
    }

    /// Check a presented key against the crew's secret key.
    #[must_use]
    pub fn key_matches(&self, presented: &str) -> bool {
        self.key.matches(presented)
    }
}

/// All crews, keyed by id. Crews are never deleted.
#[derive(Debug, Clone, Default)]
pub struct CrewRegistry {
    crews: HashMap<CrewId, Crew>,
}

impl CrewRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a crew.
    pub fn insert(&mut self, crew: Crew) {
        self.crews.insert(crew.id, crew);
    }

    /// Look up a crew by id.
    #[must_use]
    pub fn get(&self, id: CrewId) -> Option<&Crew> {
        self.crews.get(&id)
    }

    /// Look up a crew mutably by id.
    pub fn get_mut(&mut self, id: CrewId) -> Option<&mut Crew> {
        self.crews.get_mut(&id)
    }

    /// Number of registered crews.
    #[must_use]
    pub fn len(&self) -> usize {
        self.crews.len()
    }

    /// Whether no crews are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crews.is_empty()
    }

    /// Iterate over all crews (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = &Crew> {
        self.crews.values()
    }

    /// Sorted crew ids, for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<CrewId> {
        let mut ids: Vec<_> = self.crews.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn captain(name: &str) -> CrewMember {
        CrewMember {
            id: MemberId(9),
            name: name.to_string(),
            role: Role::Captain,
        }
    }

    #[test]
    fn test_new_crew_defaults() {
        let mut rng = StdRng::seed_from_u64(1);
        let key = SecretKey::generate(&mut rng);
        let crew = Crew::new(CrewId(1), captain("Mal"), ShipId(2), key);

        assert_eq!(crew.credits, STARTING_CREDITS);
        assert_eq!(crew.location, Location::OnShip(ShipId(2)));
        assert!(crew.members.pilot.is_none());
        assert_eq!(crew.info().captain_name, "Mal");
    }

    #[test]
    fn test_location_ship_accessor() {
        assert_eq!(Location::OnShip(ShipId(4)).ship(), Some(ShipId(4)));
        assert_eq!(Location::AtSpaceport(PlanetId(4)).ship(), None);
        assert_eq!(Location::OnPlanet(PlanetId(4)).ship(), None);
    }

    #[test]
    fn test_serialized_crew_omits_key() {
        let mut rng = StdRng::seed_from_u64(1);
        let key = SecretKey::generate(&mut rng);
        let secret = key.expose().to_string();
        let crew = Crew::new(CrewId(1), captain("Mal"), ShipId(2), key);

        let json = serde_json::to_string(&crew).unwrap();
        assert!(!json.contains(&secret));
    }

    #[test]
    fn test_registry_sorted_ids() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut registry = CrewRegistry::new();
        for id in [3, 1, 2] {
            let key = SecretKey::generate(&mut rng);
            registry.insert(Crew::new(CrewId(id), captain("A"), ShipId(id), key));
        }
        assert_eq!(
            registry.sorted_ids(),
            vec![CrewId(1), CrewId(2), CrewId(3)]
        );
    }
}
