//! Broadcast rooms and the session subscription registry.
//!
//! A room is a broadcast scope derived from entity identity: one per ship,
//! one per planet, one per planet spaceport. Sessions are joined to the
//! rooms implied by their crew's location, and that membership is
//! recomputed in the same transition that moves the crew, never after.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::crew::CrewInfo;
use crate::identity::{CrewId, PlanetId, SessionId, ShipId};
use crate::position::Position;
use crate::ship::{ScannedObject, ShipInfo};

/// A broadcast scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    /// Everyone aboard a ship.
    Ship(ShipId),
    /// Everyone at a planet: landed ships' crews and surface visitors.
    Planet(PlanetId),
    /// Everyone at a planet's spaceport.
    Spaceport(PlanetId),
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ship(id) => write!(f, "ship:{id}"),
            Self::Planet(id) => write!(f, "planet:{id}"),
            Self::Spaceport(id) => write!(f, "planet:{id}:spaceport"),
        }
    }
}

/// A server-to-client push event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum Event {
    /// A ship's course finished at its target.
    CourseReached,
    /// A ship moved one step.
    ShipPosition(Position),
    /// A scan completed with these results.
    ScannerResults(Vec<ScannedObject>),
    /// A ship landed at the spaceport.
    AddShip(ShipInfo),
    /// A ship took off from the spaceport.
    RemoveShip(ShipId),
    /// A crew disembarked into the spaceport.
    AddCrew(CrewInfo),
    /// A crew left the spaceport (boarded a ship).
    RemoveCrew(CrewId),
    /// A crew shouted in the room.
    Shout {
        /// Shouting crew.
        crew: CrewInfo,
        /// Message text.
        message: String,
    },
}

/// An event scoped to one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    /// Target room.
    pub room: Room,
    /// The event to deliver to every member.
    pub event: Event,
}

impl Broadcast {
    /// Create a broadcast.
    #[must_use]
    pub const fn new(room: Room, event: Event) -> Self {
        Self { room, event }
    }
}

/// Which sessions are subscribed to which rooms.
///
/// Kept bidirectional so both fan-out (room to sessions) and teardown
/// (session to rooms) are cheap.
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    members: HashMap<Room, HashSet<SessionId>>,
    joined: HashMap<SessionId, HashSet<Room>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a session to a room.
    pub fn join(&mut self, session: SessionId, room: Room) {
        self.members.entry(room).or_default().insert(session);
        self.joined.entry(session).or_default().insert(room);
    }

    /// Remove a session from a room. Empty rooms are pruned.
    pub fn leave(&mut self, session: SessionId, room: Room) {
        if let Some(members) = self.members.get_mut(&room) {
            members.remove(&session);
            if members.is_empty() {
                self.members.remove(&room);
            }
        }
        if let Some(rooms) = self.joined.get_mut(&session) {
            rooms.remove(&room);
            if rooms.is_empty() {
                self.joined.remove(&session);
            }
        }
    }

    /// Replace a session's memberships with `rooms`, joining and leaving
    /// only the difference.
    pub fn set_rooms(&mut self, session: SessionId, rooms: HashSet<Room>) {
        let current = self.joined.get(&session).cloned().unwrap_or_default();
        for room in current.difference(&rooms) {
            let room = *room;
            if let Some(members) = self.members.get_mut(&room) {
                members.remove(&session);
                if members.is_empty() {
                    self.members.remove(&room);
                }
            }
        }
        for room in &rooms {
            self.members.entry(*room).or_default().insert(session);
        }
        if rooms.is_empty() {
            self.joined.remove(&session);
        } else {
            self.joined.insert(session, rooms);
        }
    }

    /// Drop a session from every room (disconnect).
    pub fn leave_all(&mut self, session: SessionId) {
        self.set_rooms(session, HashSet::new());
    }

    /// Sessions currently in a room, in ascending id order.
    #[must_use]
    pub fn members(&self, room: Room) -> Vec<SessionId> {
        let mut members: Vec<_> = self
            .members
            .get(&room)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        members.sort_unstable();
        members
    }

    /// Rooms a session is currently in.
    #[must_use]
    pub fn rooms(&self, session: SessionId) -> HashSet<Room> {
        self.joined.get(&session).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_wire_names() {
        assert_eq!(Room::Ship(ShipId(4)).to_string(), "ship:4");
        assert_eq!(Room::Planet(PlanetId(7)).to_string(), "planet:7");
        assert_eq!(
            Room::Spaceport(PlanetId(7)).to_string(),
            "planet:7:spaceport"
        );
    }

    #[test]
    fn test_join_and_leave() {
        let mut rooms = RoomRegistry::new();
        let room = Room::Ship(ShipId(1));

        rooms.join(SessionId(10), room);
        rooms.join(SessionId(11), room);
        assert_eq!(rooms.members(room), vec![SessionId(10), SessionId(11)]);

        rooms.leave(SessionId(10), room);
        assert_eq!(rooms.members(room), vec![SessionId(11)]);
        assert!(rooms.rooms(SessionId(10)).is_empty());
    }

    #[test]
    fn test_set_rooms_applies_difference() {
        let mut rooms = RoomRegistry::new();
        let session = SessionId(1);
        let ship = Room::Ship(ShipId(1));
        let planet = Room::Planet(PlanetId(2));
        let port = Room::Spaceport(PlanetId(2));

        rooms.set_rooms(session, HashSet::from([ship]));
        rooms.set_rooms(session, HashSet::from([planet, port]));

        assert!(rooms.members(ship).is_empty());
        assert_eq!(rooms.members(planet), vec![session]);
        assert_eq!(rooms.members(port), vec![session]);
        assert_eq!(rooms.rooms(session), HashSet::from([planet, port]));
    }

    #[test]
    fn test_leave_all() {
        let mut rooms = RoomRegistry::new();
        let session = SessionId(1);
        rooms.join(session, Room::Ship(ShipId(1)));
        rooms.join(session, Room::Planet(PlanetId(2)));

        rooms.leave_all(session);
        assert!(rooms.rooms(session).is_empty());
        assert!(rooms.members(Room::Ship(ShipId(1))).is_empty());
    }

    #[test]
    fn test_event_wire_shape() {
        let event = Event::ShipPosition(Position::new(1, 2, 3));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "shipPosition");
        assert_eq!(json["data"]["x"], 1);

        let event = Event::CourseReached;
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "courseReached");
    }
}
