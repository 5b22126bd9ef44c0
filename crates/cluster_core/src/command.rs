//! Command dispatch: validation, transitions, and replies.
//!
//! Every command is applied atomically: guards run first in a fixed order
//! and short-circuit on the first failure, then all mutations (registries,
//! rosters, room memberships) happen together, then the reply and the
//! side-broadcasts are returned. A command either fully happens or leaves
//! the world untouched.

use serde::{Deserialize, Serialize};

use crate::crew::{Crew, CrewMember, Location, Role};
use crate::error::{CommandError, CommandResult};
use crate::identity::{is_valid_name, CrewId, MemberId, SecretKey, SessionId, ShipId};
use crate::planet::Planet;
use crate::position::Position;
use crate::room::{Broadcast, Event, Room};
use crate::ship::{Course, Ship};
use crate::spaceport::SpaceportView;
use crate::upgrades::{BASE_TIER, SCANNER_DURATION};
use crate::world::World;

/// Longest accepted shout, in characters.
pub const MAX_SHOUT_LEN: usize = 300;

/// One connected client's control state.
///
/// A session starts unbound; `createCrew` or `returnToCrew` binds it to a
/// crew, which unlocks the ship and spaceport commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Transport-assigned session id.
    pub id: SessionId,
    /// The crew this session controls, once bound.
    pub crew: Option<CrewId>,
}

impl Session {
    /// Create an unbound session.
    #[must_use]
    pub const fn new(id: SessionId) -> Self {
        Self { id, crew: None }
    }
}

/// A client command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Found a new crew aboard a new ship.
    CreateCrew {
        /// Name for the new ship.
        ship_name: String,
        /// Name for the founding captain.
        captain_name: String,
    },
    /// Resume control of an existing crew.
    ReturnToCrew {
        /// Crew to resume.
        crew_id: CrewId,
        /// The crew's secret key.
        key: String,
    },
    /// Start a scanner sweep.
    UseShipScanner,
    /// Set (or replace) the ship's course.
    SetShipCourse {
        /// Target lattice point; deliberately unbounded.
        target: Position,
    },
    /// Land on the planet directly beneath the ship.
    LandShip,
    /// Take off from the current planet.
    TakeOffShip,
    /// Board a ship landed at this spaceport.
    EnterShip {
        /// Ship to board.
        ship_id: ShipId,
        /// The ship's secret key.
        key: String,
    },
    /// Disembark into the spaceport.
    LeaveShip,
    /// Broadcast a message to the crew's current room.
    Shout {
        /// Message text, 1 to 300 characters.
        message: String,
    },
}

/// A successful command's payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Reply {
    /// `createCrew`: the new crew and ship, with their capability keys.
    /// The only time either key crosses the wire.
    CrewCreated {
        /// The new crew.
        crew: Crew,
        /// The new ship.
        ship: Ship,
        /// Key for future `returnToCrew` calls.
        crew_key: SecretKey,
        /// Key for future `enterShip` calls.
        ship_key: SecretKey,
    },
    /// `returnToCrew`: the crew's current surroundings.
    CrewResumed {
        /// The resumed crew.
        crew: Crew,
        /// The ship the crew is aboard, if any.
        ship: Option<Ship>,
        /// The planet the crew is at (aboard a landed ship, at its
        /// spaceport, or on its surface), if any.
        planet: Option<Planet>,
        /// The spaceport, when the crew can see it.
        spaceport: Option<SpaceportView>,
    },
    /// `landShip`: where the ship landed.
    Landed {
        /// The planet landed on.
        planet: Planet,
        /// Its spaceport, rosters included.
        spaceport: SpaceportView,
    },
    /// `enterShip`: the ship boarded.
    Boarded {
        /// The boarded ship.
        ship: Ship,
    },
    /// Plain acknowledgement.
    Ack,
}

/// A reply plus the broadcasts the shell must deliver.
pub type Outcome = (Reply, Vec<Broadcast>);

impl World {
    /// Validate and apply one command for `session`.
    ///
    /// Returns the reply and any room-scoped side-broadcasts, or a domain
    /// error token. Exactly one of the two, exactly once: the callback
    /// discipline of a wire protocol, enforced by the type.
    pub fn execute(&mut self, session: &mut Session, command: Command) -> CommandResult<Outcome> {
        match command {
            Command::CreateCrew {
                ship_name,
                captain_name,
            } => self.create_crew(session, &ship_name, &captain_name),
            Command::ReturnToCrew { crew_id, key } => self.return_to_crew(session, crew_id, &key),
            Command::UseShipScanner => self.use_ship_scanner(session),
            Command::SetShipCourse { target } => self.set_ship_course(session, target),
            Command::LandShip => self.land_ship(session),
            Command::TakeOffShip => self.take_off_ship(session),
            Command::EnterShip { ship_id, key } => self.enter_ship(session, ship_id, &key),
            Command::LeaveShip => self.leave_ship(session),
            Command::Shout { message } => self.shout(session, &message),
        }
    }

    /// The crew a session controls, or `notInCrew`.
    fn bound_crew(&self, session: &Session) -> CommandResult<CrewId> {
        session.crew.ok_or(CommandError::NotInCrew)
    }

    /// The ship the bound crew is aboard, or `notOnShip`.
    fn boarded_ship(&self, crew_id: CrewId) -> CommandResult<ShipId> {
        self.crews
            .get(crew_id)
            .and_then(|crew| crew.location.ship())
            .ok_or(CommandError::NotOnShip)
    }

    /// Recompute a session's room memberships from its crew's location.
    fn resync_rooms(&mut self, session: &Session) {
        let rooms = match session.crew.and_then(|id| self.crews.get(id)) {
            Some(crew) => self.rooms_for_location(crew.location),
            None => std::collections::HashSet::new(),
        };
        self.rooms.set_rooms(session.id, rooms);
    }

    fn create_crew(
        &mut self,
        session: &mut Session,
        ship_name: &str,
        captain_name: &str,
    ) -> CommandResult<Outcome> {
        if !is_valid_name(ship_name) {
            return Err(CommandError::InvalidCrewName);
        }
        if !is_valid_name(captain_name) {
            return Err(CommandError::InvalidCaptainName);
        }

        let ship_id = ShipId(self.alloc.allocate());
        let crew_id = CrewId(self.alloc.allocate());
        let member_id = MemberId(self.alloc.allocate());
        let position = Position::random(&mut self.rng);
        let ship_key = self.generate_key();
        let crew_key = self.generate_key();

        let captain = CrewMember {
            id: member_id,
            name: captain_name.to_string(),
            role: Role::Captain,
        };
        let mut ship = Ship::new(ship_id, ship_name.to_string(), position, ship_key.clone());
        ship.crew = Some(crew_id);
        let crew = Crew::new(crew_id, captain, ship_id, crew_key.clone());

        let reply = Reply::CrewCreated {
            crew: crew.clone(),
            ship: ship.clone(),
            crew_key,
            ship_key,
        };

        self.ships.insert(ship);
        self.crews.insert(crew);
        session.crew = Some(crew_id);
        self.resync_rooms(session);

        tracing::info!(
            captain = captain_name,
            ship = ship_name,
            %crew_id,
            "captain started a crew"
        );

        Ok((reply, Vec::new()))
    }

    fn return_to_crew(
        &mut self,
        session: &mut Session,
        crew_id: CrewId,
        key: &str,
    ) -> CommandResult<Outcome> {
        let crew = self.crews.get(crew_id).ok_or(CommandError::NoSuchCrew)?;
        if !crew.key_matches(key) {
            return Err(CommandError::InvalidKey);
        }

        let crew = crew.clone();
        let ship = crew
            .location
            .ship()
            .and_then(|id| self.ships.get(id))
            .cloned();

        let planet_id = match crew.location {
            Location::OnShip(_) => ship.as_ref().and_then(|s| s.planet),
            Location::OnPlanet(planet) | Location::AtSpaceport(planet) => Some(planet),
        };
        let planet = planet_id.and_then(|id| self.planets.get(id)).cloned();
        let spaceport = match crew.location {
            Location::OnPlanet(_) => None,
            _ => planet_id.and_then(|id| self.spaceport_view(id)),
        };

        session.crew = Some(crew_id);
        self.resync_rooms(session);

        tracing::info!(captain = %crew.members.captain.name, %crew_id, "returned to crew");

        Ok((
            Reply::CrewResumed {
                crew,
                ship,
                planet,
                spaceport,
            },
            Vec::new(),
        ))
    }

    fn use_ship_scanner(&mut self, session: &Session) -> CommandResult<Outcome> {
        let crew_id = self.bound_crew(session)?;
        let ship_id = self.boarded_ship(crew_id)?;
        let ship = self.ships.get_mut(ship_id).ok_or(CommandError::NotOnShip)?;

        if ship.scanner.in_progress() {
            return Err(CommandError::ScanInProgress);
        }
        ship.scanner.timer = Some(SCANNER_DURATION[BASE_TIER]);

        Ok((Reply::Ack, Vec::new()))
    }

    fn set_ship_course(&mut self, session: &Session, target: Position) -> CommandResult<Outcome> {
        let crew_id = self.bound_crew(session)?;
        let ship_id = self.boarded_ship(crew_id)?;
        let ship = self.ships.get_mut(ship_id).ok_or(CommandError::NotOnShip)?;

        if ship.landed() {
            return Err(CommandError::ShipOnPlanet);
        }
        ship.course = Some(Course { target });

        tracing::debug!(%ship_id, %target, "course set");

        Ok((Reply::Ack, Vec::new()))
    }

    fn land_ship(&mut self, session: &Session) -> CommandResult<Outcome> {
        let crew_id = self.bound_crew(session)?;
        let ship_id = self.boarded_ship(crew_id)?;
        let ship = self.ships.get(ship_id).ok_or(CommandError::NotOnShip)?;

        if ship.course.is_some() {
            return Err(CommandError::ShipCourseInProgress);
        }
        if ship.landed() {
            return Err(CommandError::ShipOnPlanet);
        }
        let planet = self
            .planets
            .at_position(ship.position)
            .ok_or(CommandError::ShipNotAbovePlanet)?
            .clone();

        let ship_info = ship.info();
        if let Some(ship) = self.ships.get_mut(ship_id) {
            ship.planet = Some(planet.id);
        }
        if let Some(port) = self.spaceports.get_mut(planet.id) {
            port.add_ship(ship_id);
        }
        self.resync_rooms(session);

        let broadcasts = vec![Broadcast::new(
            Room::Spaceport(planet.id),
            Event::AddShip(ship_info),
        )];

        let spaceport = self
            .spaceport_view(planet.id)
            .ok_or(CommandError::ShipNotAbovePlanet)?;

        tracing::info!(%ship_id, planet = %planet.name, "landed");

        Ok((Reply::Landed { planet, spaceport }, broadcasts))
    }

    fn take_off_ship(&mut self, session: &Session) -> CommandResult<Outcome> {
        let crew_id = self.bound_crew(session)?;
        let ship_id = self.boarded_ship(crew_id)?;
        let ship = self.ships.get(ship_id).ok_or(CommandError::NotOnShip)?;
        let planet_id = ship.planet.ok_or(CommandError::ShipNotOnPlanet)?;

        if let Some(port) = self.spaceports.get_mut(planet_id) {
            port.remove_ship(ship_id);
        }
        if let Some(ship) = self.ships.get_mut(ship_id) {
            ship.planet = None;
        }
        self.resync_rooms(session);

        tracing::info!(%ship_id, %planet_id, "took off");

        Ok((
            Reply::Ack,
            vec![Broadcast::new(
                Room::Spaceport(planet_id),
                Event::RemoveShip(ship_id),
            )],
        ))
    }

    fn enter_ship(
        &mut self,
        session: &Session,
        ship_id: ShipId,
        key: &str,
    ) -> CommandResult<Outcome> {
        let crew_id = self.bound_crew(session)?;
        let crew = self.crews.get(crew_id).ok_or(CommandError::NotInCrew)?;

        if matches!(crew.location, Location::OnShip(_)) {
            return Err(CommandError::AlreadyOnShip);
        }
        let Location::AtSpaceport(planet_id) = crew.location else {
            return Err(CommandError::NotAtSpaceport);
        };

        let ship = self.ships.get(ship_id).ok_or(CommandError::NoSuchShip)?;
        if ship.planet != Some(planet_id) {
            return Err(CommandError::ShipNotOnPlanet);
        }
        if ship.crew().is_some() {
            return Err(CommandError::ShipFull);
        }
        if !ship.key_matches(key) {
            return Err(CommandError::InvalidKey);
        }

        let ship_clone = ship.clone();

        if let Some(ship) = self.ships.get_mut(ship_id) {
            ship.crew = Some(crew_id);
        }
        if let Some(crew) = self.crews.get_mut(crew_id) {
            crew.location = Location::OnShip(ship_id);
        }
        if let Some(port) = self.spaceports.get_mut(planet_id) {
            port.remove_crew(crew_id);
        }
        self.resync_rooms(session);

        tracing::info!(%crew_id, %ship_id, "boarded ship");

        Ok((
            Reply::Boarded { ship: ship_clone },
            vec![Broadcast::new(
                Room::Spaceport(planet_id),
                Event::RemoveCrew(crew_id),
            )],
        ))
    }

    fn leave_ship(&mut self, session: &Session) -> CommandResult<Outcome> {
        let crew_id = self.bound_crew(session)?;
        let ship_id = self.boarded_ship(crew_id)?;
        let ship = self.ships.get(ship_id).ok_or(CommandError::NotOnShip)?;
        let planet_id = ship.planet.ok_or(CommandError::ShipNotOnPlanet)?;

        if let Some(ship) = self.ships.get_mut(ship_id) {
            ship.crew = None;
        }
        let crew_info = match self.crews.get_mut(crew_id) {
            Some(crew) => {
                crew.location = Location::AtSpaceport(planet_id);
                crew.info()
            }
            None => return Err(CommandError::NotInCrew),
        };
        if let Some(port) = self.spaceports.get_mut(planet_id) {
            port.add_crew(crew_id);
        }
        self.resync_rooms(session);

        tracing::info!(%crew_id, %ship_id, "disembarked");

        Ok((
            Reply::Ack,
            vec![Broadcast::new(
                Room::Spaceport(planet_id),
                Event::AddCrew(crew_info),
            )],
        ))
    }

    fn shout(&mut self, session: &Session, message: &str) -> CommandResult<Outcome> {
        let len = message.chars().count();
        if len == 0 || len > MAX_SHOUT_LEN {
            return Err(CommandError::InvalidMessage);
        }

        let crew_id = self.bound_crew(session)?;
        let crew = self.crews.get(crew_id).ok_or(CommandError::NotInCrew)?;

        let room = match crew.location {
            Location::OnShip(ship_id) => Room::Ship(ship_id),
            Location::OnPlanet(planet_id) => Room::Planet(planet_id),
            Location::AtSpaceport(planet_id) => Room::Spaceport(planet_id),
        };

        tracing::debug!(%crew_id, room = %room, "shout");

        Ok((
            Reply::Ack,
            vec![Broadcast::new(
                room,
                Event::Shout {
                    crew: crew.info(),
                    message: message.to_string(),
                },
            )],
        ))
    }
}
