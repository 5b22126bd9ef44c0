//! End-to-end scenarios across the command surface, the tick, and the
//! snapshot boundary.

use cluster_core::command::{Command, Reply};
use cluster_core::crew::Location;
use cluster_core::error::CommandError;
use cluster_core::position::Position;
use cluster_core::room::{Event, Room};
use cluster_core::world::World;
use cluster_test_utils::fixtures::{generated_world, planet_under_ship, pos, spawn_crew};
use cluster_test_utils::proptest::prelude::*;

#[test]
fn full_port_call_round_trip() {
    let mut world = generated_world();
    let mut crew = spawn_crew(&mut world, 1, "Serenity");
    let planet_id = planet_under_ship(&mut world, crew.ship_id);

    // Land, disembark, reboard, take off.
    world
        .execute(&mut crew.session, Command::LandShip)
        .expect("land");
    world
        .execute(&mut crew.session, Command::LeaveShip)
        .expect("disembark");
    assert_eq!(
        world.crews().get(crew.crew_id).unwrap().location,
        Location::AtSpaceport(planet_id)
    );

    world
        .execute(
            &mut crew.session,
            Command::EnterShip {
                ship_id: crew.ship_id,
                key: crew.ship_key.clone(),
            },
        )
        .expect("reboard");
    world
        .execute(&mut crew.session, Command::TakeOffShip)
        .expect("take off");

    let ship = world.ships().get(crew.ship_id).unwrap();
    assert!(ship.planet.is_none());
    assert_eq!(ship.crew(), Some(crew.crew_id));
    assert!(world
        .spaceports()
        .get(planet_id)
        .unwrap()
        .ships()
        .is_empty());
}

#[test]
fn landed_ship_refuses_course() {
    let mut world = generated_world();
    let mut crew = spawn_crew(&mut world, 1, "Serenity");
    planet_under_ship(&mut world, crew.ship_id);
    world
        .execute(&mut crew.session, Command::LandShip)
        .expect("land");

    let err = world
        .execute(
            &mut crew.session,
            Command::SetShipCourse {
                target: pos(0, 0, 0),
            },
        )
        .unwrap_err();
    assert_eq!(err, CommandError::ShipOnPlanet);
}

#[test]
fn two_crews_share_a_spaceport() {
    let mut world = generated_world();
    let mut first = spawn_crew(&mut world, 1, "Alpha");
    let mut second = spawn_crew(&mut world, 2, "Beta");
    let planet_id = planet_under_ship(&mut world, first.ship_id);

    world
        .execute(&mut first.session, Command::LandShip)
        .expect("first lands");

    // Walk the second ship over and land it too.
    let target = world.planets().get(planet_id).unwrap().position;
    world
        .execute(&mut second.session, Command::SetShipCourse { target })
        .expect("course");
    while world.ships().get(second.ship_id).unwrap().course.is_some() {
        world.tick();
    }
    world
        .execute(&mut second.session, Command::LandShip)
        .expect("second lands");

    let port = world.spaceports().get(planet_id).unwrap();
    assert_eq!(port.ships().len(), 2);

    // A shout at the spaceport reaches both sessions (both crews are on
    // landed ships, so both are subscribed to the spaceport room).
    let (_, broadcasts) = world
        .execute(&mut first.session, Command::LeaveShip)
        .expect("disembark");
    let room = broadcasts[0].room;
    assert_eq!(room, Room::Spaceport(planet_id));
    let members = world.room_members(room);
    assert!(members.contains(&first.session.id));
    assert!(members.contains(&second.session.id));
}

#[test]
fn snapshot_round_trip_mid_flight() {
    let mut world = generated_world();
    let mut crew = spawn_crew(&mut world, 1, "Serenity");
    world
        .execute(
            &mut crew.session,
            Command::SetShipCourse {
                target: pos(120, -60, 5),
            },
        )
        .expect("course");
    world
        .execute(&mut crew.session, Command::UseShipScanner)
        .expect("scan");
    world.tick();
    world.tick();

    let snapshot = world.snapshot();
    let mut restored = World::restore(&snapshot, 7).expect("restore");
    assert_eq!(restored.snapshot(), snapshot);

    // The restored world keeps ticking from where the saved one stopped.
    let before = restored.ships().get(crew.ship_id).unwrap().position;
    restored.tick();
    let after = restored.ships().get(crew.ship_id).unwrap().position;
    assert!((after.distance(pos(120, -60, 5))) < before.distance(pos(120, -60, 5)));
}

#[test]
fn returning_crew_resumes_broadcast_rooms() {
    let mut world = generated_world();
    let mut crew = spawn_crew(&mut world, 1, "Serenity");
    let planet_id = planet_under_ship(&mut world, crew.ship_id);
    world
        .execute(&mut crew.session, Command::LandShip)
        .expect("land");

    // The session disconnects; the crew's world presence persists.
    world.disconnect(crew.session.id);
    assert!(world.room_members(Room::Ship(crew.ship_id)).is_empty());
    assert!(world.ships().get(crew.ship_id).unwrap().landed());

    // A new session returns with the key and hears the same rooms again.
    let mut returned = cluster_core::command::Session::new(
        cluster_core::identity::SessionId(9),
    );
    let (reply, _) = world
        .execute(
            &mut returned,
            Command::ReturnToCrew {
                crew_id: crew.crew_id,
                key: crew.crew_key.clone(),
            },
        )
        .expect("return");
    match reply {
        Reply::CrewResumed { planet, spaceport, .. } => {
            assert_eq!(planet.map(|p| p.id), Some(planet_id));
            assert!(spaceport.is_some());
        }
        other => panic!("unexpected reply {other:?}"),
    }
    assert_eq!(
        world.room_members(Room::Spaceport(planet_id)),
        vec![returned.id]
    );
}

#[test]
fn scan_events_stay_on_the_ship_room() {
    let mut world = generated_world();
    let mut crew = spawn_crew(&mut world, 1, "Serenity");
    world
        .execute(&mut crew.session, Command::UseShipScanner)
        .expect("scan");

    let mut rooms_seen = Vec::new();
    for _ in 0..5 {
        for broadcast in world.tick() {
            if matches!(broadcast.event, Event::ScannerResults(_)) {
                rooms_seen.push(broadcast.room);
            }
        }
    }
    assert_eq!(rooms_seen, vec![Room::Ship(crew.ship_id)]);
}

proptest! {
    /// Stepping toward a target strictly shrinks the remaining distance,
    /// and a course always arrives within the manhattan distance.
    #[test]
    fn course_stepping_converges(
        sx in -60i64..60, sy in -60i64..60, sz in -60i64..60,
        tx in -60i64..60, ty in -60i64..60, tz in -60i64..60,
    ) {
        let target = Position::new(tx, ty, tz);
        let mut here = Position::new(sx, sy, sz);
        let manhattan = (sx - tx).abs() + (sy - ty).abs() + (sz - tz).abs();

        let mut steps = 0i64;
        while here != target {
            let next = here.step_towards(target);
            prop_assert!(next.distance(target) < here.distance(target));
            here = next;
            steps += 1;
            prop_assert!(steps <= manhattan);
        }
        prop_assert_eq!(steps, manhattan);
    }
}
