//! The simulation task: single writer for the world.
//!
//! All world mutation funnels through one tokio task. Client commands
//! arrive as request envelopes on an mpsc queue; the tick and the periodic
//! save are interval arms on the same `select!`. One arm runs to
//! completion before the next, so command application, tick passes, and
//! snapshot capture never interleave.

use std::collections::HashMap;

use cluster_core::command::{Command, Reply, Session};
use cluster_core::error::CommandResult;
use cluster_core::identity::SessionId;
use cluster_core::room::{Broadcast, Event};
use cluster_core::world::World;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::{storage, ServerConfig};

/// Requests the simulation task accepts.
#[derive(Debug)]
pub enum SimRequest {
    /// Register a new session and its event channel.
    Connect {
        /// Where to deliver this session's room broadcasts.
        events: mpsc::UnboundedSender<Event>,
        /// Receives the assigned session id.
        reply: oneshot::Sender<SessionId>,
    },
    /// Drop a session. Its crew's world presence persists.
    Disconnect {
        /// The session to drop.
        session: SessionId,
    },
    /// Apply one command for a session.
    Command {
        /// The issuing session.
        session: SessionId,
        /// The command to apply.
        command: Command,
        /// Receives the reply or the domain error token.
        reply: oneshot::Sender<CommandResult<Reply>>,
    },
    /// Save and stop the simulation.
    Shutdown {
        /// Signalled once the final save has completed.
        done: oneshot::Sender<()>,
    },
}

/// The simulation task has stopped and can take no more requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("simulation task stopped")]
pub struct SimStopped;

/// Cheap cloneable handle for talking to the simulation task.
#[derive(Debug, Clone)]
pub struct SimHandle {
    tx: mpsc::Sender<SimRequest>,
}

impl SimHandle {
    /// Register a new session; returns its id and its event stream.
    pub async fn connect(
        &self,
    ) -> Result<(SessionId, mpsc::UnboundedReceiver<Event>), SimStopped> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SimRequest::Connect {
                events: events_tx,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SimStopped)?;
        let session = reply_rx.await.map_err(|_| SimStopped)?;
        Ok((session, events_rx))
    }

    /// Apply one command for a session.
    ///
    /// The outer error means the simulation is gone; the inner result is
    /// the command's own reply-or-token.
    pub async fn command(
        &self,
        session: SessionId,
        command: Command,
    ) -> Result<CommandResult<Reply>, SimStopped> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SimRequest::Command {
                session,
                command,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SimStopped)?;
        reply_rx.await.map_err(|_| SimStopped)
    }

    /// Drop a session.
    pub async fn disconnect(&self, session: SessionId) -> Result<(), SimStopped> {
        self.tx
            .send(SimRequest::Disconnect { session })
            .await
            .map_err(|_| SimStopped)
    }

    /// Save the world and stop the simulation task.
    pub async fn shutdown(&self) -> Result<(), SimStopped> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(SimRequest::Shutdown { done: done_tx })
            .await
            .map_err(|_| SimStopped)?;
        done_rx.await.map_err(|_| SimStopped)
    }
}

/// A connected session as the simulation task sees it.
struct SessionEntry {
    session: Session,
    events: mpsc::UnboundedSender<Event>,
}

/// Spawn the simulation task over `world`.
pub fn spawn(world: World, config: ServerConfig) -> (SimHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(64);
    let task = tokio::spawn(run(world, config, rx));
    (SimHandle { tx }, task)
}

async fn run(mut world: World, config: ServerConfig, mut rx: mpsc::Receiver<SimRequest>) {
    let mut sessions: HashMap<SessionId, SessionEntry> = HashMap::new();
    let mut next_session: u64 = 1;

    let start = Instant::now();
    let mut tick = interval_at(start + config.tick_interval, config.tick_interval);
    let mut save = interval_at(start + config.save_interval, config.save_interval);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let broadcasts = world.tick();
                deliver(&world, &sessions, &broadcasts);
            }
            _ = save.tick() => {
                save_world(&world, &config);
            }
            request = rx.recv() => match request {
                None => {
                    save_world(&world, &config);
                    return;
                }
                Some(SimRequest::Connect { events, reply }) => {
                    let id = SessionId(next_session);
                    next_session += 1;
                    sessions.insert(
                        id,
                        SessionEntry {
                            session: Session::new(id),
                            events,
                        },
                    );
                    tracing::info!(session = %id, "session connected");
                    let _ = reply.send(id);
                }
                Some(SimRequest::Disconnect { session }) => {
                    if sessions.remove(&session).is_some() {
                        world.disconnect(session);
                        tracing::info!(session = %session, "session disconnected");
                    }
                }
                Some(SimRequest::Command { session, command, reply }) => {
                    let Some(entry) = sessions.get_mut(&session) else {
                        tracing::warn!(session = %session, "command from unknown session dropped");
                        continue;
                    };
                    match world.execute(&mut entry.session, command) {
                        Ok((result, broadcasts)) => {
                            let _ = reply.send(Ok(result));
                            deliver(&world, &sessions, &broadcasts);
                        }
                        Err(token) => {
                            let _ = reply.send(Err(token));
                        }
                    }
                }
                Some(SimRequest::Shutdown { done }) => {
                    save_world(&world, &config);
                    let _ = done.send(());
                    tracing::info!("simulation stopped");
                    return;
                }
            }
        }
    }
}

/// Fan a batch of broadcasts out to every member of each target room.
fn deliver(
    world: &World,
    sessions: &HashMap<SessionId, SessionEntry>,
    broadcasts: &[Broadcast],
) {
    for broadcast in broadcasts {
        for member in world.room_members(broadcast.room) {
            if let Some(entry) = sessions.get(&member) {
                // A full/closed channel means the session is on its way
                // out; the Disconnect request will clean it up.
                let _ = entry.events.send(broadcast.event.clone());
            }
        }
    }
}

fn save_world(world: &World, config: &ServerConfig) {
    if let Err(err) = storage::save(world, &config.save_path) {
        tracing::error!(error = %err, path = %config.save_path.display(), "save failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_core::error::CommandError;
    use cluster_core::position::Position;
    use std::time::Duration;

    fn test_config(dir: &tempfile::TempDir) -> ServerConfig {
        ServerConfig {
            tick_interval: Duration::from_secs(1),
            save_interval: Duration::from_secs(60),
            save_path: dir.path().join("cluster.json"),
        }
    }

    async fn create_crew(handle: &SimHandle, session: SessionId) -> Reply {
        handle
            .command(
                session,
                Command::CreateCrew {
                    ship_name: "Serenity".into(),
                    captain_name: "Mal".into(),
                },
            )
            .await
            .expect("sim alive")
            .expect("createCrew ok")
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_and_ticks_flow_through_the_sim() {
        let dir = tempfile::tempdir().unwrap();
        let (handle, task) = spawn(World::generate(3), test_config(&dir));

        let (session, mut events) = handle.connect().await.unwrap();
        create_crew(&handle, session).await;

        handle
            .command(
                session,
                Command::SetShipCourse {
                    target: Position::new(500, 500, 500),
                },
            )
            .await
            .unwrap()
            .unwrap();

        // The paused clock auto-advances; the next tick pushes a move.
        match events.recv().await {
            Some(Event::ShipPosition(_)) => {}
            other => panic!("expected a position push, got {other:?}"),
        }

        handle.shutdown().await.unwrap();
        task.await.unwrap();
        assert!(dir.path().join("cluster.json").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_domain_errors_come_back_as_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let (handle, task) = spawn(World::generate(3), test_config(&dir));

        let (session, _events) = handle.connect().await.unwrap();
        let result = handle
            .command(session, Command::UseShipScanner)
            .await
            .expect("sim alive");
        assert_eq!(result, Err(CommandError::NotInCrew));

        create_crew(&handle, session).await;
        let result = handle
            .command(session, Command::LandShip)
            .await
            .expect("sim alive");
        assert_eq!(result, Err(CommandError::ShipNotAbovePlanet));

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_stops_delivery_but_keeps_the_crew() {
        let dir = tempfile::tempdir().unwrap();
        let (handle, task) = spawn(World::generate(3), test_config(&dir));

        let (session, mut events) = handle.connect().await.unwrap();
        create_crew(&handle, session).await;
        handle
            .command(
                session,
                Command::SetShipCourse {
                    target: Position::new(500, 500, 500),
                },
            )
            .await
            .unwrap()
            .unwrap();

        handle.disconnect(session).await.unwrap();
        // The sim dropped its sender; the stream ends instead of moving.
        assert!(events.recv().await.is_none());

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        // The crew survived the disconnect and the save.
        let snapshot = storage::load(&dir.path().join("cluster.json"))
            .unwrap()
            .expect("saved");
        assert_eq!(snapshot.crews.len(), 1);
    }
}
