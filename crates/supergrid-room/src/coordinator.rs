//! The session coordinator: a single-writer actor owning every room.
//!
//! One command per inbound client action, received on an mpsc channel and
//! handled to completion — validation, mutation, broadcast — before the
//! next command is taken. That strict serialization is the whole
//! concurrency story: rooms and the process-wide active-play set are only
//! ever touched from this task, so exactly one mutation is visible
//! between broadcasts.

use std::collections::HashMap;
use std::sync::Arc;

use supergrid_engine::{Mark, Outcome};
use supergrid_protocol::{ChatEntry, ConnectionId, RoomCode, ServerEvent};
use supergrid_session::{MatchRecord, MatchWriter, Party};
use tokio::sync::mpsc;

use crate::{
    ActiveSet, PlayerBinding, Room, RoomError, RoomRegistry, SeatDecision, SpectatorBinding,
    broadcast, seats,
};

/// Command channel depth; senders briefly back-pressure when full.
const COMMAND_CHANNEL_SIZE: usize = 64;

/// Channel on which a connection receives its outbound events. The
/// server's writer task drains the other end into the socket.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// One connected client as the coordinator sees it.
struct Client {
    party: Party,
    sender: EventSender,
}

/// One inbound action. Mirrors the client event set plus the two
/// connection-lifecycle commands the transport issues itself.
enum Command {
    Attach {
        conn: ConnectionId,
        party: Party,
        sender: EventSender,
    },
    Create {
        conn: ConnectionId,
    },
    Join {
        conn: ConnectionId,
        room: RoomCode,
    },
    Ready {
        conn: ConnectionId,
        room: RoomCode,
    },
    Move {
        conn: ConnectionId,
        room: RoomCode,
        board: usize,
        cell: usize,
    },
    Resign {
        conn: ConnectionId,
        room: RoomCode,
    },
    Rematch {
        conn: ConnectionId,
        room: RoomCode,
    },
    Chat {
        conn: ConnectionId,
        room: RoomCode,
        message: String,
    },
    Disconnect {
        conn: ConnectionId,
    },
}

/// Handle to the running coordinator. Cheap to clone — every connection
/// task holds one.
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    /// Registers a connection's identity and outbound channel. Must
    /// precede every other command for that connection.
    pub async fn attach(
        &self,
        conn: ConnectionId,
        party: Party,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        self.send(Command::Attach { conn, party, sender }).await
    }

    pub async fn create(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.send(Command::Create { conn }).await
    }

    pub async fn join(&self, conn: ConnectionId, room: RoomCode) -> Result<(), RoomError> {
        self.send(Command::Join { conn, room }).await
    }

    pub async fn ready(&self, conn: ConnectionId, room: RoomCode) -> Result<(), RoomError> {
        self.send(Command::Ready { conn, room }).await
    }

    pub async fn play_move(
        &self,
        conn: ConnectionId,
        room: RoomCode,
        board: usize,
        cell: usize,
    ) -> Result<(), RoomError> {
        self.send(Command::Move {
            conn,
            room,
            board,
            cell,
        })
        .await
    }

    pub async fn resign(&self, conn: ConnectionId, room: RoomCode) -> Result<(), RoomError> {
        self.send(Command::Resign { conn, room }).await
    }

    pub async fn rematch(&self, conn: ConnectionId, room: RoomCode) -> Result<(), RoomError> {
        self.send(Command::Rematch { conn, room }).await
    }

    pub async fn chat(
        &self,
        conn: ConnectionId,
        room: RoomCode,
        message: String,
    ) -> Result<(), RoomError> {
        self.send(Command::Chat {
            conn,
            room,
            message,
        })
        .await
    }

    /// The implicit action: the transport noticed the socket close.
    pub async fn disconnect(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.send(Command::Disconnect { conn }).await
    }

    async fn send(&self, command: Command) -> Result<(), RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RoomError::Unavailable)
    }
}

/// Guest rooms and registered-account rooms are disjoint registries, so a
/// guest id can never collide with a registered id inside one seat
/// assignment.
#[derive(Default)]
struct Namespaces {
    registered: RoomRegistry,
    guest: RoomRegistry,
}

impl Namespaces {
    fn of_mut(&mut self, guest: bool) -> &mut RoomRegistry {
        if guest {
            &mut self.guest
        } else {
            &mut self.registered
        }
    }
}

struct Coordinator {
    connections: HashMap<ConnectionId, Client>,
    rooms: Namespaces,
    active: ActiveSet,
    matches: Arc<dyn MatchWriter>,
    receiver: mpsc::Receiver<Command>,
}

/// Spawns the coordinator task and returns the handle to it.
pub fn spawn_coordinator(matches: Arc<dyn MatchWriter>) -> CoordinatorHandle {
    let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let actor = Coordinator {
        connections: HashMap::new(),
        rooms: Namespaces::default(),
        active: ActiveSet::new(),
        matches,
        receiver: rx,
    };
    tokio::spawn(actor.run());
    CoordinatorHandle { sender: tx }
}

impl Coordinator {
    async fn run(mut self) {
        tracing::info!("session coordinator started");
        while let Some(command) = self.receiver.recv().await {
            match command {
                Command::Attach { conn, party, sender } => self.handle_attach(conn, party, sender),
                Command::Create { conn } => self.handle_create(conn),
                Command::Join { conn, room } => self.handle_join(conn, room),
                Command::Ready { conn, room } => self.handle_ready(conn, room),
                Command::Move {
                    conn,
                    room,
                    board,
                    cell,
                } => self.handle_move(conn, room, board, cell),
                Command::Resign { conn, room } => self.handle_resign(conn, room),
                Command::Rematch { conn, room } => self.handle_rematch(conn, room),
                Command::Chat {
                    conn,
                    room,
                    message,
                } => self.handle_chat(conn, room, message),
                Command::Disconnect { conn } => self.handle_disconnect(conn),
            }
        }
        tracing::info!("session coordinator stopped");
    }

    fn handle_attach(&mut self, conn: ConnectionId, party: Party, sender: EventSender) {
        tracing::debug!(%conn, account = %party.account, "connection attached");
        self.connections.insert(conn, Client { party, sender });
    }

    fn handle_create(&mut self, conn: ConnectionId) {
        let Some(client) = self.connections.get(&conn) else {
            return;
        };
        if self.active.contains(&client.party.account) {
            tracing::debug!(%conn, account = %client.party.account, "create rejected: active elsewhere");
            let _ = client.sender.send(ServerEvent::AlreadyInGame {
                error: "already in a game".into(),
            });
            return;
        }
        let guest = client.party.guest;
        let code = self.rooms.of_mut(guest).create();
        send_one(&self.connections, conn, ServerEvent::Created { room: code });
    }

    fn handle_join(&mut self, conn: ConnectionId, room: RoomCode) {
        let Some(client) = self.connections.get(&conn) else {
            return;
        };
        let party = client.party.clone();
        let Some(state) = self.rooms.of_mut(party.guest).get_mut(&room) else {
            send_one(&self.connections, conn, ServerEvent::Invalid);
            return;
        };

        match seats::decide(state, &mut self.active, &party) {
            SeatDecision::Rejected => {
                tracing::debug!(%conn, account = %party.account, room = %room, "join rejected: active elsewhere");
                send_one(
                    &self.connections,
                    conn,
                    ServerEvent::AlreadyInGame {
                        error: "already in a game".into(),
                    },
                );
                return;
            }
            SeatDecision::Reconnect(mark) => {
                // Drop the stale binding and carry its votes over, so a
                // refresh between "ready" and game start cannot wedge the
                // room.
                if let Some(old) = state.connection_of(&party.account) {
                    if old != conn {
                        state.players.remove(&old);
                        if state.ready.remove(&old) {
                            state.ready.insert(conn);
                        }
                        if state.rematch.remove(&old) {
                            state.rematch.insert(conn);
                        }
                    }
                }
                state.players.insert(
                    conn,
                    PlayerBinding {
                        account: party.account.clone(),
                        name: party.name.clone(),
                        mark,
                    },
                );
                // A disconnect cleared the active-play reservation; taking
                // the seat back in an unconcluded game restores it.
                if !state.game.is_over() {
                    self.active.insert(party.account.clone());
                }
                tracing::info!(%conn, room = %room, symbol = %mark, "player reconnected");
                send_one(&self.connections, conn, ServerEvent::Assign { symbol: mark });
            }
            SeatDecision::Seated(mark) => {
                state.players.insert(
                    conn,
                    PlayerBinding {
                        account: party.account.clone(),
                        name: party.name.clone(),
                        mark,
                    },
                );
                tracing::info!(%conn, room = %room, symbol = %mark, "seat assigned");
                send_one(&self.connections, conn, ServerEvent::Assign { symbol: mark });
            }
            SeatDecision::Spectator => {
                state.spectators.insert(
                    conn,
                    SpectatorBinding {
                        account: party.account.clone(),
                        name: party.name.clone(),
                    },
                );
                tracing::debug!(%conn, room = %room, "spectator admitted");
                send_one(&self.connections, conn, ServerEvent::Spectator);
            }
        }

        // Every successful join refreshes the whole room; the newcomer
        // alone catches up on chat.
        send_all(&self.connections, state, broadcast::game_state(state));
        send_all(&self.connections, state, broadcast::game_status(state));
        send_all(&self.connections, state, broadcast::spectator_list(state));
        send_one(&self.connections, conn, broadcast::chat_history(state));
    }

    fn handle_ready(&mut self, conn: ConnectionId, room: RoomCode) {
        let Some(client) = self.connections.get(&conn) else {
            return;
        };
        let guest = client.party.guest;
        let Some(state) = self.rooms.of_mut(guest).get_mut(&room) else {
            return;
        };
        if !state.players.contains_key(&conn) {
            return;
        }

        state.ready.insert(conn);
        if state.both_ready() && !state.game.started() {
            state.game.start();
            tracing::info!(room = %room, "game started");
            send_all(&self.connections, state, broadcast::game_state(state));
        }
        send_all(&self.connections, state, broadcast::game_status(state));
    }

    fn handle_move(&mut self, conn: ConnectionId, room: RoomCode, board: usize, cell: usize) {
        let Some(client) = self.connections.get(&conn) else {
            return;
        };
        let guest = client.party.guest;
        let Some(state) = self.rooms.of_mut(guest).get_mut(&room) else {
            return;
        };
        let Some(mark) = state.players.get(&conn).map(|b| b.mark) else {
            return;
        };
        // The engine places the current player's mark wherever a move
        // lands, so the sender must actually hold that mark.
        if mark != state.game.current() {
            return;
        }
        if !state.game.apply_move(board, cell) {
            return;
        }

        if state.game.is_over() {
            tracing::info!(room = %room, outcome = ?state.game.winner(), "game concluded");
            record_match(self.matches.as_ref(), state);
            seats::release_seats(state, &mut self.active);
        }
        send_all(&self.connections, state, broadcast::game_state(state));
    }

    fn handle_resign(&mut self, conn: ConnectionId, room: RoomCode) {
        let Some(client) = self.connections.get(&conn) else {
            return;
        };
        let guest = client.party.guest;
        let Some(state) = self.rooms.of_mut(guest).get_mut(&room) else {
            return;
        };
        let Some(mark) = state.players.get(&conn).map(|b| b.mark) else {
            return;
        };
        // The outcome is write-once; a resignation cannot follow a
        // conclusion.
        if state.game.is_over() {
            return;
        }

        state.game.resign(mark);
        tracing::info!(room = %room, loser = %mark, "player resigned");
        record_match(self.matches.as_ref(), state);
        seats::release_seats(state, &mut self.active);
        send_all(&self.connections, state, broadcast::game_state(state));
    }

    fn handle_rematch(&mut self, conn: ConnectionId, room: RoomCode) {
        let Some(client) = self.connections.get(&conn) else {
            return;
        };
        let guest = client.party.guest;
        let Some(state) = self.rooms.of_mut(guest).get_mut(&room) else {
            return;
        };
        if !state.players.contains_key(&conn) {
            return;
        }

        state.rematch.insert(conn);
        if state.both_rematch() {
            state.reset_for_rematch();
            seats::reserve_seats(state, &mut self.active);
            tracing::info!(room = %room, "rematch agreed");
            send_all(&self.connections, state, ServerEvent::RematchAgreed);
            send_all(&self.connections, state, broadcast::game_state(state));
        }
        send_all(&self.connections, state, broadcast::game_status(state));
    }

    fn handle_chat(&mut self, conn: ConnectionId, room: RoomCode, message: String) {
        let Some(client) = self.connections.get(&conn) else {
            return;
        };
        let guest = client.party.guest;
        let Some(state) = self.rooms.of_mut(guest).get_mut(&room) else {
            return;
        };
        let Some((author, spectator)) = state
            .players
            .get(&conn)
            .map(|b| (b.name.clone(), false))
            .or_else(|| state.spectators.get(&conn).map(|s| (s.name.clone(), true)))
        else {
            return;
        };

        let entry = ChatEntry {
            author,
            text: message,
            spectator,
        };
        state.chat.push(entry.clone());
        send_all(&self.connections, state, ServerEvent::ChatMessage { entry });
    }

    fn handle_disconnect(&mut self, conn: ConnectionId) {
        self.connections.remove(&conn);

        // Exactly one room is touched: the first one holding this
        // connection.
        let Self {
            connections,
            rooms,
            active,
            ..
        } = self;
        for state in rooms.registered.rooms_mut().chain(rooms.guest.rooms_mut()) {
            if let Some(binding) = state.players.remove(&conn) {
                state.ready.remove(&conn);
                state.rematch.remove(&conn);
                // The seat holder stays — the account may reconnect —
                // but the account is no longer tied up in active play.
                active.remove(&binding.account);
                tracing::info!(%conn, room = %state.code(), "seated player disconnected, seat reserved");
                send_all(connections, state, broadcast::game_status(state));
                return;
            }
            if state.spectators.remove(&conn).is_some() {
                tracing::debug!(%conn, room = %state.code(), "spectator left");
                send_all(connections, state, broadcast::spectator_list(state));
                return;
            }
        }
    }
}

/// Writes the match record for a concluded game, when both seats are
/// registered accounts. Runs before the seats are released.
fn record_match(matches: &dyn MatchWriter, room: &Room) {
    let Some(outcome) = room.game.winner() else {
        return;
    };
    let (Some(x), Some(o)) = (room.seats.holder(Mark::X), room.seats.holder(Mark::O)) else {
        return;
    };
    if x.guest || o.guest {
        return;
    }
    let record = match outcome {
        Outcome::Draw => MatchRecord {
            winner: None,
            loser: None,
            draw: true,
        },
        Outcome::X => MatchRecord {
            winner: Some(x.account.clone()),
            loser: Some(o.account.clone()),
            draw: false,
        },
        Outcome::O => MatchRecord {
            winner: Some(o.account.clone()),
            loser: Some(x.account.clone()),
            draw: false,
        },
    };
    matches.record(record);
}

/// Delivers an event to every member of a room, seated and spectating.
fn send_all(connections: &HashMap<ConnectionId, Client>, room: &Room, event: ServerEvent) {
    for conn in room.players.keys().chain(room.spectators.keys()) {
        send_one(connections, *conn, event.clone());
    }
}

/// Delivers an event to one connection. A gone receiver means the
/// connection is already tearing down; the event is dropped.
fn send_one(connections: &HashMap<ConnectionId, Client>, conn: ConnectionId, event: ServerEvent) {
    if let Some(client) = connections.get(&conn) {
        let _ = client.sender.send(event);
    }
}
