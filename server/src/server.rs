use std::num::Wrapping;

use tokio::sync::mpsc::{channel, Sender};

use system::{CollabRoom, ConnectionId, Fanout, Outbound, ServerEvent};

use crate::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::ConnectionTxStorage;

pub type ServerTx = Sender<ConnectionCommand>;

/// The single authority over the shared canvas. One task processes
/// one connection's event to completion before the next, which is
/// what makes mutate-then-broadcast atomic without locks.
struct Server {
    room: CollabRoom,
    connections: ConnectionTxStorage,
    connection_id_source: Wrapping<ConnectionId>,
}

impl Server {
    fn new() -> Self {
        Self {
            room: CollabRoom::new(),
            connections: ConnectionTxStorage::new(),
            connection_id_source: Wrapping(0),
        }
    }

    async fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => {
                let connection_id = self.new_connection_id();
                self.connections.insert(connection_id, tx);
                self.connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id })
                    .await;
                let outbounds = self.room.connect(connection_id);
                self.dispatch(connection_id, outbounds).await;
            }
            ConnectionCommand::Disconnect { from } => {
                if self.connections.remove(&from).is_some() {
                    let outbounds = self.room.disconnect(from);
                    self.dispatch(from, outbounds).await;
                }
            }
            ConnectionCommand::ClientEvent { from, event } => {
                let outbounds = self.room.handle_event(from, event);
                self.dispatch(from, outbounds).await;
            }
        }
    }

    async fn dispatch(&mut self, from: ConnectionId, outbounds: Vec<Outbound>) {
        for outbound in outbounds {
            match outbound.fanout {
                Fanout::Sender => {
                    self.connections
                        .send(&from, ConnectionEvent::ServerEvent(outbound.event))
                        .await;
                }
                Fanout::Others => self.broadcast(outbound.event, Some(from)).await,
                Fanout::All => self.broadcast(outbound.event, None).await,
            }
        }
    }

    async fn broadcast(&mut self, event: ServerEvent, without: Option<ConnectionId>) {
        for connection_id in self.connections.connection_ids() {
            if without.map_or(false, |w| w == connection_id) {
                continue;
            }
            self.connections
                .send(&connection_id, ConnectionEvent::ServerEvent(event.clone()))
                .await;
        }
    }

    fn new_connection_id(&mut self) -> ConnectionId {
        self.connection_id_source += Wrapping(1);
        self.connection_id_source.0
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ConnectionCommand>(16);

    tokio::spawn(async move {
        let mut server = Box::new(Server::new());

        while let Some(command) = srv_rx.recv().await {
            server.handle_connection_command(command).await;
        }
    });

    srv_tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use system::{ClientEvent, Point};
    use tokio::sync::mpsc::Receiver;

    async fn connect(server: &mut Server, rx_buffer: usize) -> (ConnectionId, Receiver<ConnectionEvent>) {
        let (tx, mut rx) = channel::<ConnectionEvent>(rx_buffer);
        server
            .handle_connection_command(ConnectionCommand::Connect { tx })
            .await;
        let connection_id = match rx.try_recv().expect("connected event must arrive") {
            ConnectionEvent::Connected { connection_id } => connection_id,
            other => panic!("expected connected, got {:?}", other),
        };
        (connection_id, rx)
    }

    fn drain(rx: &mut Receiver<ConnectionEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                ConnectionEvent::ServerEvent(e) => events.push(e),
                other => panic!("unexpected event {:?}", other),
            }
        }
        events
    }

    #[tokio::test]
    async fn it_relays_a_stroke_and_commits_it_for_everyone() {
        let mut server = Server::new();
        let (a, mut rx_a) = connect(&mut server, 32).await;
        let (_b, mut rx_b) = connect(&mut server, 32).await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        server
            .handle_connection_command(ConnectionCommand::ClientEvent {
                from: a,
                event: ClientEvent::BeginPath {
                    point: Point::new(0.0, 0.0),
                    color: "#000".into(),
                    width: 3.0,
                    erasing: false,
                },
            })
            .await;
        server
            .handle_connection_command(ConnectionCommand::ClientEvent {
                from: a,
                event: ClientEvent::Draw {
                    point: Point::new(10.0, 10.0),
                    prev_point: Point::new(0.0, 0.0),
                    color: "#000".into(),
                    width: 3.0,
                    erasing: false,
                },
            })
            .await;
        server
            .handle_connection_command(ConnectionCommand::ClientEvent {
                from: a,
                event: ClientEvent::EndStroke,
            })
            .await;

        // The drawer sees only the terminal events, no echo of its
        // own deltas.
        let to_a = drain(&mut rx_a);
        assert!(matches!(to_a[0], ServerEvent::NewStroke { .. }));
        assert!(matches!(to_a[1], ServerEvent::UpdateCanvas { .. }));

        let to_b = drain(&mut rx_b);
        assert!(matches!(to_b[0], ServerEvent::BeginPath { .. }));
        assert!(matches!(to_b[1], ServerEvent::Draw { .. }));
        match &to_b[2] {
            ServerEvent::NewStroke { stroke } => {
                assert_eq!(
                    stroke.path,
                    vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)]
                );
            }
            other => panic!("expected newStroke, got {:?}", other),
        }
        match &to_b[3] {
            ServerEvent::UpdateCanvas { strokes } => assert_eq!(strokes.len(), 1),
            other => panic!("expected updateCanvas, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn it_syncs_a_late_joiner_and_announces_disconnects() {
        let mut server = Server::new();
        let (_a, mut rx_a) = connect(&mut server, 32).await;
        let to_a = drain(&mut rx_a);
        assert!(matches!(to_a[0], ServerEvent::UpdateCanvas { .. }));
        assert!(matches!(to_a[1], ServerEvent::UserList { .. }));

        let (b, mut rx_b) = connect(&mut server, 32).await;
        drain(&mut rx_b);
        match drain(&mut rx_a).as_slice() {
            [ServerEvent::UserList { users }] => assert_eq!(users.len(), 2),
            other => panic!("expected roster update, got {:?}", other),
        }

        server
            .handle_connection_command(ConnectionCommand::Disconnect { from: b })
            .await;
        let to_a = drain(&mut rx_a);
        assert!(matches!(to_a[0], ServerEvent::UserDisconnected { id } if id == b));
        match &to_a[1] {
            ServerEvent::UserList { users } => assert_eq!(users.len(), 1),
            other => panic!("expected userList, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn it_ignores_a_duplicate_disconnect() {
        let mut server = Server::new();
        let (a, mut rx_a) = connect(&mut server, 32).await;
        drain(&mut rx_a);

        server
            .handle_connection_command(ConnectionCommand::Disconnect { from: a })
            .await;
        server
            .handle_connection_command(ConnectionCommand::Disconnect { from: a })
            .await;

        assert!(drain(&mut rx_a).is_empty());
    }
}
