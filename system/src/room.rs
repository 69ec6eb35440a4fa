use crate::assembler::StrokeAssembler;
use crate::history::HistoryStore;
use crate::message::{ClientEvent, Outbound, ServerEvent};
use crate::registry::SessionRegistry;
use crate::types::{ConnectionId, StrokeRecord};

/// One shared drawing surface.
///
/// Owns the authoritative stroke history, the per-connection
/// in-progress strokes and the participant roster, and implements the
/// inbound event table: each event is one atomic mutation followed by
/// zero or more fan-out directives. Constructed once per server
/// process; clients never mutate history locally.
#[derive(Debug, Default)]
pub struct CollabRoom {
    history: HistoryStore,
    assembler: StrokeAssembler,
    registry: SessionRegistry,
}

impl CollabRoom {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new connection gets the full history, everyone gets the
    /// updated roster.
    pub fn connect(&mut self, from: ConnectionId) -> Vec<Outbound> {
        let participant = self.registry.register(from);
        log::info!("connection {} joined as {}", from, participant.name);
        vec![
            Outbound::to_sender(self.update_canvas()),
            Outbound::to_all(self.user_list()),
        ]
    }

    pub fn disconnect(&mut self, from: ConnectionId) -> Vec<Outbound> {
        // A stroke this connection left open can never be finished
        // now that its events have stopped, so drop it uncommitted.
        self.assembler.discard(from);
        self.registry.unregister(from);
        log::info!("connection {} disconnected", from);
        vec![
            Outbound::to_all(ServerEvent::UserDisconnected { id: from }),
            Outbound::to_all(self.user_list()),
        ]
    }

    pub fn handle_event(&mut self, from: ConnectionId, event: ClientEvent) -> Vec<Outbound> {
        match event {
            ClientEvent::RegisterName { name } => {
                if let Some(participant) = self.registry.rename(from, &name) {
                    log::info!("connection {} set name to {:?}", from, participant.name);
                    vec![Outbound::to_all(self.user_list())]
                } else {
                    Vec::new()
                }
            }
            ClientEvent::BeginPath {
                point,
                color,
                width,
                erasing,
            } => {
                self.assembler.begin(from, point, color.clone(), width, erasing);
                vec![Outbound::to_others(ServerEvent::BeginPath {
                    point,
                    color,
                    width,
                    erasing,
                })]
            }
            ClientEvent::Draw {
                point,
                prev_point,
                color,
                width,
                erasing,
            } => {
                self.assembler.append(from, point);
                vec![Outbound::to_others(ServerEvent::Draw {
                    point,
                    prev_point,
                    color,
                    width,
                    erasing,
                })]
            }
            ClientEvent::EndStroke => {
                let mut out = Vec::new();
                if let Some(stroke) = self.finalize_stroke(from) {
                    out.push(Outbound::to_all(ServerEvent::NewStroke { stroke }));
                }
                // The snapshot goes out even when nothing was open, so
                // every client converges on the committed history.
                out.push(Outbound::to_all(self.update_canvas()));
                out
            }
            ClientEvent::ColorChange { color } => {
                log::info!("connection {} changed color to {}", from, color);
                vec![Outbound::to_others(ServerEvent::ColorChange { color })]
            }
            ClientEvent::Undo => {
                self.history.undo();
                log::info!("global undo by connection {}", from);
                vec![Outbound::to_all(self.update_canvas())]
            }
            ClientEvent::Redo => {
                self.history.redo();
                log::info!("global redo by connection {}", from);
                vec![Outbound::to_all(self.update_canvas())]
            }
            ClientEvent::CursorMove {
                point,
                name,
                drawing,
            } => {
                // The broadcast color always comes from the registry;
                // a client-supplied color is never trusted. An unknown
                // id means the event raced a disconnect - drop it.
                match self.registry.get(from) {
                    Some(participant) => {
                        let name = if name.is_empty() {
                            participant.name.clone()
                        } else {
                            name
                        };
                        vec![Outbound::to_others(ServerEvent::CursorMove {
                            id: from,
                            point,
                            color: participant.color.clone(),
                            name,
                            drawing,
                        })]
                    }
                    None => Vec::new(),
                }
            }
        }
    }

    /// Commits `from`'s open stroke, clearing the redo branch. None
    /// when no stroke with at least one point was open.
    fn finalize_stroke(&mut self, from: ConnectionId) -> Option<StrokeRecord> {
        let stroke = self.assembler.take(from).filter(|s| !s.path.is_empty())?;
        self.history.commit(stroke.clone());
        Some(stroke)
    }

    pub fn snapshot(&self) -> Vec<StrokeRecord> {
        self.history.snapshot()
    }

    /// Teardown hook: clears drawing state. The roster reflects live
    /// connections and is left alone.
    pub fn reset(&mut self) {
        self.history.reset();
        self.assembler.reset();
    }

    fn update_canvas(&self) -> ServerEvent {
        ServerEvent::UpdateCanvas {
            strokes: self.history.snapshot(),
        }
    }

    fn user_list(&self) -> ServerEvent {
        ServerEvent::UserList {
            users: self.registry.all(),
        }
    }
}
