use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{ConnectionId, Participant, Point, StrokeRecord};

/// Everything a client may send, tagged with the wire event name.
/// Unknown extra fields in a payload are ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    RegisterName {
        name: String,
    },
    BeginPath {
        point: Point,
        color: String,
        width: f32,
        erasing: bool,
    },
    Draw {
        point: Point,
        #[serde(rename = "prevPoint")]
        prev_point: Point,
        color: String,
        width: f32,
        erasing: bool,
    },
    EndStroke,
    ColorChange {
        color: String,
    },
    Undo,
    Redo,
    CursorMove {
        point: Point,
        #[serde(default)]
        name: String,
        #[serde(default)]
        drawing: bool,
    },
}

/// Everything the server may emit. `beginPath`, `draw` and
/// `colorChange` are verbatim relays of the inbound payload for
/// low-latency preview; only terminal events carry a full snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    UpdateCanvas {
        strokes: Vec<StrokeRecord>,
    },
    NewStroke {
        stroke: StrokeRecord,
    },
    BeginPath {
        point: Point,
        color: String,
        width: f32,
        erasing: bool,
    },
    Draw {
        point: Point,
        #[serde(rename = "prevPoint")]
        prev_point: Point,
        color: String,
        width: f32,
        erasing: bool,
    },
    ColorChange {
        color: String,
    },
    CursorMove {
        id: ConnectionId,
        point: Point,
        color: String,
        name: String,
        drawing: bool,
    },
    UserList {
        users: HashMap<ConnectionId, Participant>,
    },
    UserDisconnected {
        id: ConnectionId,
    },
}

/// Who receives an outbound event, relative to the connection whose
/// inbound event produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fanout {
    /// The originating connection only.
    Sender,
    /// Every connection except the originator.
    Others,
    /// Every connection, the originator included.
    All,
}

/// A fan-out directive produced by the room in response to one
/// inbound event, in broadcast order.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub fanout: Fanout,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn to_sender(event: ServerEvent) -> Self {
        Self {
            fanout: Fanout::Sender,
            event,
        }
    }

    pub fn to_others(event: ServerEvent) -> Self {
        Self {
            fanout: Fanout::Others,
            event,
        }
    }

    pub fn to_all(event: ServerEvent) -> Self {
        Self {
            fanout: Fanout::All,
            event,
        }
    }
}
