use serde::{Deserialize, Serialize};

pub type ConnectionId = u16;

pub type Point = euclid::default::Point2D<f32>;

/// One committed pen-down-to-pen-up drawing action.
///
/// A finalized record is never mutated again; undo/redo move whole
/// records between the done and undone stacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecord {
    pub path: Vec<Point>,
    pub color: String,
    pub width: f32,
    pub erasing: bool,
    #[serde(rename = "createdAt")]
    pub created_at: u64,
}

/// A connected participant as seen by the roster. The color is
/// assigned at registration and stays fixed for the session lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub color: String,
}
