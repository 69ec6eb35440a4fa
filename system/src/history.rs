use crate::types::StrokeRecord;

/// Authoritative linear undo history of the shared canvas.
///
/// All operations are total: undo/redo on an empty stack are no-ops,
/// never errors. Committing a stroke discards the redo branch.
#[derive(Debug, Default)]
pub struct HistoryStore {
    done: Vec<StrokeRecord>,
    undone: Vec<StrokeRecord>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&mut self, stroke: StrokeRecord) {
        self.done.push(stroke);
        self.undone.clear();
    }

    /// Moves the most recent stroke onto the undone stack, returning
    /// the resulting done list either way.
    pub fn undo(&mut self) -> &[StrokeRecord] {
        if let Some(stroke) = self.done.pop() {
            self.undone.push(stroke);
        }
        &self.done
    }

    /// Moves the most recently undone stroke back, returning the
    /// resulting done list either way.
    pub fn redo(&mut self) -> &[StrokeRecord] {
        if let Some(stroke) = self.undone.pop() {
            self.done.push(stroke);
        }
        &self.done
    }

    /// Full ordered done list, used to resynchronize clients wholesale.
    pub fn snapshot(&self) -> Vec<StrokeRecord> {
        self.done.clone()
    }

    pub fn reset(&mut self) {
        self.done.clear();
        self.undone.clear();
    }
}
