use std::collections::HashMap;

use rand::Rng;

use crate::types::{ConnectionId, Participant};

/// Connected participants and their assigned identity.
///
/// Colors are sampled at registration with no uniqueness guarantee;
/// two sessions may end up with the same hue. Accepted limitation.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    participants: HashMap<ConnectionId, Participant>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ConnectionId) -> &Participant {
        self.participants.entry(id).or_insert_with(|| Participant {
            name: format!("User-{}", id),
            color: random_color(),
        })
    }

    /// Applies a trimmed, non-empty display name. Returns the updated
    /// participant only when the name was actually accepted; an empty
    /// name or an unknown id is a no-op yielding None.
    pub fn rename(&mut self, id: ConnectionId, new_name: &str) -> Option<&Participant> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return None;
        }
        let participant = self.participants.get_mut(&id)?;
        participant.name = trimmed.to_owned();
        Some(&*participant)
    }

    pub fn unregister(&mut self, id: ConnectionId) {
        self.participants.remove(&id);
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    /// Roster snapshot for broadcast.
    pub fn all(&self) -> HashMap<ConnectionId, Participant> {
        self.participants.clone()
    }
}

fn random_color() -> String {
    let hue = rand::thread_rng().gen_range(0..360);
    format!("hsl({}, 90%, 55%)", hue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_default_name_and_hsl_color() {
        let mut registry = SessionRegistry::new();
        let participant = registry.register(7);
        assert_eq!(participant.name, "User-7");
        assert!(participant.color.starts_with("hsl("));
        assert!(participant.color.ends_with(", 90%, 55%)"));
    }

    #[test]
    fn rename_trims_and_applies() {
        let mut registry = SessionRegistry::new();
        registry.register(1);
        let renamed = registry.rename(1, "  ada  ").expect("must be accepted");
        assert_eq!(renamed.name, "ada");
    }

    #[test]
    fn rename_rejects_blank_names() {
        let mut registry = SessionRegistry::new();
        registry.register(1);
        assert!(registry.rename(1, "   ").is_none());
        assert_eq!(registry.get(1).unwrap().name, "User-1");
    }

    #[test]
    fn rename_unknown_id_is_noop() {
        let mut registry = SessionRegistry::new();
        assert!(registry.rename(42, "ghost").is_none());
    }

    #[test]
    fn color_survives_rename() {
        let mut registry = SessionRegistry::new();
        let color = registry.register(1).color.clone();
        let _ = registry.rename(1, "ada");
        assert_eq!(registry.get(1).unwrap().color, color);
    }

    #[test]
    fn unregister_removes_from_roster() {
        let mut registry = SessionRegistry::new();
        registry.register(1);
        registry.register(2);
        registry.unregister(1);
        let roster = registry.all();
        assert!(!roster.contains_key(&1));
        assert!(roster.contains_key(&2));
    }
}
