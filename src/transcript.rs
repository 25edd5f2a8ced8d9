use crate::persona::RoleKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "role")]
pub enum Speaker {
    User,
    Ai(RoleKind),
    System,
}

/// One entry of the court record. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub speaker: Speaker,
    pub persona_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(
        speaker: Speaker,
        persona_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker,
            persona_name: persona_name.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Speaker::System, "System", content)
    }

    pub fn role(&self) -> Option<RoleKind> {
        match self.speaker {
            Speaker::Ai(role) => Some(role),
            Speaker::User | Speaker::System => None,
        }
    }
}

/// Append-only conversation log, oldest turn first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        log::debug!(
            "Transcript #{} {:?} ({}): {}",
            self.turns.len(),
            turn.speaker,
            turn.persona_name,
            turn.content
        );
        self.turns.push(turn);
    }

    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_keep_order_and_content() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::system("Court is now in session."));
        transcript.append(Turn::new(Speaker::User, "Prosecutor", "Your Honor."));
        let snapshot = transcript.all().to_vec();

        transcript.append(Turn::new(Speaker::Ai(RoleKind::Judge), "Judge Morrison", "Proceed."));

        assert_eq!(transcript.len(), 3);
        assert_eq!(&transcript.all()[..2], snapshot.as_slice());
        assert_eq!(transcript.last().unwrap().role(), Some(RoleKind::Judge));
        assert_eq!(transcript.all()[0].persona_name, "System");
    }

    #[test]
    fn turn_ids_are_unique() {
        let a = Turn::system("a");
        let b = Turn::system("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn speaker_serializes_with_role() {
        let json = serde_json::to_value(Speaker::Ai(RoleKind::Witness)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "ai", "role": "witness" }));
        let json = serde_json::to_value(Speaker::User).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "user" }));
    }
}
