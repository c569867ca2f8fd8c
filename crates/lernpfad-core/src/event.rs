//! Datenstrukturen für Anwesenheits-Ereignisse.
//!
//! Ein [`PresenceEvent`] beschreibt, dass ein Lernender einen Lernpunkt
//! betritt, verlässt oder gerade auf dem Weg dorthin ist. Solche Ereignisse
//! stammen von Empfangsgeräten, Apps oder einem Protokoll-Replay und werden
//! vom Belegungs-Workflow in Zählerstände übersetzt.

use serde::{Deserialize, Serialize};

use crate::{ActivityId, TargetId};

/// Art des Anwesenheitswechsels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceKind {
    /// Lernender betritt den Lernpunkt.
    Enter,
    /// Lernender verlässt den Lernpunkt.
    Exit,
    /// Lernender ist unterwegs zum Lernpunkt und reserviert einen Platz.
    Entering,
    /// Reservierung wird aufgegeben.
    CancelEntering,
}

impl PresenceKind {
    /// Vorzeichen der Belegungsänderung für einen physischen Besuch.
    #[must_use]
    pub fn occupancy_delta(self) -> i32 {
        match self {
            PresenceKind::Enter | PresenceKind::Entering => 1,
            PresenceKind::Exit | PresenceKind::CancelEntering => -1,
        }
    }
}

/// Ein einzelnes Anwesenheits-Ereignis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresenceEvent {
    /// Eine eindeutige Kennung für dieses Ereignis, z. B. eine UUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Art des Ereignisses. Im JSON heißt das Feld `type`.
    #[serde(rename = "type")]
    pub kind: PresenceKind,
    pub activity: ActivityId,
    pub target: TargetId,
    /// Physischer Besuch (`true`) oder virtuelles Material (`false`).
    /// Nur für `enter` relevant.
    #[serde(default = "default_is_entity")]
    pub is_entity: bool,
    /// ISO-8601-Zeitstempel des Ereignisses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

fn default_is_entity() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presence_event_uses_type_field() {
        let event = PresenceEvent {
            id: Some("evt-1".to_string()),
            kind: PresenceKind::CancelEntering,
            activity: ActivityId(4),
            target: TargetId(9),
            is_entity: true,
            ts: Some("2024-03-01T10:00:00Z".to_string()),
        };

        let serialized = serde_json::to_string(&event).expect("Serialization failed");
        assert!(serialized.contains("\"type\":\"cancel_entering\""));
        assert!(!serialized.contains("\"kind\""));

        let deserialized: PresenceEvent =
            serde_json::from_str(&serialized).expect("Deserialization failed");
        assert_eq!(event, deserialized);
    }

    #[test]
    fn presence_event_defaults_to_entity_visit() {
        let event: PresenceEvent = serde_json::from_value(json!({
            "type": "enter",
            "activity": 1,
            "target": 3
        }))
        .expect("Deserialization failed");
        assert_eq!(event.kind, PresenceKind::Enter);
        assert!(event.is_entity);
        assert!(event.id.is_none());
        assert_eq!(event.kind.occupancy_delta(), 1);
        assert_eq!(PresenceKind::Exit.occupancy_delta(), -1);
    }
}
