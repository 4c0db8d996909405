use chrono::{DateTime, FixedOffset};

use crate::dto::NoteResponse;

/// A note as fetched from the service. Never modified on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub text: String,
    /// Raw timestamp exactly as the service sent it.
    pub created_at: String,
}

impl Note {
    /// Parses `created_at` as RFC 3339. Returns `None` for anything else.
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.created_at).ok()
    }
}

impl From<NoteResponse> for Note {
    fn from(note: NoteResponse) -> Self {
        Self {
            id: note.id,
            text: note.text,
            created_at: note.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_timestamps() {
        let note = Note {
            id: 1,
            text: "hello".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let parsed = note.created_at().expect("timestamp should parse");
        assert_eq!(parsed.timestamp(), 1_704_067_200);
    }

    #[test]
    fn unparsable_timestamp_is_none() {
        let note = Note {
            id: 1,
            text: "hello".to_string(),
            created_at: "yesterday".to_string(),
        };

        assert!(note.created_at().is_none());
    }
}
