use chrono::Local;

use std::fmt;

use crate::{api::ApiError, models::Note, store::CollectionStore};

pub const LOADING_PLACEHOLDER: &str = "Loading...";
pub const EMPTY_PLACEHOLDER: &str = "No notes yet...";

#[derive(Debug, Clone, Copy)]
pub enum ViewState<'a> {
    Loading,
    Error(&'a ApiError),
    Empty,
    Notes(&'a [Note]),
}

impl<'a> ViewState<'a> {
    pub fn from_store(store: &'a CollectionStore) -> Self {
        if let Some(error) = store.error() {
            return Self::Error(error);
        }
        match store.snapshot() {
            None => Self::Loading,
            Some([]) => Self::Empty,
            Some(notes) => Self::Notes(notes),
        }
    }
}

/// Textual rendering of a session.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub state: ViewState<'a>,
    pub create_error: Option<&'a ApiError>,
}

impl<'a> View<'a> {
    pub fn from_store(store: &'a CollectionStore) -> Self {
        Self {
            state: ViewState::from_store(store),
            create_error: store.create_error(),
        }
    }
}

impl fmt::Display for ViewState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str(LOADING_PLACEHOLDER),
            Self::Error(error) => write!(f, "Error: {error}"),
            Self::Empty => f.write_str(EMPTY_PLACEHOLDER),
            Self::Notes(notes) => {
                for (i, note) in notes.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "- {} ({})", note.text, format_timestamp(note))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state)?;
        if let Some(error) = self.create_error {
            write!(f, "\nFailed to create note: {error}")?;
        }
        Ok(())
    }
}

fn format_timestamp(note: &Note) -> String {
    note.created_at().map_or_else(
        || note.created_at.clone(),
        |time| {
            time.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LoadTicket, StoreEvent};

    fn note(id: i64, text: &str, created_at: &str) -> Note {
        Note {
            id,
            text: text.to_string(),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn fresh_store_renders_loading() {
        let store = CollectionStore::new(false);

        assert!(matches!(ViewState::from_store(&store), ViewState::Loading));
        assert_eq!(View::from_store(&store).to_string(), "Loading...");
    }

    #[test]
    fn empty_snapshot_renders_placeholder() {
        let mut store = CollectionStore::new(false);
        store.apply(StoreEvent::LoadSucceeded(LoadTicket::first(), vec![]));

        assert!(matches!(ViewState::from_store(&store), ViewState::Empty));
        assert_eq!(View::from_store(&store).to_string(), "No notes yet...");
    }

    #[test]
    fn failed_load_renders_error_message() {
        let mut store = CollectionStore::new(false);
        store.apply(StoreEvent::LoadFailed(
            LoadTicket::first(),
            ApiError::Remote("boom".to_string()),
        ));

        assert_eq!(View::from_store(&store).to_string(), "Error: boom");
    }

    #[test]
    fn error_takes_priority_over_snapshot() {
        let mut store = CollectionStore::new(false);
        let t1 = LoadTicket::first();
        store.apply(StoreEvent::LoadSucceeded(
            t1,
            vec![note(1, "a", "2024-01-01T00:00:00Z")],
        ));
        store.apply(StoreEvent::LoadFailed(
            t1.next(),
            ApiError::Remote("db down".to_string()),
        ));

        assert!(matches!(ViewState::from_store(&store), ViewState::Error(_)));
        assert_eq!(View::from_store(&store).to_string(), "Error: db down");
    }

    #[test]
    fn notes_render_one_line_each_in_order() {
        let mut store = CollectionStore::new(false);
        store.apply(StoreEvent::LoadSucceeded(
            LoadTicket::first(),
            vec![
                note(2, "second", "not a date"),
                note(1, "first", "2024-01-01T00:00:00Z"),
            ],
        ));

        let rendered = View::from_store(&store).to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "- second (not a date)");
        assert!(lines[1].starts_with("- first ("));
    }

    #[test]
    fn create_failure_is_rendered_below_state() {
        let mut store = CollectionStore::new(false);
        store.apply(StoreEvent::LoadSucceeded(LoadTicket::first(), vec![]));
        store.apply(StoreEvent::CreateFailed(ApiError::Remote(
            "text required".to_string(),
        )));

        assert_eq!(
            View::from_store(&store).to_string(),
            "No notes yet...\nFailed to create note: text required"
        );
    }
}
