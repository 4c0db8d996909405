use std::fmt;

use crate::{api::ApiError, models::Note};

/// Sequence number of a load attempt within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub const fn first() -> Self {
        Self(1)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub enum StoreEvent {
    LoadStarted(LoadTicket),
    LoadSucceeded(LoadTicket, Vec<Note>),
    LoadFailed(LoadTicket, ApiError),
    CreateStarted,
    CreateFailed(ApiError),
}

/// Last known state of the remote notes collection.
///
/// Only [`CollectionStore::apply`] mutates it. A load failure does not drop the
/// snapshot and a load success does not clear the error; the error goes away
/// only when the next load starts.
#[derive(Debug, Default)]
pub struct CollectionStore {
    snapshot: Option<Vec<Note>>,
    error: Option<ApiError>,
    create_error: Option<ApiError>,
    ignore_stale: bool,
    newest_started: Option<LoadTicket>,
}

impl CollectionStore {
    pub fn new(ignore_stale: bool) -> Self {
        Self {
            ignore_stale,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Option<&[Note]> {
        self.snapshot.as_deref()
    }

    pub const fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub const fn create_error(&self) -> Option<&ApiError> {
        self.create_error.as_ref()
    }

    /// Applies one event. Returns `false` if the event was discarded as stale.
    pub fn apply(&mut self, event: StoreEvent) -> bool {
        match event {
            StoreEvent::LoadStarted(ticket) => {
                self.newest_started = self.newest_started.max(Some(ticket));
                self.error = None;
            }
            StoreEvent::LoadSucceeded(ticket, notes) => {
                if !self.accept(ticket) {
                    return false;
                }
                self.snapshot = Some(notes);
            }
            StoreEvent::LoadFailed(ticket, error) => {
                if !self.accept(ticket) {
                    return false;
                }
                self.error = Some(error);
            }
            StoreEvent::CreateStarted => {
                self.create_error = None;
            }
            StoreEvent::CreateFailed(error) => {
                self.create_error = Some(error);
            }
        }
        true
    }

    /// A result is stale once a newer load has started, whether or not that
    /// load has answered yet.
    fn accept(&self, ticket: LoadTicket) -> bool {
        if self.ignore_stale && self.newest_started.is_some_and(|newest| ticket < newest) {
            tracing::debug!("Discarding stale load {}", ticket);
            return false;
        }
        true
    }
}
