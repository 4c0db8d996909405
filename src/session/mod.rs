use tokio::task::{self, JoinSet};

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use crate::{
    api::{ApiClient, ApiError, NotesApi},
    config::SessionConfig,
    dto::CreateNoteRequest,
    models::Note,
    store::{CollectionStore, LoadTicket, StoreEvent},
    view::View,
};

/// Everything the session reacts to, processed strictly one at a time.
#[derive(Debug)]
pub enum Signal {
    /// The view was displayed for the first time.
    Mounted,
    /// The user submitted the create form.
    Submitted(CreateNoteRequest),
    LoadSucceeded {
        ticket: LoadTicket,
        notes: Vec<Note>,
    },
    LoadFailed {
        ticket: LoadTicket,
        error: ApiError,
    },
    CreateSucceeded(Note),
    CreateFailed(ApiError),
}

/// State of one mounted notes view.
///
/// Loads the collection on mount and again after every successful create.
/// Requests run as tasks owned by the session; their outcomes come back as
/// [`Signal`]s and only [`Session::dispatch`] touches the store. Overlapping
/// loads are neither merged nor cancelled.
///
/// Dropping the session aborts whatever is still in flight.
pub struct Session<A: NotesApi = ApiClient> {
    api: Arc<A>,
    store: CollectionStore,
    queue: VecDeque<Signal>,
    in_flight: JoinSet<Signal>,
    // Load tasks still running, so a task that dies still fails its ticket.
    loads: HashMap<task::Id, LoadTicket>,
    mounted: bool,
    next_ticket: LoadTicket,
}

impl<A: NotesApi> Session<A> {
    pub fn new(api: A, config: &SessionConfig) -> Self {
        Self {
            api: Arc::new(api),
            store: CollectionStore::new(config.ignore_stale_loads),
            queue: VecDeque::new(),
            in_flight: JoinSet::new(),
            loads: HashMap::new(),
            mounted: false,
            next_ticket: LoadTicket::first(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub const fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn view(&self) -> View<'_> {
        View::from_store(&self.store)
    }

    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Number of requests that have not reported back yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn mount(&mut self) {
        self.queue.push_back(Signal::Mounted);
    }

    pub fn submit(&mut self, text: impl Into<String>) {
        self.queue
            .push_back(Signal::Submitted(CreateNoteRequest::new(text)));
    }

    pub fn dispatch(&mut self, signal: Signal) {
        match signal {
            Signal::Mounted => {
                if self.mounted {
                    tracing::warn!("Session is already mounted, ignoring mount signal");
                    return;
                }
                self.mounted = true;
                tracing::info!("Session mounted, loading notes");
                self.start_load();
            }
            Signal::Submitted(request) => {
                self.store.apply(StoreEvent::CreateStarted);
                self.start_create(request);
            }
            Signal::LoadSucceeded { ticket, notes } => {
                tracing::debug!("Load {} returned {} notes", ticket, notes.len());
                self.store.apply(StoreEvent::LoadSucceeded(ticket, notes));
            }
            Signal::LoadFailed { ticket, error } => {
                tracing::warn!("Load {} failed: {}", ticket, error);
                self.store.apply(StoreEvent::LoadFailed(ticket, error));
            }
            Signal::CreateSucceeded(note) => {
                tracing::info!("Created note {}, reloading notes", note.id);
                self.start_load();
            }
            Signal::CreateFailed(error) => {
                tracing::warn!("Failed to create note: {}", error);
                self.store.apply(StoreEvent::CreateFailed(error));
            }
        }
    }

    /// Processes the next queued signal, or waits for the next request to
    /// finish. Returns `false` once there is nothing left to do.
    pub async fn step(&mut self) -> bool {
        if let Some(signal) = self.queue.pop_front() {
            self.dispatch(signal);
            return true;
        }

        match self.in_flight.join_next_with_id().await {
            Some(Ok((id, signal))) => {
                self.loads.remove(&id);
                self.dispatch(signal);
                true
            }
            Some(Err(e)) => {
                tracing::error!("Request task did not complete: {}", e);
                if let Some(ticket) = self.loads.remove(&e.id()) {
                    self.dispatch(Signal::LoadFailed {
                        ticket,
                        error: ApiError::TaskFailed(e),
                    });
                }
                true
            }
            None => false,
        }
    }

    /// Runs until no signal is queued and no request is in flight.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    pub fn shutdown(mut self) {
        if !self.in_flight.is_empty() {
            tracing::info!("Aborting {} in-flight requests", self.in_flight.len());
        }
        self.in_flight.abort_all();
    }

    fn start_load(&mut self) {
        let ticket = self.next_ticket;
        self.next_ticket = ticket.next();
        self.store.apply(StoreEvent::LoadStarted(ticket));

        tracing::debug!("Starting load {}", ticket);

        let api = Arc::clone(&self.api);
        let handle = self.in_flight.spawn(async move {
            match api.all_notes().await {
                Ok(notes) => Signal::LoadSucceeded { ticket, notes },
                Err(error) => Signal::LoadFailed { ticket, error },
            }
        });
        self.loads.insert(handle.id(), ticket);
    }

    fn start_create(&mut self, request: CreateNoteRequest) {
        tracing::debug!("Creating note");

        let api = Arc::clone(&self.api);
        self.in_flight.spawn(async move {
            match api.create_note(request).await {
                Ok(note) => Signal::CreateSucceeded(note),
                Err(error) => Signal::CreateFailed(error),
            }
        });
    }
}
