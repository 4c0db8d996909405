//! Client-side synchronization for the notes service.
//!
//! A [`Session`] keeps an in-memory snapshot of the remote notes collection
//! current: it loads on mount, reloads after every successful create, and
//! exposes the result as a [`View`].

pub mod api;
pub mod config;
pub mod dto;
pub mod models;
pub mod session;
pub mod store;
pub mod view;

pub use api::{ApiClient, ApiError, NotesApi};
pub use config::Config;
pub use models::Note;
pub use session::{Session, Signal};
pub use view::{View, ViewState};
