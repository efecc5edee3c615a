//! Hacker News story search: the fetch state machine, search history,
//! persisted search term and the terminal front end that drives them.

pub mod aggregates;
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod hn_client;
pub mod models;
pub mod orchestrator;
pub mod reducer;

pub use app::{SearchApp, ViewState};
pub use config::Config;
pub use error::{FetchError, HistoryError};
pub use models::{StoryCollectionState, StoryRecord};
pub use reducer::{stories_reducer, StoriesAction};
