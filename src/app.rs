use std::sync::Arc;

use tokio::sync::watch;

use crate::aggregates::CommentTotal;
use crate::config::Config;
use crate::db::{PreferenceStore, SemiPersistentState};
use crate::history::SearchHistory;
use crate::models::{StoryCollectionState, StoryRecord};
use crate::orchestrator::FetchEvent;
use crate::reducer::{stories_reducer, StoriesAction};

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub items: Arc<[StoryRecord]>,
    /// `items` after the optional live title filter.
    pub visible_items: Vec<StoryRecord>,
    pub is_loading: bool,
    pub is_error: bool,
    pub search_term: String,
    pub current_query: String,
    pub recent_terms: Vec<String>,
    pub total_comments: u64,
}

/// Owns the story collection, the search history and the persisted search
/// term, and turns user and fetch events into state changes.
///
/// All mutation goes through `&mut self`, so whoever drives the app applies
/// events one at a time in the order they arrive.
pub struct SearchApp<S: PreferenceStore> {
    config: Config,
    stories: StoryCollectionState,
    latest_seq: Option<u64>,
    history: SearchHistory,
    search_term: SemiPersistentState<S>,
    comment_total: CommentTotal,
}

impl<S: PreferenceStore> SearchApp<S> {
    /// Restores the last search term (or the configured default) and seeds
    /// the history with it.
    pub fn new(config: Config, store: S) -> Self {
        let search_term = SemiPersistentState::new(
            store,
            config.preference_key.clone(),
            &config.default_term,
        );
        let history = SearchHistory::seeded(config.endpoint.clone(), search_term.get());
        tracing::info!(term = %search_term.get(), "search app ready");

        Self {
            config,
            stories: StoryCollectionState::default(),
            latest_seq: None,
            history,
            search_term,
            comment_total: CommentTotal::new(),
        }
    }

    /// Notifications the fetch orchestrator listens to.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.history.subscribe()
    }

    pub fn on_search_input(&mut self, raw: &str) {
        self.search_term.set(raw);
    }

    /// Submits the typed term. Blank terms are not submitted.
    pub fn on_search_submit(&mut self) -> Option<String> {
        let term = self.search_term.get().to_string();
        if term.trim().is_empty() {
            tracing::debug!("ignoring blank search");
            return None;
        }
        Some(self.history.append(&term))
    }

    pub fn on_recent_search_selected(&mut self, term: &str) -> Option<String> {
        self.on_search_input(term);
        self.on_search_submit()
    }

    pub fn on_remove_item(&mut self, id: &str) {
        self.dispatch(StoriesAction::RemoveStory(id.to_string()));
    }

    /// Applies one orchestrator event. Returns false when the event was a
    /// stale completion that got discarded.
    pub fn handle_fetch_event(&mut self, event: FetchEvent) -> bool {
        match event {
            FetchEvent::Started { seq, .. } => {
                self.latest_seq = Some(self.latest_seq.map_or(seq, |latest| latest.max(seq)));
                self.dispatch(StoriesAction::FetchInit);
                true
            }
            FetchEvent::Completed { seq, query, outcome } => {
                if self.config.fence_stale_responses && self.latest_seq != Some(seq) {
                    tracing::debug!(
                        seq,
                        latest = ?self.latest_seq,
                        query = %query,
                        "discarding stale response"
                    );
                    return false;
                }
                match outcome {
                    Ok(stories) => self.dispatch(StoriesAction::FetchSuccess(stories)),
                    Err(_) => self.dispatch(StoriesAction::FetchFailure),
                }
                true
            }
        }
    }

    pub fn dispatch(&mut self, action: StoriesAction) {
        self.stories = stories_reducer(&self.stories, action);
    }

    pub fn stories(&self) -> &StoryCollectionState {
        &self.stories
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn search_term(&self) -> &str {
        self.search_term.get()
    }

    pub fn total_comments(&mut self) -> u64 {
        self.comment_total.get(&self.stories.items)
    }

    pub fn comment_total_recomputations(&self) -> usize {
        self.comment_total.recomputations()
    }

    pub fn view(&mut self) -> ViewState {
        let total_comments = self.total_comments();
        let search_term = self.search_term.get().to_string();

        let visible_items = if self.config.live_title_filter {
            let needle = search_term.to_lowercase();
            self.stories
                .items
                .iter()
                .filter(|story| story.title.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        } else {
            self.stories.items.to_vec()
        };

        ViewState {
            items: Arc::clone(&self.stories.items),
            visible_items,
            is_loading: self.stories.is_loading,
            is_error: self.stories.is_error,
            search_term,
            current_query: self.history.current_query().unwrap_or_default().to_string(),
            recent_terms: self.history.recent_terms(self.config.recent_limit),
            total_comments,
        }
    }
}
