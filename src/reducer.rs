use std::sync::Arc;

use crate::models::{StoryCollectionState, StoryRecord};

/// Everything that may change the story collection.
#[derive(Debug, Clone, PartialEq)]
pub enum StoriesAction {
    FetchInit,
    FetchSuccess(Vec<StoryRecord>),
    FetchFailure,
    RemoveStory(String),
}

/// Pure transition function for the story collection. The match is
/// exhaustive, so an unknown action cannot be constructed.
pub fn stories_reducer(
    state: &StoryCollectionState,
    action: StoriesAction,
) -> StoryCollectionState {
    match action {
        StoriesAction::FetchInit => StoryCollectionState {
            is_loading: true,
            is_error: false,
            ..state.clone()
        },
        StoriesAction::FetchSuccess(payload) => StoryCollectionState {
            items: Arc::from(payload),
            is_loading: false,
            is_error: false,
        },
        StoriesAction::FetchFailure => StoryCollectionState {
            is_loading: false,
            is_error: true,
            ..state.clone()
        },
        StoriesAction::RemoveStory(id) => {
            // Keep the same allocation when nothing matches so memoized
            // consumers see an unchanged input.
            if !state.items.iter().any(|story| story.id == id) {
                return state.clone();
            }
            let remaining: Vec<StoryRecord> = state
                .items
                .iter()
                .filter(|story| story.id != id)
                .cloned()
                .collect();
            StoryCollectionState {
                items: Arc::from(remaining),
                ..state.clone()
            }
        }
    }
}
