use std::sync::Arc;

use crate::models::StoryRecord;

pub fn total_comments(items: &[StoryRecord]) -> u64 {
    items.iter().map(|story| u64::from(story.comment_count)).sum()
}

/// Memoized [`total_comments`]. The sum is only recomputed when handed a
/// different `Arc` than last time; the reducer keeps the same `Arc` for
/// transitions that leave the items untouched.
#[derive(Default)]
pub struct CommentTotal {
    input: Option<Arc<[StoryRecord]>>,
    total: u64,
    recomputations: usize,
}

impl CommentTotal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, items: &Arc<[StoryRecord]>) -> u64 {
        if let Some(previous) = &self.input {
            if Arc::ptr_eq(previous, items) {
                return self.total;
            }
        }

        self.total = total_comments(items);
        self.input = Some(Arc::clone(items));
        self.recomputations += 1;
        self.total
    }

    /// How many times the sum was actually computed.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str, comments: u32) -> StoryRecord {
        StoryRecord {
            id: id.to_string(),
            title: format!("story {}", id),
            url: String::new(),
            author: "a".to_string(),
            comment_count: comments,
            points: 0,
            created_at: None,
        }
    }

    #[test]
    fn sums_comment_counts() {
        assert_eq!(total_comments(&[]), 0);
        assert_eq!(total_comments(&[story("0", 3), story("1", 2)]), 5);
    }

    #[test]
    fn memo_skips_unchanged_inputs() {
        let items: Arc<[StoryRecord]> = Arc::from(vec![story("0", 3), story("1", 2)]);
        let mut memo = CommentTotal::new();

        assert_eq!(memo.get(&items), 5);
        assert_eq!(memo.get(&items), 5);
        assert_eq!(memo.recomputations(), 1);

        let fewer: Arc<[StoryRecord]> = Arc::from(vec![story("0", 3)]);
        assert_eq!(memo.get(&fewer), 3);
        assert_eq!(memo.recomputations(), 2);
    }

    #[test]
    fn memo_keys_on_the_allocation_not_the_content() {
        let items: Arc<[StoryRecord]> = Arc::from(vec![story("0", 3), story("1", 2)]);
        let copy: Arc<[StoryRecord]> = Arc::from(items.to_vec());
        let mut memo = CommentTotal::new();

        assert_eq!(memo.get(&items), 5);
        assert_eq!(memo.get(&copy), 5);
        assert_eq!(memo.recomputations(), 2);
        assert_eq!(memo.get(&copy), 5);
        assert_eq!(memo.recomputations(), 2);
    }
}
