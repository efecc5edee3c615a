use tokio::sync::watch;

use crate::error::HistoryError;

/// Append-only log of issued search queries.
///
/// Each entry is the full query URL (`endpoint` followed by the encoded
/// term). The last entry is the current query, and subscribers are told
/// whenever it changes.
pub struct SearchHistory {
    endpoint: String,
    issued_queries: Vec<String>,
    current_tx: watch::Sender<Option<String>>,
}

impl SearchHistory {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let (current_tx, _) = watch::channel(None);
        Self {
            endpoint: endpoint.into(),
            issued_queries: Vec::new(),
            current_tx,
        }
    }

    /// History holding a single seed entry for `term`.
    pub fn seeded(endpoint: impl Into<String>, term: &str) -> Self {
        let mut history = Self::new(endpoint);
        history.append(term);
        history
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query URL for `term`.
    pub fn canonicalize(&self, term: &str) -> String {
        format!("{}{}", self.endpoint, urlencoding::encode(term))
    }

    /// Records a search for `term` and returns the new current query.
    /// Empty terms are accepted; deciding whether to submit them is the
    /// caller's business.
    pub fn append(&mut self, term: &str) -> String {
        let query = self.canonicalize(term);
        self.issued_queries.push(query.clone());

        // Re-issuing the current query does not notify: nothing to refetch.
        self.current_tx.send_if_modified(|current| {
            if current.as_deref() == Some(query.as_str()) {
                false
            } else {
                *current = Some(query.clone());
                true
            }
        });

        tracing::debug!(query = %query, entries = self.issued_queries.len(), "search appended");
        query
    }

    pub fn current_query(&self) -> Result<&str, HistoryError> {
        self.issued_queries
            .last()
            .map(String::as_str)
            .ok_or(HistoryError::EmptyHistory)
    }

    /// Display terms of the last `n` issued queries, oldest first.
    /// Repeated searches show up once per time they were issued.
    pub fn recent_terms(&self, n: usize) -> Vec<String> {
        let start = self.issued_queries.len().saturating_sub(n);
        self.issued_queries[start..]
            .iter()
            .map(|query| self.extract_term(query))
            .collect()
    }

    fn extract_term(&self, query: &str) -> String {
        let encoded = query.strip_prefix(self.endpoint.as_str()).unwrap_or(query);
        match urlencoding::decode(encoded) {
            Ok(term) => term.into_owned(),
            Err(_) => encoded.to_string(),
        }
    }

    /// Receiver for "current query changed" notifications. The value is
    /// `None` until the first append.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current_tx.subscribe()
    }

    pub fn issued_queries(&self) -> &[String] {
        &self.issued_queries
    }

    pub fn len(&self) -> usize {
        self.issued_queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued_queries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://hn.algolia.com/api/v1/search?query=";

    #[test]
    fn unseeded_history_has_no_current_query() {
        let history = SearchHistory::new(ENDPOINT);
        assert_eq!(history.current_query(), Err(HistoryError::EmptyHistory));
        assert!(history.recent_terms(5).is_empty());
    }

    #[test]
    fn append_grows_by_one_and_sets_current() {
        let mut history = SearchHistory::seeded(ENDPOINT, "React");
        assert_eq!(history.len(), 1);

        let query = history.append("Redux");
        assert_eq!(history.len(), 2);
        assert_eq!(query, format!("{}Redux", ENDPOINT));
        assert_eq!(history.current_query().unwrap(), query);
    }

    #[test]
    fn empty_term_is_still_a_query() {
        let mut history = SearchHistory::new(ENDPOINT);
        let query = history.append("");
        assert_eq!(query, ENDPOINT);
        assert_eq!(history.recent_terms(5), vec![String::new()]);
    }

    #[test]
    fn terms_are_encoded_and_decoded() {
        let mut history = SearchHistory::new(ENDPOINT);
        let query = history.append("rust async & await");
        assert_eq!(query, format!("{}rust%20async%20%26%20await", ENDPOINT));
        assert_eq!(history.recent_terms(1), vec!["rust async & await".to_string()]);
    }

    #[test]
    fn recent_terms_keeps_order_and_duplicates() {
        let mut history = SearchHistory::new(ENDPOINT);
        for term in ["a", "b", "a", "c", "d", "e"] {
            history.append(term);
        }
        assert_eq!(history.recent_terms(5), vec!["b", "a", "c", "d", "e"]);
        assert_eq!(history.recent_terms(100).len(), 6);
        assert!(history.recent_terms(0).is_empty());
    }

    #[test]
    fn subscribers_only_see_changes_of_the_current_query() {
        let mut history = SearchHistory::seeded(ENDPOINT, "React");
        let mut rx = history.subscribe();
        assert_eq!(rx.borrow_and_update().as_deref(), Some(format!("{}React", ENDPOINT).as_str()));

        history.append("React");
        assert!(!rx.has_changed().unwrap());
        assert_eq!(history.len(), 2);

        history.append("Redux");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_deref(), Some(format!("{}Redux", ENDPOINT).as_str()));
    }
}
