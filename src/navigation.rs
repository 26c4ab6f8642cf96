//! Per-session navigation state for the report tree.
//!
//! Tracks which nodes are expanded, which report is selected and whether
//! the selection has been confirmed for execution. Clicks are classified
//! per node by the time since that node's previous click: a quick repeat
//! toggles the node, anything slower (or the first click) opens it.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::db::ReportCatalog;
use crate::report_tree::ReportId;

/// Default window inside which a repeat click counts as a double click.
pub const DOUBLE_CLICK_THRESHOLD: Duration = Duration::from_millis(500);

/// How a click on a tree node was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// The node has never been clicked in this session
    FirstClick,
    /// Repeat click outside the double-click window
    SlowRepeat,
    /// Repeat click inside the double-click window
    FastRepeat,
}

/// Classifies clicks using a fixed per-node time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickClassifier {
    threshold: Duration,
}

impl ClickClassifier {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn classify(
        &self,
        id: ReportId,
        now: Instant,
        last_click_at: &HashMap<ReportId, Instant>,
    ) -> ClickKind {
        match last_click_at.get(&id) {
            None => ClickKind::FirstClick,
            Some(&last) if now.saturating_duration_since(last) < self.threshold => {
                ClickKind::FastRepeat
            }
            Some(_) => ClickKind::SlowRepeat,
        }
    }
}

impl Default for ClickClassifier {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_THRESHOLD)
    }
}

/// Navigation state owned by one browsing session.
///
/// Nodes are referenced by id only, so the state survives a catalog reload
/// that rebuilds the tree. Ids that vanish from the catalog simply never
/// match again.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    classifier: ClickClassifier,
    expanded_ids: HashSet<ReportId>,
    selected_id: Option<ReportId>,
    selected_query: Option<String>,
    /// Why the last query lookup failed, if it did
    query_error: Option<String>,
    execution_armed: bool,
    last_click_at: HashMap<ReportId, Instant>,
}

impl NavigationState {
    pub fn new(classifier: ClickClassifier) -> Self {
        Self {
            classifier,
            ..Default::default()
        }
    }

    pub fn is_expanded(&self, id: ReportId) -> bool {
        self.expanded_ids.contains(&id)
    }

    pub fn expanded_ids(&self) -> &HashSet<ReportId> {
        &self.expanded_ids
    }

    pub fn selected_id(&self) -> Option<ReportId> {
        self.selected_id
    }

    pub fn selected_query(&self) -> Option<&str> {
        self.selected_query.as_deref()
    }

    pub fn query_error(&self) -> Option<&str> {
        self.query_error.as_deref()
    }

    pub fn is_armed(&self) -> bool {
        self.execution_armed
    }

    /// Handle a click on a tree node.
    ///
    /// Applies the expand/collapse effect for the click kind, records the
    /// click time and replaces the selection with `id` and its freshly
    /// fetched query. A catalog failure leaves the query absent and is kept
    /// in `query_error`.
    pub fn handle_click(
        &mut self,
        id: ReportId,
        now: Instant,
        catalog: &dyn ReportCatalog,
    ) -> ClickKind {
        let kind = self.classifier.classify(id, now, &self.last_click_at);

        match kind {
            ClickKind::FirstClick | ClickKind::SlowRepeat => {
                self.expanded_ids.insert(id);
            }
            ClickKind::FastRepeat => {
                if !self.expanded_ids.remove(&id) {
                    self.expanded_ids.insert(id);
                }
            }
        }

        self.last_click_at.insert(id, now);

        self.selected_id = Some(id);
        (self.selected_query, self.query_error) = match catalog.report_query(id) {
            Ok(query) => (query, None),
            Err(e) => {
                tracing::warn!("Failed to fetch query for report {}: {}", id, e);
                (None, Some(e.to_string()))
            }
        };
        self.execution_armed = false;

        tracing::debug!(
            "Report {} clicked ({:?}), expanded={}",
            id,
            kind,
            self.is_expanded(id)
        );

        kind
    }

    /// Confirm the current selection for execution.
    ///
    /// Returns false (and stays disarmed) when nothing is selected.
    pub fn arm(&mut self) -> bool {
        if self.selected_id.is_some() {
            self.execution_armed = true;
        }
        self.execution_armed
    }

    /// Clear the armed flag once the confirmed query has been run.
    pub fn disarm(&mut self) {
        self.execution_armed = false;
    }
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod tests;
