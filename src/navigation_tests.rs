use super::*;
use crate::db::ReportCatalog;
use crate::report_tree::CatalogRow;
use crate::error::{DbError, Result};
use std::cell::Cell;

/// Catalog fake that answers every query lookup with `SELECT <id>`.
#[derive(Default)]
struct FakeCatalog {
    fail: bool,
    lookups: Cell<usize>,
}

impl ReportCatalog for FakeCatalog {
    fn report_rows(&self) -> Result<Vec<CatalogRow>> {
        Ok(Vec::new())
    }

    fn report_query(&self, id: ReportId) -> Result<Option<String>> {
        self.lookups.set(self.lookups.get() + 1);
        if self.fail {
            Err(DbError::unavailable("catalog offline"))
        } else {
            Ok(Some(format!("SELECT {}", id)))
        }
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn first_click_opens_node() {
    let classifier = ClickClassifier::default();
    let history = HashMap::new();
    assert_eq!(
        classifier.classify(7, Instant::now(), &history),
        ClickKind::FirstClick
    );

    let mut nav = NavigationState::default();
    let kind = nav.handle_click(7, Instant::now(), &FakeCatalog::default());
    assert_eq!(kind, ClickKind::FirstClick);
    assert!(nav.is_expanded(7));
}

#[test]
fn slow_repeat_keeps_node_open() {
    let catalog = FakeCatalog::default();
    let mut nav = NavigationState::default();
    let t0 = Instant::now();

    nav.handle_click(2, t0, &catalog);
    assert_eq!(nav.handle_click(2, t0 + ms(600), &catalog), ClickKind::SlowRepeat);
    assert!(nav.is_expanded(2));
    assert_eq!(nav.handle_click(2, t0 + ms(1200), &catalog), ClickKind::SlowRepeat);
    assert!(nav.is_expanded(2));
}

#[test]
fn threshold_boundary_is_slow() {
    let classifier = ClickClassifier::default();
    let t0 = Instant::now();
    let history: HashMap<ReportId, Instant> = [(1, t0)].into();
    assert_eq!(classifier.classify(1, t0 + ms(499), &history), ClickKind::FastRepeat);
    assert_eq!(classifier.classify(1, t0 + ms(500), &history), ClickKind::SlowRepeat);
}

#[test]
fn fast_repeat_toggles_node() {
    let catalog = FakeCatalog::default();
    let mut nav = NavigationState::default();
    let t0 = Instant::now();

    nav.handle_click(2, t0, &catalog);
    assert_eq!(nav.handle_click(2, t0 + ms(200), &catalog), ClickKind::FastRepeat);
    assert!(!nav.is_expanded(2));
    assert_eq!(nav.handle_click(2, t0 + ms(300), &catalog), ClickKind::FastRepeat);
    assert!(nav.is_expanded(2));
}

#[test]
fn click_scenario_open_close_reopen() {
    let catalog = FakeCatalog::default();
    let mut nav = NavigationState::default();
    let t0 = Instant::now();

    nav.handle_click(2, t0, &catalog);
    assert_eq!(nav.expanded_ids(), &HashSet::from([2]));
    assert_eq!(nav.selected_id(), Some(2));

    nav.handle_click(2, t0 + ms(200), &catalog);
    assert!(nav.expanded_ids().is_empty());
    assert_eq!(nav.selected_id(), Some(2));

    // Entry already exists, so this is a slow repeat, which reopens
    let kind = nav.handle_click(2, t0 + ms(1000), &catalog);
    assert_eq!(kind, ClickKind::SlowRepeat);
    assert_eq!(nav.expanded_ids(), &HashSet::from([2]));
}

#[test]
fn windows_are_tracked_per_node() {
    let catalog = FakeCatalog::default();
    let mut nav = NavigationState::default();
    let t0 = Instant::now();

    nav.handle_click(1, t0, &catalog);
    nav.handle_click(2, t0 + ms(100), &catalog);
    assert_eq!(nav.handle_click(1, t0 + ms(700), &catalog), ClickKind::SlowRepeat);
    assert_eq!(nav.handle_click(2, t0 + ms(300), &catalog), ClickKind::FastRepeat);
    assert!(nav.is_expanded(1));
    assert!(!nav.is_expanded(2));
}

#[test]
fn selection_resets_armed_flag() {
    let catalog = FakeCatalog::default();
    let mut nav = NavigationState::default();
    let t0 = Instant::now();

    nav.handle_click(1, t0, &catalog);
    assert!(nav.arm());
    assert!(nav.is_armed());

    nav.handle_click(5, t0 + ms(50), &catalog);
    assert_eq!(nav.selected_id(), Some(5));
    assert_eq!(nav.selected_query(), Some("SELECT 5"));
    assert!(!nav.is_armed());
}

#[test]
fn query_is_fetched_on_every_click() {
    let catalog = FakeCatalog::default();
    let mut nav = NavigationState::default();
    let t0 = Instant::now();

    nav.handle_click(3, t0, &catalog);
    nav.handle_click(3, t0 + ms(900), &catalog);
    assert_eq!(catalog.lookups.get(), 2);
}

#[test]
fn catalog_failure_leaves_query_absent() {
    let catalog = FakeCatalog {
        fail: true,
        ..Default::default()
    };
    let mut nav = NavigationState::default();

    nav.handle_click(4, Instant::now(), &catalog);
    assert_eq!(nav.selected_id(), Some(4));
    assert_eq!(nav.selected_query(), None);
    assert!(nav.query_error().is_some_and(|e| e.contains("catalog offline")));
    assert!(nav.is_expanded(4));

    // A later successful lookup clears the error
    nav.handle_click(5, Instant::now(), &FakeCatalog::default());
    assert_eq!(nav.selected_query(), Some("SELECT 5"));
    assert_eq!(nav.query_error(), None);
}

#[test]
fn arm_requires_selection() {
    let mut nav = NavigationState::default();
    assert!(!nav.arm());
    assert!(!nav.is_armed());
}

#[test]
fn custom_threshold_is_respected() {
    let catalog = FakeCatalog::default();
    let mut nav = NavigationState::new(ClickClassifier::new(ms(100)));
    let t0 = Instant::now();

    nav.handle_click(1, t0, &catalog);
    assert_eq!(nav.handle_click(1, t0 + ms(200), &catalog), ClickKind::SlowRepeat);
    assert_eq!(nav.handle_click(1, t0 + ms(250), &catalog), ClickKind::FastRepeat);
}

#[test]
fn sessions_do_not_share_state() {
    let catalog = FakeCatalog::default();
    let mut alice = NavigationState::default();
    let bob = NavigationState::default();

    alice.handle_click(1, Instant::now(), &catalog);
    alice.arm();

    assert!(bob.expanded_ids().is_empty());
    assert_eq!(bob.selected_id(), None);
    assert!(!bob.is_armed());
}
