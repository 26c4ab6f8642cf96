//! Runs a confirmed report selection against the report database.

use crate::error::Result;
use crate::navigation::NavigationState;
use crate::results::ResultTable;

/// Executes SQL text and returns the decoded result set.
///
/// The text is passed through as given. Callers that accept user input
/// are responsible for any validation.
pub trait QueryRunner {
    fn run(&self, sql: &str) -> Result<ResultTable>;
}

/// Run the selected report's query if the selection is armed.
///
/// Returns `None` without touching the runner unless the state is armed
/// and holds a non-empty query. After running, the armed flag is cleared
/// so later repaints do not re-run the query; the caller keeps the
/// returned outcome for display and the user re-confirms to run again.
pub fn maybe_execute(
    nav: &mut NavigationState,
    runner: &dyn QueryRunner,
) -> Option<Result<ResultTable>> {
    if !nav.is_armed() {
        return None;
    }

    let query = nav.selected_query().map(str::trim).filter(|q| !q.is_empty())?;

    tracing::info!("Executing report {:?}", nav.selected_id());
    let outcome = runner.run(query);

    match &outcome {
        Ok(table) => tracing::info!(
            "Report {:?} returned {} rows",
            nav.selected_id(),
            table.rows.len()
        ),
        Err(e) => tracing::warn!("Report {:?} failed: {}", nav.selected_id(), e),
    }

    nav.disarm();
    Some(outcome)
}
