//! Collapsible report tree drawn one clickable row per node.
//!
//! Children of a node are only drawn while that node is expanded in the
//! session's `NavigationState`; collapsed subtrees are not laid out at all.

use std::collections::HashMap;
use std::time::Instant;

use eframe::egui::{RichText, Ui};

use crate::db::ReportCatalog;
use crate::navigation::NavigationState;
use crate::report_tree::{ReportId, ReportNode};
use crate::theme;

/// Horizontal indent per tree level, in points.
pub const INDENT_PER_LEVEL: f32 = 16.0;

/// What one render pass of the tree did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeOutcome {
    /// Any row was clicked
    pub clicked: bool,
    /// Rows drawn
    pub drawn: usize,
}

/// Widget key for the row at `path`, unique across the whole tree.
///
/// A report listed under two parents is drawn twice, so the key is built
/// from the segments of every ancestor rather than from the id alone.
pub fn node_key(path: &[String]) -> String {
    format!("node-{}", path.join("/"))
}

/// Path segment for each node of one sibling list. Siblings sharing an id
/// get a `#n` suffix from their second occurrence on.
fn segments(nodes: &[ReportNode]) -> Vec<String> {
    let mut seen: HashMap<ReportId, usize> = HashMap::new();
    nodes
        .iter()
        .map(|node| {
            let count = seen.entry(node.id).or_insert(0);
            *count += 1;
            if *count == 1 {
                node.id.to_string()
            } else {
                format!("{}#{}", node.id, *count)
            }
        })
        .collect()
}

pub fn indent_width(depth: usize) -> f32 {
    depth as f32 * INDENT_PER_LEVEL
}

fn row_text(node: &ReportNode, expanded: bool) -> RichText {
    let (icon, color) = if node.is_leaf() {
        ("📄", theme::tree::CLOSED)
    } else if expanded {
        ("📂", theme::tree::OPEN)
    } else {
        ("📁", theme::tree::CLOSED)
    };
    RichText::new(format!("{} {}", icon, node.label)).color(color)
}

/// Draw the forest, applying clicks to `nav` as they happen.
///
/// A click is handled before the clicked node's children are considered,
/// so expanding a node draws its children in the same pass.
pub fn show_tree(
    ui: &mut Ui,
    roots: &[ReportNode],
    nav: &mut NavigationState,
    catalog: &dyn ReportCatalog,
) -> TreeOutcome {
    let mut outcome = TreeOutcome::default();
    show_level(ui, roots, &mut Vec::new(), nav, catalog, &mut outcome);
    outcome
}

fn show_level(
    ui: &mut Ui,
    nodes: &[ReportNode],
    path: &mut Vec<String>,
    nav: &mut NavigationState,
    catalog: &dyn ReportCatalog,
    outcome: &mut TreeOutcome,
) {
    for (node, segment) in nodes.iter().zip(segments(nodes)) {
        path.push(segment);
        let depth = path.len() - 1;
        let selected = nav.selected_id() == Some(node.id);
        let text = row_text(node, nav.is_expanded(node.id));

        let response = ui
            .push_id(node_key(path), |ui| {
                ui.horizontal(|ui| {
                    ui.add_space(indent_width(depth));
                    ui.selectable_label(selected, text)
                })
                .inner
            })
            .inner;
        outcome.drawn += 1;

        if response.clicked() {
            nav.handle_click(node.id, Instant::now(), catalog);
            outcome.clicked = true;
        }

        if nav.is_expanded(node.id) && !node.is_leaf() {
            show_level(ui, &node.children, path, nav, catalog, outcome);
        }
        path.pop();
    }
}
