//! Report hierarchy built from the flat catalog table.
//!
//! The catalog stores one row per report with a pointer to its parent.
//! `build_tree` turns those rows into a forest, keeping sibling order equal
//! to row order. Rows whose parent is unknown are promoted to roots and
//! reported as orphans; rows that can only be reached through a cyclic
//! parent chain are left out and reported as skipped.

use std::collections::{HashMap, HashSet};

/// Identifier of a report in the catalog.
pub type ReportId = i64;

/// Parent id used by top-level reports.
pub const ROOT_ID: ReportId = 0;

/// One row of the catalog table.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub id: ReportId,
    pub label: String,
    pub parent_id: ReportId,
}

impl CatalogRow {
    pub fn new(id: ReportId, label: impl Into<String>, parent_id: ReportId) -> Self {
        Self {
            id,
            label: label.into(),
            parent_id,
        }
    }
}

/// One node in the report tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportNode {
    pub id: ReportId,
    pub label: String,
    pub parent_id: ReportId,
    /// Children in catalog row order
    pub children: Vec<ReportNode>,
}

impl ReportNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(ReportNode::subtree_len).sum::<usize>()
    }
}

/// Result of one `build_tree` call.
#[derive(Debug, Clone, Default)]
pub struct ReportTree {
    pub roots: Vec<ReportNode>,
    /// Ids of rows whose parent is not in the catalog (promoted to roots)
    pub orphans: Vec<ReportId>,
    /// Rows excluded because their parent chain loops back on itself
    pub skipped: Vec<CatalogRow>,
}

impl ReportTree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes in the forest.
    pub fn len(&self) -> usize {
        self.roots.iter().map(ReportNode::subtree_len).sum()
    }

    /// True when the catalog rows were not a clean forest.
    pub fn is_malformed(&self) -> bool {
        !self.orphans.is_empty() || !self.skipped.is_empty()
    }

    /// Depth-first lookup by id.
    pub fn find(&self, id: ReportId) -> Option<&ReportNode> {
        fn walk(nodes: &[ReportNode], id: ReportId) -> Option<&ReportNode> {
            for node in nodes {
                if node.id == id {
                    return Some(node);
                }
                if let Some(found) = walk(&node.children, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.roots, id)
    }
}

/// Build the report forest from catalog rows.
///
/// Never fails: empty input gives an empty tree, dangling parents become
/// roots, and cycles are cut using the set of ids on the current
/// root-to-node path. A report listed under two parents (two rows) appears
/// under both, but every row is emitted at most once, so the tree never has
/// more nodes than there are rows.
pub fn build_tree(rows: &[CatalogRow], root: ReportId) -> ReportTree {
    let known: HashSet<ReportId> = rows.iter().map(|r| r.id).collect();

    let mut top_level = Vec::new();
    let mut orphans = Vec::new();
    let mut by_parent: HashMap<ReportId, Vec<usize>> = HashMap::new();

    for (idx, row) in rows.iter().enumerate() {
        if row.parent_id == root {
            top_level.push(idx);
        } else if !known.contains(&row.parent_id) {
            top_level.push(idx);
            orphans.push(row.id);
        } else {
            by_parent.entry(row.parent_id).or_default().push(idx);
        }
    }

    let mut walk = Walk {
        rows,
        by_parent: &by_parent,
        path: HashSet::new(),
        emitted: vec![false; rows.len()],
    };

    let roots: Vec<ReportNode> = top_level
        .into_iter()
        .filter_map(|idx| walk.node(idx))
        .collect();

    let skipped = rows
        .iter()
        .zip(&walk.emitted)
        .filter(|(_, emitted)| !**emitted)
        .map(|(row, _)| row.clone())
        .collect();

    ReportTree {
        roots,
        orphans,
        skipped,
    }
}

// ---------------------------------------------------------------------------
// Tree construction helpers
// ---------------------------------------------------------------------------

struct Walk<'a> {
    rows: &'a [CatalogRow],
    by_parent: &'a HashMap<ReportId, Vec<usize>>,
    /// Ids on the current root-to-node path
    path: HashSet<ReportId>,
    emitted: Vec<bool>,
}

impl Walk<'_> {
    fn node(&mut self, idx: usize) -> Option<ReportNode> {
        let rows = self.rows;
        let row = &rows[idx];
        // Each row is placed once; a repeated id under a second parent row
        // only carries its subtree the first time it is reached.
        if self.emitted[idx] || !self.path.insert(row.id) {
            return None;
        }
        self.emitted[idx] = true;

        let by_parent = self.by_parent;
        let children = by_parent
            .get(&row.id)
            .map(|kids| kids.iter().filter_map(|&kid| self.node(kid)).collect())
            .unwrap_or_default();

        self.path.remove(&row.id);

        Some(ReportNode {
            id: row.id,
            label: row.label.clone(),
            parent_id: row.parent_id,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(nodes: &[ReportNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.label.as_str()).collect()
    }

    #[test]
    fn test_empty_rows_give_empty_tree() {
        let tree = build_tree(&[], ROOT_ID);
        assert!(tree.is_empty());
        assert!(!tree.is_malformed());
    }

    #[test]
    fn test_sales_hierarchy() {
        let rows = vec![
            CatalogRow::new(1, "Sales", 0),
            CatalogRow::new(2, "Sales-US", 1),
            CatalogRow::new(3, "Sales-EU", 1),
        ];
        let tree = build_tree(&rows, ROOT_ID);

        assert_eq!(labels(&tree.roots), vec!["Sales"]);
        assert_eq!(labels(&tree.roots[0].children), vec!["Sales-US", "Sales-EU"]);
        assert!(tree.roots[0].children.iter().all(|c| c.is_leaf()));
    }

    #[test]
    fn test_sibling_order_follows_rows() {
        let rows = vec![
            CatalogRow::new(5, "Zeta", 0),
            CatalogRow::new(4, "Alpha", 0),
            CatalogRow::new(9, "Mid", 0),
        ];
        let tree = build_tree(&rows, ROOT_ID);
        assert_eq!(labels(&tree.roots), vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_acyclic_rows_keep_every_node() {
        // Children listed before their parents, several levels deep
        let rows = vec![
            CatalogRow::new(7, "Q1", 6),
            CatalogRow::new(6, "2024", 2),
            CatalogRow::new(2, "Finance", 0),
            CatalogRow::new(3, "HR", 0),
            CatalogRow::new(8, "Q2", 6),
            CatalogRow::new(9, "Headcount", 3),
        ];
        let tree = build_tree(&rows, ROOT_ID);

        assert_eq!(tree.len(), rows.len());
        assert!(tree.skipped.is_empty());

        fn check_parents(nodes: &[ReportNode]) {
            for node in nodes {
                for child in &node.children {
                    assert_eq!(child.parent_id, node.id);
                }
                check_parents(&node.children);
            }
        }
        check_parents(&tree.roots);

        let year = tree.find(6).expect("2024 should be in the tree");
        assert_eq!(labels(&year.children), vec!["Q1", "Q2"]);
    }

    #[test]
    fn test_dangling_parent_becomes_orphan_root() {
        let rows = vec![
            CatalogRow::new(1, "Sales", 0),
            CatalogRow::new(2, "Lost", 42),
        ];
        let tree = build_tree(&rows, ROOT_ID);

        assert_eq!(labels(&tree.roots), vec!["Sales", "Lost"]);
        assert_eq!(tree.orphans, vec![2]);
        assert!(tree.is_malformed());
    }

    #[test]
    fn test_two_node_cycle_terminates() {
        let rows = vec![
            CatalogRow::new(1, "Sales", 0),
            CatalogRow::new(10, "A", 11),
            CatalogRow::new(11, "B", 10),
        ];
        let tree = build_tree(&rows, ROOT_ID);

        assert_eq!(labels(&tree.roots), vec!["Sales"]);
        let skipped: Vec<ReportId> = tree.skipped.iter().map(|r| r.id).collect();
        assert!(skipped.contains(&10) || skipped.contains(&11));
    }

    #[test]
    fn test_self_reference_is_skipped() {
        let rows = vec![CatalogRow::new(3, "Loop", 3)];
        let tree = build_tree(&rows, ROOT_ID);
        assert!(tree.is_empty());
        assert_eq!(tree.skipped.len(), 1);
    }

    #[test]
    fn test_cycle_back_to_ancestor_is_cut_on_path() {
        // Second row for id 1 hangs under 2, which is itself under 1
        let rows = vec![
            CatalogRow::new(1, "Sales", 0),
            CatalogRow::new(2, "Sales-US", 1),
            CatalogRow::new(1, "Sales again", 2),
        ];
        let tree = build_tree(&rows, ROOT_ID);

        assert_eq!(tree.len(), 2);
        assert!(tree.roots[0].children[0].is_leaf());
        assert_eq!(tree.skipped, vec![CatalogRow::new(1, "Sales again", 2)]);
    }

    #[test]
    fn test_report_under_two_parents_appears_twice() {
        let rows = vec![
            CatalogRow::new(1, "Sales", 0),
            CatalogRow::new(2, "Finance", 0),
            CatalogRow::new(3, "Revenue", 1),
            CatalogRow::new(3, "Revenue", 2),
        ];
        let tree = build_tree(&rows, ROOT_ID);

        assert_eq!(labels(&tree.roots[0].children), vec!["Revenue"]);
        assert_eq!(labels(&tree.roots[1].children), vec!["Revenue"]);
        assert!(tree.skipped.is_empty());
    }

    #[test]
    fn test_stacked_diamonds_stay_bounded() {
        // Each level lists ids 2k and 2k+1 under both ids of the level above
        let levels = 20;
        let mut rows = vec![CatalogRow::new(2, "A0", 0), CatalogRow::new(3, "B0", 0)];
        for k in 1..levels {
            let (a, b) = (2 * k + 2, 2 * k + 3);
            for parent in [2 * k, 2 * k + 1] {
                rows.push(CatalogRow::new(a, format!("A{}", k), parent));
                rows.push(CatalogRow::new(b, format!("B{}", k), parent));
            }
        }

        let tree = build_tree(&rows, ROOT_ID);

        assert!(tree.len() <= rows.len());
        assert_eq!(labels(&tree.roots), vec!["A0", "B0"]);
        // The deepest level is still reachable
        assert!(tree.find(2 * (levels - 1) + 2).is_some());
    }

    #[test]
    fn test_shared_child_subtree_is_placed_once() {
        let rows = vec![
            CatalogRow::new(1, "Sales", 0),
            CatalogRow::new(2, "Finance", 0),
            CatalogRow::new(3, "Revenue", 1),
            CatalogRow::new(3, "Revenue", 2),
            CatalogRow::new(4, "By region", 3),
        ];
        let tree = build_tree(&rows, ROOT_ID);

        assert_eq!(tree.len(), rows.len());
        assert_eq!(labels(&tree.roots[0].children[0].children), vec!["By region"]);
        assert!(tree.roots[1].children[0].is_leaf());
        assert!(tree.skipped.is_empty());
    }

    #[test]
    fn test_builds_are_independent() {
        let rows = vec![CatalogRow::new(1, "Sales", 0)];
        let first = build_tree(&rows, ROOT_ID);
        let second = build_tree(&[CatalogRow::new(1, "Renamed", 0)], ROOT_ID);
        assert_eq!(first.roots[0].label, "Sales");
        assert_eq!(second.roots[0].label, "Renamed");
    }

    #[test]
    fn test_custom_root_sentinel() {
        let rows = vec![
            CatalogRow::new(1, "Top", -1),
            CatalogRow::new(2, "Child", 1),
        ];
        let tree = build_tree(&rows, -1);
        assert_eq!(labels(&tree.roots), vec!["Top"]);
        assert!(tree.orphans.is_empty());
    }
}
