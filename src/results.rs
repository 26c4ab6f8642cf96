//! Tabular query results and the table widget that displays them.

use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::theme;

/// One decoded cell of a result set.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Numeric view of the cell, used for chart axes.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_))
    }

    /// Text shown in tables and used as a chart category.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(v) => v.to_string(),
            CellValue::Int(v) => v.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

/// Ordered columns plus rows of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// A column is numeric when it has at least one number and nothing
    /// but numbers and nulls.
    pub fn is_numeric_column(&self, col: usize) -> bool {
        let mut seen_number = false;
        for row in &self.rows {
            match row.get(col) {
                Some(v) if v.is_numeric() => seen_number = true,
                Some(CellValue::Null) | None => {}
                Some(_) => return false,
            }
        }
        seen_number
    }

    /// Indices of numeric columns, in column order.
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&c| self.is_numeric_column(c))
            .collect()
    }
}

/// Render a result set as a striped, resizable table.
pub fn render_table(ui: &mut Ui, id_salt: &str, table: &ResultTable) {
    ui.label(
        RichText::new(format!(
            "{} rows × {} columns",
            table.rows.len(),
            table.columns.len()
        ))
        .small()
        .color(theme::text::MUTED),
    );

    let available_height = ui.available_height().min(360.0);

    ui.push_id(id_salt, |ui| {
        egui::ScrollArea::horizontal().show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::auto().at_least(80.0), table.columns.len())
                .min_scrolled_height(0.0)
                .max_scroll_height(available_height)
                .header(20.0, |mut header| {
                    for name in &table.columns {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(20.0, table.rows.len(), |mut row| {
                        let idx = row.index();
                        for col in 0..table.columns.len() {
                            row.col(|ui| match table.cell(idx, col) {
                                Some(CellValue::Null) | None => {
                                    ui.label(RichText::new("NULL").color(theme::text::MUTED));
                                }
                                Some(value) if value.is_numeric() => {
                                    ui.label(RichText::new(value.display()).monospace());
                                }
                                Some(value) => {
                                    ui.label(value.display());
                                }
                            });
                        }
                    });
                });
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultTable {
        ResultTable::new(
            vec!["region".into(), "units".into(), "price".into(), "note".into()],
            vec![
                vec![
                    CellValue::Text("US".into()),
                    CellValue::Int(4),
                    CellValue::Float(2.5),
                    CellValue::Null,
                ],
                vec![
                    CellValue::Text("EU".into()),
                    CellValue::Null,
                    CellValue::Float(1.0),
                    CellValue::Null,
                ],
            ],
        )
    }

    #[test]
    fn test_numeric_columns_ignore_nulls() {
        assert_eq!(sample().numeric_columns(), vec![1, 2]);
    }

    #[test]
    fn test_all_null_column_is_not_numeric() {
        assert!(!sample().is_numeric_column(3));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Int(42).display(), "42");
        assert_eq!(CellValue::Bool(true).display(), "true");
        assert_eq!(CellValue::Null.display(), "");
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
    }
}
