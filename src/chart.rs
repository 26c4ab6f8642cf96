//! Charts over a report result set.
//!
//! Series are prepared by plain functions over a `ResultTable` and then
//! drawn with egui_plot. Rows whose Y cell is not numeric are ignored.

use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use eframe::egui::{self, RichText, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints,
    Points, Polygon,
};
use serde::{Deserialize, Serialize};

use crate::results::ResultTable;
use crate::theme;

/// Number of equal-width bins for numeric histograms.
pub const HISTOGRAM_BINS: usize = 10;

const CHART_HEIGHT: f32 = 320.0;
const PIE_SEGMENTS: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
    Scatter,
    Histogram,
    Box,
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Histogram => "Histogram",
            ChartKind::Box => "Box Plot",
        }
    }

    pub fn all() -> &'static [ChartKind] {
        &[
            ChartKind::Bar,
            ChartKind::Line,
            ChartKind::Pie,
            ChartKind::Scatter,
            ChartKind::Histogram,
            ChartKind::Box,
        ]
    }
}

/// Chart kind plus the column picks for the current result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSelection {
    pub kind: ChartKind,
    pub x: usize,
    /// Always a numeric column, `None` when the result has none
    pub y: Option<usize>,
}

impl ChartSelection {
    /// Default picks for a fresh result: first column on X, first numeric
    /// column on Y.
    pub fn for_table(kind: ChartKind, table: &ResultTable) -> Self {
        Self {
            kind,
            x: 0,
            y: table.numeric_columns().first().copied(),
        }
    }
}

/// Y summed per distinct X value, in first-appearance order.
pub fn category_totals(table: &ResultTable, x: usize, y: usize) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for (row, value) in numeric_rows(table, y) {
        let key = table.cell(row, x).map(|c| c.display()).unwrap_or_default();
        match totals.iter_mut().find(|(k, _)| *k == key) {
            Some((_, total)) => *total += value,
            None => totals.push((key, value)),
        }
    }
    totals
}

/// Points in row order. A numeric X uses its value, anything else the
/// row index.
pub fn xy_points(table: &ResultTable, x: usize, y: usize) -> Vec<[f64; 2]> {
    let numeric_x = table.is_numeric_column(x);
    numeric_rows(table, y)
        .filter_map(|(row, value)| {
            if numeric_x {
                table.cell(row, x).and_then(|c| c.as_f64()).map(|xv| [xv, value])
            } else {
                Some([row as f64, value])
            }
        })
        .collect()
}

/// One histogram bucket covering `[start, end)` (the last bin is closed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub total: f64,
}

/// Split (x, y) pairs into `bins` equal-width buckets over the X range
/// and sum Y per bucket.
pub fn histogram_bins(points: &[[f64; 2]], bins: usize) -> Vec<HistogramBin> {
    if points.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);

    // All X equal: a single unit-wide bin
    if max <= min {
        let total = points.iter().map(|p| p[1]).sum();
        return vec![HistogramBin {
            start: min,
            end: min + 1.0,
            total,
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            total: 0.0,
        })
        .collect();

    for p in points {
        let idx = (((p[0] - min) / width) as usize).min(bins - 1);
        out[idx].total += p[1];
    }
    out
}

/// Min, lower quartile, median, upper quartile, max.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumber {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Linear-interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Five-number summary of Y per distinct X value.
pub fn box_stats(table: &ResultTable, x: usize, y: usize) -> Vec<(String, FiveNumber)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for (row, value) in numeric_rows(table, y) {
        let key = table.cell(row, x).map(|c| c.display()).unwrap_or_default();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => groups.push((key, vec![value])),
        }
    }
    groups
        .into_iter()
        .filter_map(|(key, values)| FiveNumber::of(&values).map(|f| (key, f)))
        .collect()
}

/// Wedge outlines of a unit pie, one per positive total.
pub fn pie_wedges(totals: &[(String, f64)]) -> Vec<(String, Vec<[f64; 2]>)> {
    let positive: Vec<&(String, f64)> = totals.iter().filter(|(_, v)| *v > 0.0).collect();
    let sum: f64 = positive.iter().map(|(_, v)| v).sum();
    if sum <= 0.0 {
        return Vec::new();
    }

    let mut start = 0.0;
    positive
        .into_iter()
        .map(|(label, value)| {
            let sweep = TAU * value / sum;
            let steps = ((PIE_SEGMENTS as f64 * value / sum).ceil() as usize).max(2);
            let mut outline = vec![[0.0, 0.0]];
            for i in 0..=steps {
                let angle = start + sweep * i as f64 / steps as f64;
                outline.push([angle.cos(), angle.sin()]);
            }
            start += sweep;
            (label.clone(), outline)
        })
        .collect()
}

fn numeric_rows(table: &ResultTable, y: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
    (0..table.rows.len()).filter_map(move |row| {
        table.cell(row, y).and_then(|c| c.as_f64()).map(|v| (row, v))
    })
}

// ---------------------------------------------------------------------------
// Chart controls and rendering
// ---------------------------------------------------------------------------

/// Chart kind and column pickers. Returns true when the kind changed.
pub fn render_controls(ui: &mut Ui, table: &ResultTable, selection: &mut ChartSelection) -> bool {
    let prev_kind = selection.kind;
    let numeric = table.numeric_columns();

    ui.horizontal(|ui| {
        ui.label("📈 Chart type:");
        egui::ComboBox::from_id_salt("chart_kind")
            .selected_text(selection.kind.label())
            .show_ui(ui, |ui| {
                for kind in ChartKind::all() {
                    ui.selectable_value(&mut selection.kind, *kind, kind.label());
                }
            });

        ui.label("📊 X:");
        egui::ComboBox::from_id_salt("chart_x")
            .selected_text(column_name(table, selection.x))
            .show_ui(ui, |ui| {
                for (idx, name) in table.columns.iter().enumerate() {
                    ui.selectable_value(&mut selection.x, idx, name);
                }
            });

        ui.label("📊 Y (numeric):");
        egui::ComboBox::from_id_salt("chart_y")
            .selected_text(selection.y.map(|y| column_name(table, y)).unwrap_or("none"))
            .show_ui(ui, |ui| {
                for idx in &numeric {
                    ui.selectable_value(&mut selection.y, Some(*idx), column_name(table, *idx));
                }
            });
    });

    selection.kind != prev_kind
}

/// Draw the selected chart for `table`.
pub fn render_chart(ui: &mut Ui, table: &ResultTable, selection: &ChartSelection) {
    let Some(y) = selection.y else {
        ui.label(
            RichText::new("No numeric columns to chart")
                .color(theme::text::MUTED)
                .italics(),
        );
        return;
    };
    let x = selection.x;
    let y_name = column_name(table, y).to_string();

    match selection.kind {
        ChartKind::Bar => {
            let totals = category_totals(table, x, y);
            let labels: Vec<String> = totals.iter().map(|(k, _)| k.clone()).collect();
            let bars = totals
                .iter()
                .enumerate()
                .map(|(i, (k, v))| Bar::new(i as f64, *v).width(0.6).name(k))
                .collect();
            category_plot("bar_chart", labels).show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(theme::chart::SERIES).name(&y_name));
            });
        }
        ChartKind::Line => {
            let points = xy_points(table, x, y);
            base_plot("line_chart").show(ui, |plot_ui| {
                plot_ui.line(Line::new(PlotPoints::from(points)).color(theme::chart::SERIES).name(&y_name));
            });
        }
        ChartKind::Scatter => {
            let points = xy_points(table, x, y);
            base_plot("scatter_plot").show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .radius(3.0)
                        .color(theme::chart::SERIES)
                        .name(&y_name),
                );
            });
        }
        ChartKind::Histogram => {
            if table.is_numeric_column(x) {
                let bins = histogram_bins(&xy_points(table, x, y), HISTOGRAM_BINS);
                let bars = bins
                    .iter()
                    .map(|b| Bar::new((b.start + b.end) / 2.0, b.total).width(b.end - b.start))
                    .collect();
                base_plot("histogram").show(ui, |plot_ui| {
                    plot_ui.bar_chart(BarChart::new(bars).color(theme::chart::SERIES).name(&y_name));
                });
            } else {
                let totals = category_totals(table, x, y);
                let labels: Vec<String> = totals.iter().map(|(k, _)| k.clone()).collect();
                let bars = totals
                    .iter()
                    .enumerate()
                    .map(|(i, (_, v))| Bar::new(i as f64, *v).width(1.0))
                    .collect();
                category_plot("histogram", labels).show(ui, |plot_ui| {
                    plot_ui.bar_chart(BarChart::new(bars).color(theme::chart::SERIES).name(&y_name));
                });
            }
        }
        ChartKind::Box => {
            let stats = box_stats(table, x, y);
            let labels: Vec<String> = stats.iter().map(|(k, _)| k.clone()).collect();
            let boxes = stats
                .iter()
                .enumerate()
                .map(|(i, (k, f))| {
                    BoxElem::new(i as f64, BoxSpread::new(f.min, f.q1, f.median, f.q3, f.max))
                        .name(k)
                        .box_width(0.5)
                })
                .collect();
            category_plot("box_plot", labels).show(ui, |plot_ui| {
                plot_ui.box_plot(BoxPlot::new(boxes).color(theme::chart::SERIES).name(&y_name));
            });
        }
        ChartKind::Pie => {
            let wedges = pie_wedges(&category_totals(table, x, y));
            if wedges.is_empty() {
                ui.label(
                    RichText::new("Nothing to draw: no positive values")
                        .color(theme::text::MUTED)
                        .italics(),
                );
                return;
            }
            Plot::new("pie_chart")
                .height(CHART_HEIGHT)
                .data_aspect(1.0)
                .show_axes(false)
                .show_grid(false)
                .legend(Legend::default())
                .allow_drag(false)
                .allow_zoom(false)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    for (i, (label, outline)) in wedges.into_iter().enumerate() {
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(outline))
                                .fill_color(theme::chart::palette(i))
                                .name(label),
                        );
                    }
                });
        }
    }
}

fn base_plot(id: &str) -> Plot {
    Plot::new(id).height(CHART_HEIGHT).legend(Legend::default())
}

/// Plot whose integer X positions are labelled with category names.
fn category_plot(id: &str, labels: Vec<String>) -> Plot {
    base_plot(id).x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let pos = mark.value.round();
        if (mark.value - pos).abs() > f64::EPSILON || pos < 0.0 {
            return String::new();
        }
        labels.get(pos as usize).cloned().unwrap_or_default()
    })
}

fn column_name(table: &ResultTable, idx: usize) -> &str {
    table.columns.get(idx).map(String::as_str).unwrap_or("")
}
