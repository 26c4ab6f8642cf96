//! Main application state and UI.

use std::sync::Arc;

use eframe::egui::{self, RichText};
use tokio::runtime::Runtime;

use crate::chart::{self, ChartSelection};
use crate::db::{redact, CatalogClient, DbClient, ReportCatalog, ReportClient, Unavailable};
use crate::error::DbError;
use crate::executor::{maybe_execute, QueryRunner};
use crate::navigation::NavigationState;
use crate::report_tree::{build_tree, ReportTree, ROOT_ID};
use crate::results::{render_table, ResultTable};
use crate::settings::Settings;
use crate::theme;
use crate::tree_view::show_tree;

/// Tabs of the central panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    ReportView,
    CustomQuery,
}

impl Tab {
    fn label(&self) -> &'static str {
        match self {
            Tab::ReportView => "Report View",
            Tab::CustomQuery => "Custom Query",
        }
    }
}

/// Outcome of a query, kept for display across repaints
type Outcome = Result<ResultTable, String>;

/// Main report browser application. One instance is one browsing session.
pub struct ReportBrowserApp {
    settings: Settings,
    settings_dirty: bool,

    // Database roles
    runtime: Option<Arc<Runtime>>,
    catalog: Box<dyn ReportCatalog>,
    runner: Box<dyn QueryRunner>,
    catalog_error: Option<String>,
    report_error: Option<String>,

    // Report hierarchy and session navigation
    tree: ReportTree,
    tree_error: Option<String>,
    nav: NavigationState,

    // Central panel
    tab: Tab,
    report: Option<Outcome>,
    chart: Option<ChartSelection>,
    custom_sql: String,
    custom: Option<Outcome>,
}

impl ReportBrowserApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let mut app = Self {
            nav: NavigationState::new(settings.click_classifier()),
            custom_sql: settings.custom_query.clone(),
            settings,
            settings_dirty: false,
            runtime: None,
            catalog: Box::new(Unavailable::new("catalog database not connected")),
            runner: Box::new(Unavailable::new("report database not connected")),
            catalog_error: None,
            report_error: None,
            tree: ReportTree::default(),
            tree_error: None,
            tab: Tab::ReportView,
            report: None,
            chart: None,
            custom: None,
        };

        app.connect();
        app.load_tree();
        app
    }

    /// (Re)connect both database roles. A role that fails stays usable
    /// through an `Unavailable` stand-in.
    fn connect(&mut self) {
        let runtime = match &self.runtime {
            Some(rt) => rt.clone(),
            None => match Runtime::new() {
                Ok(rt) => {
                    let rt = Arc::new(rt);
                    self.runtime = Some(rt.clone());
                    rt
                }
                Err(e) => {
                    let msg = DbError::from(e).to_string();
                    tracing::warn!("Failed to create runtime: {}", msg);
                    self.catalog_error = Some(msg.clone());
                    self.report_error = Some(msg);
                    return;
                }
            },
        };

        let max = self.settings.max_connections;

        match DbClient::connect(&self.settings.catalog_url, max, runtime.clone()) {
            Ok(db) => {
                self.catalog = Box::new(CatalogClient::new(db, self.settings.catalog_table.clone()));
                self.catalog_error = None;
            }
            Err(e) => {
                tracing::warn!(
                    "Catalog database {} unavailable: {}",
                    redact(&self.settings.catalog_url),
                    e
                );
                self.catalog = Box::new(Unavailable::new(e.to_string()));
                self.catalog_error = Some(e.to_string());
            }
        }

        match DbClient::connect(&self.settings.report_url, max, runtime) {
            Ok(db) => {
                self.runner = Box::new(ReportClient::new(db));
                self.report_error = None;
            }
            Err(e) => {
                tracing::warn!(
                    "Report database {} unavailable: {}",
                    redact(&self.settings.report_url),
                    e
                );
                self.runner = Box::new(Unavailable::new(e.to_string()));
                self.report_error = Some(e.to_string());
            }
        }
    }

    /// Fetch the catalog once and rebuild the tree. Navigation state is
    /// kept; it refers to nodes by id only.
    fn load_tree(&mut self) {
        match self.catalog.report_rows() {
            Ok(rows) => {
                self.tree = build_tree(&rows, ROOT_ID);
                self.tree_error = None;
                tracing::info!(
                    "Loaded {} catalog rows into {} tree nodes",
                    rows.len(),
                    self.tree.len()
                );
                if !self.tree.orphans.is_empty() {
                    tracing::warn!("Reports with a missing parent: {:?}", self.tree.orphans);
                }
                if !self.tree.skipped.is_empty() {
                    let ids: Vec<_> = self.tree.skipped.iter().map(|r| r.id).collect();
                    tracing::warn!("Reports skipped due to cyclic parents: {:?}", ids);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load report catalog: {}", e);
                self.tree = ReportTree::default();
                self.tree_error = Some(e.to_string());
            }
        }
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        if let Some(path) = &self.settings.logo_path {
            ui.add(egui::Image::new(format!("file://{}", path)).max_width(150.0));
            ui.add_space(6.0);
        }

        ui.heading("Reports Menu");
        ui.add_space(6.0);

        // Connection status
        let connected = self.catalog_error.is_none() && self.report_error.is_none();
        ui.horizontal(|ui| {
            status_dot(ui, "Catalog", self.catalog_error.as_deref());
            status_dot(ui, "Reports", self.report_error.as_deref());
        });
        ui.horizontal(|ui| {
            if !connected && ui.button("Retry").clicked() {
                self.connect();
                self.load_tree();
            }
            if ui.button("⟳ Reload").clicked() {
                self.load_tree();
            }
        });

        if let Some(err) = &self.tree_error {
            ui.colored_label(theme::state::ERROR, format!("Error: {}", err));
        }

        ui.separator();

        if self.tree.is_empty() {
            ui.colored_label(
                theme::state::WARNING,
                "⚠️ No tree structure found in the database.",
            );
        } else {
            let outcome = egui::ScrollArea::vertical()
                .id_salt("report_tree")
                .max_height((ui.available_height() - 120.0).max(120.0))
                .show(ui, |ui| {
                    show_tree(ui, &self.tree.roots, &mut self.nav, self.catalog.as_ref())
                })
                .inner;

            if outcome.clicked {
                // New selection hides the previous report until confirmed
                self.report = None;
                self.chart = None;
            }

            ui.label(
                RichText::new(format!(
                    "{} of {} reports shown",
                    outcome.drawn,
                    self.tree.len()
                ))
                .small()
                .color(theme::text::MUTED),
            );
        }

        self.render_hierarchy_warnings(ui);

        if self.nav.selected_id().is_some() {
            ui.add_space(8.0);
            if ui.button("✅ Select Report").clicked() {
                self.nav.arm();
                self.tab = Tab::ReportView;
            }
        }
    }

    fn render_hierarchy_warnings(&self, ui: &mut egui::Ui) {
        if !self.tree.orphans.is_empty() {
            ui.colored_label(
                theme::state::WARNING,
                format!(
                    "⚠️ {} report(s) reference a missing parent and are shown at top level",
                    self.tree.orphans.len()
                ),
            )
            .on_hover_text(format!("Ids: {:?}", self.tree.orphans));
        }
        if !self.tree.skipped.is_empty() {
            let names: Vec<String> = self
                .tree
                .skipped
                .iter()
                .map(|r| format!("{} ({})", r.label, r.id))
                .collect();
            ui.colored_label(
                theme::state::WARNING,
                format!(
                    "⚠️ {} report(s) skipped: cyclic parent chain",
                    self.tree.skipped.len()
                ),
            )
            .on_hover_text(names.join("\n"));
        }
    }

    fn render_report_view(&mut self, ui: &mut egui::Ui) {
        if let Some(outcome) = maybe_execute(&mut self.nav, self.runner.as_ref()) {
            self.chart = outcome
                .as_ref()
                .ok()
                .map(|table| ChartSelection::for_table(self.settings.chart_kind, table));
            self.report = Some(outcome.map_err(|e| e.to_string()));
        }

        if let Some(node) = self.nav.selected_id().and_then(|id| self.tree.find(id)) {
            ui.label(RichText::new(format!("📂 {}", node.label)).strong());
            ui.add_space(4.0);
        }

        if self.nav.is_armed() && self.report.is_none() {
            match self.nav.query_error().or(self.catalog_error.as_deref()) {
                Some(err) => {
                    ui.colored_label(
                        theme::state::ERROR,
                        format!("❌ Catalog unavailable, report query not loaded: {}", err),
                    );
                }
                None => {
                    ui.colored_label(theme::state::WARNING, "Selected report has no query.");
                }
            }
            return;
        }

        match &self.report {
            None => {
                ui.label(
                    RichText::new("Select a report from the menu, then press Select Report.")
                        .color(theme::text::MUTED)
                        .italics(),
                );
            }
            Some(Err(e)) => {
                ui.colored_label(theme::state::ERROR, format!("❌ Report query failed: {}", e));
            }
            Some(Ok(table)) if table.is_empty() => {
                ui.colored_label(theme::state::WARNING, "⚠️ No data returned for this report.");
            }
            Some(Ok(table)) => {
                render_table(ui, "report_table", table);
                ui.add_space(10.0);

                if let Some(selection) = &mut self.chart {
                    if chart::render_controls(ui, table, selection) {
                        self.settings.chart_kind = selection.kind;
                        self.settings_dirty = true;
                    }
                    ui.add_space(6.0);
                    chart::render_chart(ui, table, selection);
                }
            }
        }
    }

    fn render_custom_query(&mut self, ui: &mut egui::Ui) {
        ui.label("Enter your SQL Query:");
        let edit = ui.add(
            egui::TextEdit::multiline(&mut self.custom_sql)
                .code_editor()
                .desired_rows(6)
                .desired_width(f32::INFINITY),
        );
        if edit.changed() {
            self.settings.custom_query = self.custom_sql.clone();
            self.settings_dirty = true;
        }

        if ui.button("🔄 Fetch Data").clicked() {
            tracing::info!("Running custom query");
            let outcome = self.runner.run(&self.custom_sql);
            if let Err(e) = &outcome {
                tracing::warn!("Custom query failed: {}", e);
            }
            self.custom = Some(outcome.map_err(|e| e.to_string()));
        }

        ui.add_space(8.0);

        match &self.custom {
            None => {}
            Some(Ok(table)) if !table.is_empty() => {
                render_table(ui, "custom_table", table);
            }
            Some(Ok(_)) => {
                ui.colored_label(theme::state::WARNING, "⚠️ No data found for the custom query.");
            }
            Some(Err(e)) => {
                ui.colored_label(theme::state::ERROR, format!("❌ {}", e));
                ui.colored_label(theme::state::WARNING, "⚠️ No data found for the custom query.");
            }
        }
    }
}

impl eframe::App for ReportBrowserApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        egui::SidePanel::left("reports_menu")
            .min_width(240.0)
            .frame(egui::Frame::side_top_panel(&ctx.style()).fill(theme::bg::PANEL))
            .show(ctx, |ui| {
                self.render_sidebar(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(theme::bg::CENTRAL))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading(RichText::new(&self.settings.title).size(26.0).strong());
                });
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    for tab in [Tab::ReportView, Tab::CustomQuery] {
                        ui.selectable_value(&mut self.tab, tab, tab.label());
                    }
                });
                ui.separator();

                egui::ScrollArea::vertical()
                    .id_salt("central_scroll")
                    .show(ui, |ui| match self.tab {
                        Tab::ReportView => self.render_report_view(ui),
                        Tab::CustomQuery => self.render_custom_query(ui),
                    });
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.settings_dirty {
            self.settings.save();
        }
    }
}

fn status_dot(ui: &mut egui::Ui, name: &str, error: Option<&str>) {
    match error {
        None => {
            ui.colored_label(theme::state::SUCCESS, format!("● {}", name));
        }
        Some(e) => {
            ui.colored_label(theme::state::ERROR, format!("● {}", name))
                .on_hover_text(e);
        }
    }
}
