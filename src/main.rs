//! Report Browser
//!
//! Desktop app for navigating a hierarchical report catalog and running
//! the selected report's query against the report database.

mod app;
mod chart;
mod db;
mod error;
mod executor;
mod navigation;
mod report_tree;
mod results;
mod settings;
mod theme;
mod tree_view;

use eframe::egui;

use crate::settings::Settings;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let settings = Settings::load();
    let title = settings.title.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title(&title),
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|cc| Ok(Box::new(app::ReportBrowserApp::new(cc, settings)))),
    )
}
