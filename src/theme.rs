//! Colour constants shared by the tree panel, report view and charts.

use egui::Color32;

/// Panel backgrounds
pub mod bg {
    use super::*;

    /// Sidebar holding the report tree
    pub const PANEL: Color32 = Color32::from_rgb(20, 22, 28);

    /// Report view / custom query area
    pub const CENTRAL: Color32 = Color32::from_rgb(14, 17, 23);
}

/// Text colors at different emphasis levels
pub mod text {
    use super::*;

    /// Muted text - low contrast for hints and counts
    pub const MUTED: Color32 = Color32::from_rgb(120, 125, 135);
}

/// Status colors
pub mod state {
    use super::*;

    pub const SUCCESS: Color32 = Color32::from_rgb(34, 197, 94);
    pub const ERROR: Color32 = Color32::from_rgb(239, 68, 68);
    pub const WARNING: Color32 = Color32::from_rgb(245, 158, 11);
}

/// Tree row colors
pub mod tree {
    use super::*;

    /// Expanded branch
    pub const OPEN: Color32 = Color32::from_rgb(255, 149, 0);

    /// Collapsed branch or leaf report
    pub const CLOSED: Color32 = Color32::from_rgb(180, 180, 190);
}

/// Chart colors
pub mod chart {
    use super::*;

    /// Single-series charts
    pub const SERIES: Color32 = Color32::from_rgb(59, 130, 246);

    const PALETTE: [Color32; 8] = [
        Color32::from_rgb(59, 130, 246),
        Color32::from_rgb(255, 149, 0),
        Color32::from_rgb(34, 197, 94),
        Color32::from_rgb(155, 89, 182),
        Color32::from_rgb(6, 182, 212),
        Color32::from_rgb(239, 68, 68),
        Color32::from_rgb(255, 220, 80),
        Color32::from_rgb(120, 125, 135),
    ];

    /// Cycling palette for multi-series charts (pie wedges)
    pub fn palette(idx: usize) -> Color32 {
        PALETTE[idx % PALETTE.len()]
    }
}
