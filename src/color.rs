use eframe::egui::Color32;

use crate::data::model::Family;

// ---------------------------------------------------------------------------
// Color mapping: family → line colour
// ---------------------------------------------------------------------------

/// Fixed line colour of each family: CPI blue, PGI red.
pub fn series_color(family: Family) -> Color32 {
    match family {
        Family::Cpi => Color32::BLUE,
        Family::Pgi => Color32::RED,
    }
}

/// Colour for inline diagnostics.
pub fn diagnostic_color(ok: bool) -> Color32 {
    if ok {
        Color32::DARK_GREEN
    } else {
        Color32::from_rgb(200, 120, 0)
    }
}
