//! Theme definitions for the Oralia UI
//!
//! Color constants and style application for a dark, practice-room aesthetic.

use egui::{Color32, Rounding, Stroke, Vec2};

/// Background colors
pub mod background {
    use super::Color32;

    /// Main window background - deep warm gray
    pub const MAIN: Color32 = Color32::from_rgb(28, 26, 32);

    /// Panel background - slightly lighter than main
    pub const PANEL: Color32 = Color32::from_rgb(38, 36, 44);

    /// Widget background (buttons, inputs)
    pub const WIDGET: Color32 = Color32::from_rgb(48, 46, 58);

    /// Widget background when hovered
    pub const WIDGET_HOVERED: Color32 = Color32::from_rgb(60, 58, 72);

    /// Widget background when active/pressed
    pub const WIDGET_ACTIVE: Color32 = Color32::from_rgb(72, 70, 88);
}

/// Text colors
pub mod text {
    use super::Color32;

    /// Primary text - bright white
    pub const PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);

    /// Secondary text - dimmed
    pub const SECONDARY: Color32 = Color32::from_rgb(160, 160, 175);

    /// Disabled text
    pub const DISABLED: Color32 = Color32::from_rgb(100, 100, 115);
}

/// UI accent colors
pub mod accent {
    use super::Color32;

    /// Primary accent - amber, piano-lamp warm
    pub const PRIMARY: Color32 = Color32::from_rgb(255, 183, 77);

    /// Success/active - green, matches the live-note overlay
    pub const SUCCESS: Color32 = Color32::from_rgb(102, 187, 106);

    /// Error - red
    pub const ERROR: Color32 = Color32::from_rgb(239, 83, 80);
}

/// Standard rounding for UI elements
pub const ROUNDING: Rounding = Rounding {
    nw: 4.0,
    ne: 4.0,
    sw: 4.0,
    se: 4.0,
};

/// Apply the dark trainer theme to an egui context
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    let visuals = &mut style.visuals;
    visuals.dark_mode = true;

    visuals.window_fill = background::PANEL;
    visuals.window_stroke = Stroke::new(1.0, Color32::from_rgb(64, 60, 76));
    visuals.window_rounding = ROUNDING;
    visuals.panel_fill = background::MAIN;

    visuals.widgets.noninteractive.bg_fill = background::WIDGET;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, text::SECONDARY);
    visuals.widgets.noninteractive.rounding = ROUNDING;

    visuals.widgets.inactive.bg_fill = background::WIDGET;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, text::PRIMARY);
    visuals.widgets.inactive.rounding = ROUNDING;

    visuals.widgets.hovered.bg_fill = background::WIDGET_HOVERED;
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, text::PRIMARY);
    visuals.widgets.hovered.rounding = ROUNDING;

    visuals.widgets.active.bg_fill = background::WIDGET_ACTIVE;
    visuals.widgets.active.fg_stroke = Stroke::new(1.5, accent::PRIMARY);
    visuals.widgets.active.rounding = ROUNDING;

    visuals.selection.bg_fill = accent::PRIMARY.gamma_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, accent::PRIMARY);

    visuals.extreme_bg_color = Color32::from_rgb(20, 18, 24);

    style.spacing.item_spacing = Vec2::new(8.0, 6.0);
    style.spacing.button_padding = Vec2::new(12.0, 6.0);

    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_colors_are_distinct() {
        assert_ne!(accent::PRIMARY, accent::SUCCESS);
        assert_ne!(accent::PRIMARY, accent::ERROR);
        assert_ne!(accent::SUCCESS, accent::ERROR);
    }

    #[test]
    fn backgrounds_darker_than_text() {
        assert!(background::MAIN.r() < text::PRIMARY.r());
        assert!(background::PANEL.g() < text::SECONDARY.g());
    }
}
