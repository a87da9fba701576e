//! deskwidgets theme
//!
//! The manager window is black on white with 1px black outlines.
//! Overlays are light text on a dark panel that can be made translucent.

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

/// Palette shared by the manager and the overlays.
pub struct DeskColors;

impl DeskColors {
    pub const WHITE: Color32 = Color32::from_rgb(255, 255, 255);
    pub const BLACK: Color32 = Color32::from_rgb(0, 0, 0);
    /// Overlay panel background.
    pub const OVERLAY_BG: Color32 = Color32::from_rgb(0x2b, 0x2b, 0x2b);
    pub const OVERLAY_TEXT: Color32 = Color32::from_rgb(235, 235, 235);
}

/// Alpha of an overlay panel in translucent mode.
pub const TRANSLUCENT_ALPHA: u8 = 128;

/// Theme configuration for the manager window
pub struct DeskTheme {
    pub font_size_body: f32,
    pub font_size_heading: f32,
    pub font_size_small: f32,
    pub window_padding: f32,
    pub item_spacing: f32,
}

impl Default for DeskTheme {
    fn default() -> Self {
        Self {
            font_size_body: 14.0,
            font_size_heading: 20.0,
            font_size_small: 11.0,
            window_padding: 8.0,
            item_spacing: 4.0,
        }
    }
}

impl DeskTheme {
    /// Apply the theme to an egui context
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = Style::default();

        style.text_styles = [
            (TextStyle::Small, FontId::new(self.font_size_small, FontFamily::Proportional)),
            (TextStyle::Body, FontId::new(self.font_size_body, FontFamily::Proportional)),
            (TextStyle::Button, FontId::new(self.font_size_body, FontFamily::Proportional)),
            (TextStyle::Heading, FontId::new(self.font_size_heading, FontFamily::Proportional)),
            (TextStyle::Monospace, FontId::new(self.font_size_body, FontFamily::Monospace)),
        ]
        .into();

        let mut visuals = Visuals::light();

        visuals.window_fill = DeskColors::WHITE;
        visuals.panel_fill = DeskColors::WHITE;
        visuals.faint_bg_color = DeskColors::WHITE;
        visuals.extreme_bg_color = DeskColors::WHITE;

        visuals.window_rounding = Rounding::ZERO;
        visuals.menu_rounding = Rounding::ZERO;

        visuals.window_stroke = Stroke::new(1.0, DeskColors::BLACK);

        let bw = |ws: &mut egui::style::WidgetVisuals| {
            ws.bg_fill = DeskColors::WHITE;
            ws.weak_bg_fill = DeskColors::WHITE;
            ws.bg_stroke = Stroke::new(1.0, DeskColors::BLACK);
            ws.fg_stroke = Stroke::new(1.0, DeskColors::BLACK);
            ws.rounding = Rounding::ZERO;
        };
        bw(&mut visuals.widgets.noninteractive);
        bw(&mut visuals.widgets.inactive);
        bw(&mut visuals.widgets.hovered);
        bw(&mut visuals.widgets.active);
        bw(&mut visuals.widgets.open);

        // dithered shadows are drawn by hand
        visuals.window_shadow = egui::epaint::Shadow::NONE;
        visuals.popup_shadow = egui::epaint::Shadow::NONE;

        visuals.selection.bg_fill = Color32::from_rgb(160, 160, 160);
        visuals.selection.stroke = Stroke::new(1.0, DeskColors::BLACK);

        style.visuals = visuals;

        style.spacing.window_margin = egui::Margin::same(self.window_padding);
        style.spacing.item_spacing = egui::vec2(self.item_spacing, self.item_spacing);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);

        ctx.set_style(style);
    }

    /// Title bar: white fill, 1px black border
    pub fn title_bar_frame() -> egui::Frame {
        egui::Frame::none()
            .fill(DeskColors::WHITE)
            .stroke(Stroke::new(1.0, DeskColors::BLACK))
            .inner_margin(egui::Margin::symmetric(8.0, 4.0))
    }

    /// Overlay panel frame. Translucent panels keep their text opaque.
    pub fn overlay_frame(translucent: bool) -> egui::Frame {
        egui::Frame::none()
            .fill(overlay_fill(translucent))
            .stroke(Stroke::new(1.0, DeskColors::BLACK))
            .inner_margin(egui::Margin::same(10.0))
    }
}

/// Background colour of an overlay panel.
pub fn overlay_fill(translucent: bool) -> Color32 {
    let c = DeskColors::OVERLAY_BG;
    if translucent {
        Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), TRANSLUCENT_ALPHA)
    } else {
        c
    }
}

/// Menu bar styling helper
pub fn menu_bar<R>(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> egui::InnerResponse<R> {
    let frame_resp = egui::Frame::none()
        .fill(DeskColors::WHITE)
        .stroke(Stroke::new(1.0, DeskColors::BLACK))
        .inner_margin(egui::Margin::symmetric(4.0, 2.0))
        .show(ui, |ui| {
            ui.horizontal(add_contents).inner
        });
    egui::InnerResponse {
        inner: frame_resp.inner,
        response: frame_resp.response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translucent_fill_only_changes_alpha() {
        let opaque = overlay_fill(false);
        let translucent = overlay_fill(true);
        assert_eq!(opaque.a(), 255);
        assert!(translucent.a() < opaque.a());
    }
}
