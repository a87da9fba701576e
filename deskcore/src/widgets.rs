//! Custom widgets — black and white, dithered highlights

use egui::{Response, Ui, Widget};
use crate::dither;
use crate::theme::DeskColors;

/// Action returned by window control buttons
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowAction {
    None,
    Close,
    Minimize,
}

/// Draw close and minimize buttons at the left of the menu bar.
/// Call this at the start of your `menu_bar` closure.
pub fn window_control_buttons(ui: &mut Ui) -> WindowAction {
    let btn_size = egui::vec2(14.0, 14.0);
    let stroke = egui::Stroke::new(1.0, DeskColors::BLACK);
    let mut action = WindowAction::None;

    // Close button [X]
    let (close_rect, close_resp) = ui.allocate_exact_size(btn_size, egui::Sense::click());
    if ui.is_rect_visible(close_rect) {
        let painter = ui.painter();
        painter.rect_filled(close_rect, 0.0, DeskColors::WHITE);
        painter.rect_stroke(close_rect, 0.0, stroke);
        if close_resp.hovered() {
            dither::draw_dither_hover(painter, close_rect);
        }
        let m = 3.0;
        painter.line_segment(
            [close_rect.left_top() + egui::vec2(m, m), close_rect.right_bottom() - egui::vec2(m, m)],
            stroke,
        );
        painter.line_segment(
            [close_rect.right_top() + egui::vec2(-m, m), close_rect.left_bottom() + egui::vec2(m, -m)],
            stroke,
        );
    }
    if close_resp.clicked() {
        action = WindowAction::Close;
    }

    ui.add_space(2.0);

    // Minimize button [-]
    let (min_rect, min_resp) = ui.allocate_exact_size(btn_size, egui::Sense::click());
    if ui.is_rect_visible(min_rect) {
        let painter = ui.painter();
        painter.rect_filled(min_rect, 0.0, DeskColors::WHITE);
        painter.rect_stroke(min_rect, 0.0, stroke);
        if min_resp.hovered() {
            dither::draw_dither_hover(painter, min_rect);
        }
        let m = 3.0;
        painter.line_segment(
            [
                egui::pos2(min_rect.left() + m, min_rect.center().y),
                egui::pos2(min_rect.right() - m, min_rect.center().y),
            ],
            stroke,
        );
    }
    if min_resp.clicked() {
        action = WindowAction::Minimize;
    }

    ui.add_space(8.0);
    action
}

/// A full-width button: white bg, 1px outline, dithered when pressed.
pub struct DeskButton<'a> {
    text: &'a str,
}

impl<'a> DeskButton<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl<'a> Widget for DeskButton<'a> {
    fn ui(self, ui: &mut Ui) -> Response {
        let desired_size = egui::vec2(ui.available_width(), ui.spacing().interact_size.y + 6.0);
        let (rect, response) = ui.allocate_exact_size(desired_size, egui::Sense::click());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.rect_filled(rect, 0.0, DeskColors::WHITE);
            painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, DeskColors::BLACK));

            let pressed = response.is_pointer_button_down_on();
            if pressed {
                dither::draw_dither_selection(painter, rect);
            } else if response.hovered() {
                dither::draw_dither_hover(painter, rect);
            }

            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                self.text,
                egui::FontId::proportional(14.0),
                if pressed { DeskColors::WHITE } else { DeskColors::BLACK },
            );
        }

        response
    }
}

/// One row of the manager's widget list.
/// Selected rows get a dithered overlay instead of solid black.
pub struct ListRow<'a> {
    title: &'a str,
    detail: &'a str,
    selected: bool,
}

impl<'a> ListRow<'a> {
    pub fn new(title: &'a str, detail: &'a str) -> Self {
        Self { title, detail, selected: false }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl<'a> Widget for ListRow<'a> {
    fn ui(self, ui: &mut Ui) -> Response {
        let height = 22.0;
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), height),
            egui::Sense::click(),
        );

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.rect_filled(rect, 0.0, DeskColors::WHITE);

            let text_color = if self.selected {
                dither::draw_dither_selection(painter, rect);
                DeskColors::WHITE
            } else if response.hovered() {
                dither::draw_dither_hover(painter, rect);
                DeskColors::BLACK
            } else {
                DeskColors::BLACK
            };

            painter.text(
                egui::pos2(rect.min.x + 6.0, rect.center().y),
                egui::Align2::LEFT_CENTER,
                self.title,
                egui::FontId::proportional(13.0),
                text_color,
            );
            painter.text(
                egui::pos2(rect.max.x - 6.0, rect.center().y),
                egui::Align2::RIGHT_CENTER,
                self.detail,
                egui::FontId::proportional(11.0),
                text_color,
            );
        }

        response
    }
}

/// Status bar: white bg, 1px black top border
pub fn status_bar(ui: &mut Ui, text: &str) {
    egui::Frame::none()
        .fill(DeskColors::WHITE)
        .stroke(egui::Stroke::new(1.0, DeskColors::BLACK))
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(text);
        });
}

/// Severity of a modal notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// A modal message box with a single "ok" button.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, title: title.into(), body: body.into() }
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Warning, title: title.into(), body: body.into() }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, title: title.into(), body: body.into() }
    }
}

/// Show `notice` centred in the window. Returns true once dismissed.
///
/// Enter and Escape only dismiss when `keys_armed` is set. Callers pass
/// false on the frame the notice first appears, so the key press that
/// raised it does not also close it.
pub fn notice_window(ctx: &egui::Context, notice: &Notice, keys_armed: bool) -> bool {
    let mut dismissed = false;
    let heading = match notice.kind {
        NoticeKind::Info => notice.title.clone(),
        NoticeKind::Warning => format!("⚠ {}", notice.title),
        NoticeKind::Error => format!("✖ {}", notice.title),
    };
    let resp = egui::Window::new(heading)
        .id(egui::Id::new("notice_window"))
        .collapsible(false)
        .resizable(false)
        .default_width(260.0)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(6.0);
                ui.label(&notice.body);
                ui.add_space(10.0);
                if ui.button("ok").clicked() {
                    dismissed = true;
                }
                ui.add_space(4.0);
            });
        });
    if let Some(r) = &resp {
        dither::draw_window_shadow(ctx, r.response.rect);
    }
    if keys_armed && ctx.input(|i| i.key_pressed(egui::Key::Enter) || i.key_pressed(egui::Key::Escape)) {
        dismissed = true;
    }
    dismissed
}
