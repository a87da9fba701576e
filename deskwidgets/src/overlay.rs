//! Overlay widget: one floating always-on-top panel
//!
//! The panel renders its current display mode, offers buttons to switch mode,
//! save a note, set a countdown and add reminders. Dragging anywhere on the
//! background moves the window; right-click toggles translucency.

use chrono::NaiveDateTime;
use deskcore::theme::{DeskColors, DeskTheme};
use deskcore::widgets::Notice;
use egui::{CentralPanel, Context, Pos2, RichText, Sense, ViewportBuilder, ViewportClass, ViewportCommand};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::manager::WidgetId;
use crate::quotes;
use crate::state::{DisplayMode, WidgetState};
use crate::timer::RecurringTimer;

/// Overlays refresh once per second.
pub const REFRESH_PERIOD: Duration = Duration::from_secs(1);

pub const COUNTDOWN_MIN: u32 = 1;
pub const COUNTDOWN_MAX: u32 = 3600;

const OVERLAY_SIZE: [f32; 2] = [300.0, 240.0];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("please enter a whole number of seconds")]
    NotANumber,
    #[error("seconds must be between 1 and 3600")]
    OutOfRange,
}

/// Validate the countdown prompt's input.
pub fn parse_countdown(input: &str) -> Result<u32, InputError> {
    let seconds: i64 = input.trim().parse().map_err(|_| InputError::NotANumber)?;
    if !(COUNTDOWN_MIN as i64..=COUNTDOWN_MAX as i64).contains(&seconds) {
        return Err(InputError::OutOfRange);
    }
    Ok(seconds as u32)
}

/// Inline input prompt shown inside the overlay.
#[derive(Debug, Clone, PartialEq)]
enum Prompt {
    Countdown { input: String, error: Option<String> },
    Reminder { input: String },
}

/// What the manager has to do after an overlay frame.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayAction {
    None,
    Close,
    Notice(Notice),
}

pub struct OverlayWidget {
    id: WidgetId,
    state: WidgetState,
    timer: RecurringTimer,
    quote_index: usize,
    /// Contents of the note entry field, saved into the state on demand.
    note_draft: String,
    translucent: bool,
    prompt: Option<Prompt>,
    /// Where the window first appears; the user may drag it elsewhere.
    origin: Pos2,
}

impl OverlayWidget {
    pub fn new(id: WidgetId, state: WidgetState, now: Instant) -> Self {
        Self {
            id,
            note_draft: state.note_text.clone(),
            state,
            timer: RecurringTimer::start(REFRESH_PERIOD, now),
            quote_index: quotes::random_index(),
            translucent: false,
            prompt: None,
            origin: deskcore::cascade_position(id.get() as usize),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.state.display_mode
    }

    pub fn is_translucent(&self) -> bool {
        self.translucent
    }

    pub fn cycle_mode(&mut self) {
        self.state.display_mode = self.state.display_mode.next();
    }

    /// One refresh tick.
    pub fn refresh(&mut self) {
        self.advance(1);
    }

    /// Apply `ticks` refresh periods at once. The countdown runs in every
    /// display mode; only what is shown depends on the mode.
    fn advance(&mut self, ticks: u32) {
        if ticks == 0 {
            return;
        }
        let before = self.state.countdown_seconds;
        self.state.countdown_seconds = before.saturating_sub(ticks);
        if before > 0 && self.state.countdown_seconds == 0 {
            tracing::info!(widget = %self.id, "countdown finished");
        }
        self.quote_index = quotes::random_index();
    }

    /// Fire any refresh ticks that are due. Returns true if something fired.
    pub fn poll(&mut self, now: Instant) -> bool {
        let ticks = self.timer.poll(now);
        self.advance(ticks);
        ticks > 0
    }

    /// Delay until the next refresh tick; `None` once destroyed.
    pub fn time_until_refresh(&self, now: Instant) -> Option<Duration> {
        self.timer.time_until_due(now)
    }

    pub fn save_note(&mut self, text: impl Into<String>) {
        self.state.note_text = text.into();
    }

    pub fn set_countdown(&mut self, seconds: u32) {
        self.state.countdown_seconds = seconds;
    }

    /// Append a reminder. Blank text is ignored.
    pub fn add_reminder(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.state.reminders.push(text.to_string());
        true
    }

    pub fn export_state(&self) -> WidgetState {
        self.state.clone()
    }

    /// Stop the refresh timer. The viewport closes once the manager stops
    /// showing it.
    pub fn destroy(&mut self) {
        self.timer.cancel();
        self.prompt = None;
        tracing::debug!(widget = %self.id, "overlay destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.timer.is_cancelled()
    }

    pub fn toggle_translucent(&mut self) {
        self.translucent = !self.translucent;
    }

    /// Label text for the current mode.
    pub fn display_text(&self, now: NaiveDateTime) -> String {
        match self.state.display_mode {
            DisplayMode::Time => format!("current time: {}", now.format("%H:%M:%S")),
            DisplayMode::Calendar => format!("current date: {}", now.format("%Y-%m-%d")),
            DisplayMode::Note => format!("note:\n{}", self.state.note_text),
            DisplayMode::Countdown => format!("countdown: {}s", self.state.countdown_seconds),
            DisplayMode::Quote => format!("quote:\n{}", quotes::quote(self.quote_index)),
            DisplayMode::Reminder => {
                if self.state.reminders.is_empty() {
                    "reminders:\nno reminders.".to_string()
                } else {
                    format!("reminders:\n{}", self.state.reminders.join("\n"))
                }
            }
        }
    }

    pub fn viewport_id(&self) -> egui::ViewportId {
        egui::ViewportId::from_hash_of(("overlay", self.id))
    }

    pub fn viewport_builder(&self) -> ViewportBuilder {
        ViewportBuilder::default()
            .with_title(format!("widget {}", self.id))
            .with_inner_size(OVERLAY_SIZE)
            .with_position(self.origin)
            .with_decorations(false)
            .with_transparent(true)
            .with_window_level(egui::WindowLevel::AlwaysOnTop)
    }

    /// Draw the overlay. `class` is whatever egui gave the viewport; without
    /// multi-viewport support it falls back to a floating egui window.
    pub fn show(&mut self, ctx: &Context, class: ViewportClass, now: NaiveDateTime) -> OverlayAction {
        let mut action = OverlayAction::None;
        let frame = DeskTheme::overlay_frame(self.translucent);

        if class == ViewportClass::Embedded {
            egui::Window::new(format!("widget {}", self.id))
                .id(egui::Id::new(("overlay_window", self.id)))
                .title_bar(false)
                .resizable(false)
                .default_pos(self.origin)
                .frame(frame)
                .show(ctx, |ui| {
                    // The window itself handles dragging; only right-click
                    // is taken here.
                    let background = ui.interact(ui.max_rect(), ui.id().with("overlay_bg"), Sense::click());
                    if background.secondary_clicked() {
                        self.toggle_translucent();
                    }
                    self.contents(ui, now, &mut action);
                });
            return action;
        }

        if ctx.input(|i| i.viewport().close_requested()) {
            action = OverlayAction::Close;
        }
        CentralPanel::default()
            .frame(frame)
            .show(ctx, |ui| {
                // Background interaction goes first so the buttons drawn
                // later sit on top of it.
                let background = ui.interact(ui.max_rect(), ui.id().with("overlay_bg"), Sense::click_and_drag());
                if background.drag_started() {
                    ctx.send_viewport_cmd(ViewportCommand::StartDrag);
                }
                if background.secondary_clicked() {
                    self.toggle_translucent();
                }
                self.contents(ui, now, &mut action);
            });
        action
    }

    fn contents(&mut self, ui: &mut egui::Ui, now: NaiveDateTime, action: &mut OverlayAction) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("widget {}", self.id))
                    .small()
                    .color(DeskColors::OVERLAY_TEXT),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("x").clicked() {
                    *action = OverlayAction::Close;
                }
            });
        });

        ui.label(
            RichText::new(self.display_text(now))
                .size(15.0)
                .color(DeskColors::OVERLAY_TEXT),
        );
        ui.add_space(6.0);

        if self.prompt.is_some() {
            self.show_prompt(ui);
            return;
        }

        ui.horizontal(|ui| {
            if ui.button("switch mode").clicked() {
                self.cycle_mode();
            }
            if ui.button("countdown").clicked() {
                self.prompt = Some(Prompt::Countdown { input: String::new(), error: None });
            }
            if ui.button("reminder").clicked() {
                self.prompt = Some(Prompt::Reminder { input: String::new() });
            }
        });
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.note_draft).desired_width(180.0));
            if ui.button("save note").clicked() {
                self.save_note(self.note_draft.clone());
                *action = OverlayAction::Notice(Notice::info("note", "note saved!"));
            }
        });
    }

    fn show_prompt(&mut self, ui: &mut egui::Ui) {
        let mut close = false;
        let mut countdown = None;
        let mut reminder = None;
        match &mut self.prompt {
            Some(Prompt::Countdown { input, error }) => {
                ui.label(RichText::new("countdown seconds (1-3600):").color(DeskColors::OVERLAY_TEXT));
                let resp = ui.text_edit_singleline(input);
                let submit = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if let Some(msg) = error.as_deref() {
                    ui.label(RichText::new(msg).small().color(DeskColors::OVERLAY_TEXT));
                }
                let mut accepted = None;
                ui.horizontal(|ui| {
                    if ui.button("ok").clicked() || submit {
                        match parse_countdown(input) {
                            Ok(seconds) => accepted = Some(seconds),
                            Err(e) => *error = Some(e.to_string()),
                        }
                    }
                    if ui.button("cancel").clicked() {
                        close = true;
                    }
                });
                countdown = accepted;
            }
            Some(Prompt::Reminder { input }) => {
                ui.label(RichText::new("new reminder:").color(DeskColors::OVERLAY_TEXT));
                let resp = ui.text_edit_singleline(input);
                let submit = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let mut accepted = None;
                ui.horizontal(|ui| {
                    if ui.button("ok").clicked() || submit {
                        accepted = Some(input.clone());
                    }
                    if ui.button("cancel").clicked() {
                        close = true;
                    }
                });
                reminder = accepted;
            }
            None => {}
        }
        if let Some(seconds) = countdown {
            self.set_countdown(seconds);
            close = true;
        }
        if let Some(text) = reminder {
            self.add_reminder(&text);
            close = true;
        }
        if close {
            self.prompt = None;
        }
    }
}
