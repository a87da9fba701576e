//! Manager window: widget list, action buttons, status bar, and the overlay
//! viewports it spawns.

use chrono::Local;
use deskcore::repaint::RepaintController;
use deskcore::safety::preview;
use deskcore::theme::{menu_bar, DeskColors, DeskTheme};
use deskcore::widgets::{notice_window, status_bar, window_control_buttons, DeskButton, ListRow, Notice, WindowAction};
use egui::{Align2, CentralPanel, Context, SidePanel, TopBottomPanel, Vec2};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::manager::{Manager, ManagerError, WidgetId};
use crate::overlay::OverlayAction;
use crate::quotes;
use crate::state::DisplayMode;
use crate::store::WidgetStore;
use crate::system_info::SystemSampler;
use crate::timer::RecurringTimer;
use crate::weather::{PendingWeather, WeatherClient};

/// The status bar clock ticks once per second.
const STATUS_PERIOD: Duration = Duration::from_secs(1);
/// How often to check on a weather lookup in flight.
const WEATHER_POLL: Duration = Duration::from_millis(100);

pub struct DeskWidgetsApp {
    manager: Manager,
    config: AppConfig,
    selected: Option<WidgetId>,
    notices: VecDeque<Notice>,
    /// Frame in which the front notice was first drawn.
    notice_since: Option<u64>,
    show_about: bool,
    /// City being typed into the weather prompt, when it is open.
    weather_city: Option<String>,
    pending_weather: Option<PendingWeather>,
    system: SystemSampler,
    status_timer: RecurringTimer,
    /// Cached status text and the second it was computed for
    cached_status: (i64, String),
    /// Set once the collection has been saved for exit.
    closing: bool,
    repaint: RepaintController,
}

impl DeskWidgetsApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self::with_config(config);
        app.restore();
        app
    }

    fn with_config(config: AppConfig) -> Self {
        let mut system = SystemSampler::new();
        system.sample();
        Self {
            manager: Manager::new(WidgetStore::new(config.store_path.clone())),
            config,
            selected: None,
            notices: VecDeque::new(),
            notice_since: None,
            show_about: false,
            weather_city: None,
            pending_weather: None,
            system,
            status_timer: RecurringTimer::start(STATUS_PERIOD, Instant::now()),
            cached_status: (-1, String::new()),
            closing: false,
            repaint: RepaintController::new(),
        }
    }

    /// Reload the last session's widgets.
    fn restore(&mut self) {
        if let Err(e) = self.manager.load_at_startup() {
            tracing::error!(error = %e, "could not restore widgets");
            self.notices.push_back(Notice::error(
                "error",
                format!("could not restore widgets: {}\nthe file will not be overwritten on exit.", e),
            ));
        }
    }

    fn create_widget(&mut self) {
        let id = self.manager.create_widget(None);
        self.selected = Some(id);
    }

    fn destroy_widget(&mut self, id: WidgetId) {
        let result = self.manager.destroy_widget(id);
        if !self.manager.contains(id) && self.selected == Some(id) {
            self.selected = None;
        }
        match result {
            Ok(()) => {}
            Err(ManagerError::NoSuchWidget(_)) => {
                self.notices.push_back(Notice::warning("warning", "no valid widget selected!"));
            }
            Err(e) => {
                tracing::error!(error = %e, "destroying widget failed");
                self.notices.push_back(Notice::error("error", format!("error while destroying widget: {}", e)));
            }
        }
    }

    fn destroy_selected(&mut self) {
        match self.selected {
            Some(id) => self.destroy_widget(id),
            None => self.notices.push_back(Notice::warning("warning", "no valid widget selected!")),
        }
    }

    fn clear_all(&mut self) {
        self.manager.clear_all();
        self.selected = None;
    }

    fn save_all(&mut self) {
        match self.manager.save_all() {
            Ok(_) => self.notices.push_back(Notice::info("saved", "all widget states saved!")),
            Err(e) => {
                tracing::error!(error = %e, "saving widgets failed");
                self.notices.push_back(Notice::error("error", format!("could not save widgets: {}", e)));
            }
        }
    }

    fn load_all(&mut self) {
        match self.manager.load_all() {
            Ok(_) => self.notices.push_back(Notice::info("loaded", "all widget states loaded!")),
            Err(e) if e.is_not_found() => {
                tracing::warn!(path = %self.manager.store().path().display(), "no saved widget file");
                self.notices.push_back(Notice::warning("warning", "no saved widget state file found!"));
            }
            Err(e) => {
                tracing::error!(error = %e, "loading widgets failed");
                self.notices.push_back(Notice::error("error", format!("could not load widgets: {}", e)));
            }
        }
    }

    fn show_current_time(&mut self) {
        let now = Local::now().format("%H:%M:%S");
        self.notices.push_back(Notice::info("current time", format!("current time: {}", now)));
    }

    fn show_random_quote(&mut self) {
        self.notices.push_back(Notice::info("random quote", quotes::random_quote()));
    }

    fn show_reminders(&mut self) {
        let reminders = self.manager.all_reminders();
        let body = if reminders.is_empty() {
            "no reminders.".to_string()
        } else {
            reminders.join("\n")
        };
        self.notices.push_back(Notice::info("reminders", body));
    }

    fn show_system_info(&mut self) {
        self.notices.push_back(Notice::info("system info", self.system.summary()));
    }

    fn start_weather_lookup(&mut self, city: &str) {
        match WeatherClient::new(self.config.weather_url.clone(), self.config.weather_api_key.clone()) {
            Ok(client) => {
                tracing::info!(city, "looking up weather");
                self.pending_weather = Some(client.spawn_lookup(city));
            }
            Err(e) => self.notices.push_back(Notice::error("weather", e.to_string())),
        }
    }

    fn poll_weather(&mut self) {
        let Some(pending) = &self.pending_weather else {
            return;
        };
        match pending.try_take() {
            Some(Ok(report)) => {
                self.notices.push_back(Notice::info("weather", report.summary()));
                self.pending_weather = None;
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "weather lookup failed");
                self.notices.push_back(Notice::error("weather", e.to_string()));
                self.pending_weather = None;
            }
            None => self.repaint.schedule(WEATHER_POLL),
        }
    }

    /// Save everything once, right before the window goes away.
    fn prepare_exit(&mut self) {
        if self.closing {
            return;
        }
        self.closing = true;
        if let Err(e) = self.manager.on_close() {
            tracing::error!(error = %e, "could not save widgets on exit");
        }
    }

    fn status_text(&mut self) -> String {
        let now = Local::now();
        let sec = now.timestamp();
        if sec != self.cached_status.0 {
            self.cached_status.0 = sec;
            self.cached_status.1 = format!("current time: {}", now.format("%Y-%m-%d %H:%M:%S"));
        }
        let mut text = format!("{}  |  {} widgets", self.cached_status.1, self.manager.len());
        if self.pending_weather.is_some() {
            text.push_str("  |  looking up weather…");
        }
        text
    }

    fn row_detail(&self, id: WidgetId) -> String {
        let Some(widget) = self.manager.get(id) else {
            return String::new();
        };
        let state = widget.state();
        match state.display_mode {
            DisplayMode::Note if !state.note_text.is_empty() => {
                format!("note · {}", preview(&state.note_text, 24))
            }
            DisplayMode::Countdown => format!("countdown · {}s", state.countdown_seconds),
            DisplayMode::Reminder => format!("reminder · {}", state.reminders.len()),
            mode => mode.to_string(),
        }
    }

    fn draw_manager(&mut self, ctx: &Context) {
        let win_action = TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            menu_bar(ui, |ui| {
                let action = window_control_buttons(ui);
                ui.menu_button("widgets", |ui| {
                    if ui.button("new widget").clicked() {
                        self.create_widget();
                        ui.close_menu();
                    }
                    if ui.button("save all").clicked() {
                        self.save_all();
                        ui.close_menu();
                    }
                    if ui.button("load all").clicked() {
                        self.load_all();
                        ui.close_menu();
                    }
                });
                ui.menu_button("help", |ui| {
                    if ui.button("about").clicked() {
                        self.show_about = true;
                        ui.close_menu();
                    }
                });
                action
            }).inner
        }).inner;

        match win_action {
            WindowAction::Close => {
                self.prepare_exit();
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            WindowAction::Minimize => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(true));
            }
            WindowAction::None => {}
        }

        TopBottomPanel::top("title_bar").show(ctx, |ui| {
            DeskTheme::title_bar_frame().show(ui, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.heading("desktop widget manager");
                });
            });
        });

        let status = self.status_text();
        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            status_bar(ui, &status);
        });

        SidePanel::right("actions")
            .resizable(false)
            .exact_width(200.0)
            .frame(egui::Frame::none().fill(DeskColors::WHITE).inner_margin(egui::Margin::same(8.0)))
            .show(ctx, |ui| {
                ui.spacing_mut().item_spacing.y = 6.0;
                if ui.add(DeskButton::new("create new widget")).clicked() {
                    self.create_widget();
                }
                if ui.add(DeskButton::new("destroy selected")).clicked() {
                    self.destroy_selected();
                }
                if ui.add(DeskButton::new("clear all widgets")).clicked() {
                    self.clear_all();
                }
                if ui.add(DeskButton::new("save all")).clicked() {
                    self.save_all();
                }
                if ui.add(DeskButton::new("load all")).clicked() {
                    self.load_all();
                }
                ui.separator();
                if ui.add(DeskButton::new("current time")).clicked() {
                    self.show_current_time();
                }
                if ui.add(DeskButton::new("random quote")).clicked() {
                    self.show_random_quote();
                }
                if ui.add(DeskButton::new("reminders")).clicked() {
                    self.show_reminders();
                }
                if ui.add(DeskButton::new("system info")).clicked() {
                    self.show_system_info();
                }
                if ui.add(DeskButton::new("weather")).clicked() && self.pending_weather.is_none() {
                    self.weather_city = Some(String::new());
                }
                ui.separator();
                if ui.add(DeskButton::new("quit")).clicked() {
                    self.prepare_exit();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

        CentralPanel::default()
            .frame(egui::Frame::none().fill(DeskColors::WHITE).inner_margin(egui::Margin::same(8.0)))
            .show(ctx, |ui| {
                if self.manager.is_empty() {
                    ui.centered_and_justified(|ui| {
                        ui.label("no widgets. create one to get started.");
                    });
                    return;
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for id in self.manager.ids() {
                        let title = format!("widget {}", id);
                        let detail = self.row_detail(id);
                        let row = ListRow::new(&title, &detail).selected(self.selected == Some(id));
                        if ui.add(row).clicked() {
                            self.selected = Some(id);
                        }
                    }
                });
            });
    }

    /// Show every overlay in its own viewport, then apply what they asked
    /// for. Nothing is destroyed while the collection is being iterated.
    fn draw_overlays(&mut self, ctx: &Context) {
        let now = Local::now().naive_local();
        let mut actions = Vec::new();
        for widget in self.manager.widgets_mut() {
            let id = widget.id();
            let action = ctx.show_viewport_immediate(
                widget.viewport_id(),
                widget.viewport_builder(),
                |ctx, class| widget.show(ctx, class, now),
            );
            if action != OverlayAction::None {
                actions.push((id, action));
            }
        }

        for (id, action) in actions {
            match action {
                OverlayAction::Close => self.destroy_widget(id),
                OverlayAction::Notice(notice) => self.notices.push_back(notice),
                OverlayAction::None => {}
            }
        }
    }

    fn draw_weather_prompt(&mut self, ctx: &Context) {
        let Some(city) = self.weather_city.as_mut() else {
            return;
        };
        let mut submit = None;
        let mut cancel = false;
        let resp = egui::Window::new("weather")
            .collapsible(false)
            .resizable(false)
            .default_width(260.0)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("city name:");
                let edit = ui.text_edit_singleline(city);
                let enter = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("look up").clicked() || enter {
                        submit = Some(city.clone());
                    }
                    if ui.button("cancel").clicked() {
                        cancel = true;
                    }
                });
            });
        if let Some(r) = &resp {
            deskcore::dither::draw_window_shadow(ctx, r.response.rect);
        }
        if let Some(city) = submit {
            self.weather_city = None;
            self.start_weather_lookup(&city);
        } else if cancel {
            self.weather_city = None;
        }
    }

    fn draw_about(&mut self, ctx: &Context) {
        if !self.show_about {
            return;
        }
        let resp = egui::Window::new("about")
            .collapsible(false)
            .resizable(false)
            .default_width(280.0)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    ui.heading("deskwidgets");
                    ui.label(format!("version {}", env!("CARGO_PKG_VERSION")));
                    ui.add_space(8.0);
                    ui.label("always-on-top overlay widgets");
                    ui.add_space(4.0);
                    ui.label("modes: time, calendar, note,");
                    ui.label("countdown, quote, reminder");
                    ui.add_space(4.0);
                    ui.label("drag an overlay to move it,");
                    ui.label("right-click to make it translucent");
                    ui.add_space(12.0);
                    if ui.button("ok").clicked() {
                        self.show_about = false;
                    }
                    ui.add_space(4.0);
                });
            });
        if let Some(r) = &resp {
            deskcore::dither::draw_window_shadow(ctx, r.response.rect);
        }
    }

    fn draw_notice(&mut self, ctx: &Context) {
        let Some(notice) = self.notices.front() else {
            self.notice_since = None;
            return;
        };
        let frame = ctx.frame_nr();
        let since = *self.notice_since.get_or_insert(frame);
        if notice_window(ctx, notice, since < frame) {
            self.notices.pop_front();
            self.notice_since = None;
            self.repaint.mark_needs_repaint();
        }
    }
}

impl eframe::App for DeskWidgetsApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.repaint.begin_frame();
        let now = Instant::now();

        if self.status_timer.poll(now) > 0 {
            self.system.sample();
        }
        if let Some(wait) = self.status_timer.time_until_due(now) {
            self.repaint.schedule(wait);
        }
        if let Some(wait) = self.manager.tick(now) {
            self.repaint.schedule(wait);
        }
        self.poll_weather();

        if ctx.input(|i| i.viewport().close_requested()) {
            self.prepare_exit();
        }

        self.draw_manager(ctx);
        self.draw_overlays(ctx);
        self.draw_weather_prompt(ctx);
        self.draw_about(ctx);
        self.draw_notice(ctx);

        self.repaint.end_frame(ctx);
    }

    /// Transparent clear so translucent overlays show the desktop behind them.
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskcore::widgets::NoticeKind;

    fn app_in(dir: &tempfile::TempDir) -> DeskWidgetsApp {
        DeskWidgetsApp::with_config(AppConfig {
            store_path: dir.path().join("widgets.json"),
            ..AppConfig::default()
        })
    }

    #[test]
    fn destroy_without_selection_warns() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.destroy_selected();
        assert_eq!(app.notices.pop_front().map(|n| n.kind), Some(NoticeKind::Warning));
    }

    #[test]
    fn destroy_selected_clears_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.create_widget();
        assert!(app.selected.is_some());
        app.destroy_selected();
        assert!(app.selected.is_none());
        assert!(app.manager.is_empty());
        assert!(app.notices.is_empty());
    }

    #[test]
    fn load_without_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.load_all();
        let notice = app.notices.pop_front().unwrap();
        assert_eq!(notice.kind, NoticeKind::Warning);
    }

    #[test]
    fn restore_is_silent_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.restore();
        assert!(app.notices.is_empty());
    }

    #[test]
    fn exit_saves_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.create_widget();
        app.prepare_exit();
        let path = dir.path().join("widgets.json");
        assert!(path.exists());

        std::fs::remove_file(&path).unwrap();
        app.prepare_exit();
        assert!(!path.exists());
    }

    #[test]
    fn failed_restore_then_exit_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widgets.json");
        let original = r#"[{"display_mode":"note","note_text":"keep me"},{"countdown_seconds":-1}]"#;
        std::fs::write(&path, original).unwrap();

        let mut app = app_in(&dir);
        app.restore();
        assert_eq!(app.notices.pop_front().map(|n| n.kind), Some(NoticeKind::Error));
        app.prepare_exit();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn reminders_notice_aggregates_widgets() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.show_reminders();
        assert_eq!(app.notices.pop_front().unwrap().body, "no reminders.");

        let a = app.manager.create_widget(None);
        let b = app.manager.create_widget(None);
        app.manager.get_mut(a).unwrap().add_reminder("one");
        app.manager.get_mut(b).unwrap().add_reminder("two");
        app.show_reminders();
        assert_eq!(app.notices.pop_front().unwrap().body, "one\ntwo");
    }

    #[test]
    fn weather_without_key_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.start_weather_lookup("Paris");
        assert!(app.pending_weather.is_none());
        assert_eq!(app.notices.pop_front().map(|n| n.kind), Some(NoticeKind::Error));
    }

    fn enter_frame() -> egui::RawInput {
        egui::RawInput {
            events: vec![egui::Event::Key {
                key: egui::Key::Enter,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers: egui::Modifiers::default(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn notice_outlives_the_key_press_that_raised_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        let ctx = Context::default();

        let _ = ctx.run(enter_frame(), |ctx| {
            app.start_weather_lookup("Paris");
            app.draw_notice(ctx);
        });
        assert_eq!(app.notices.len(), 1);

        let _ = ctx.run(enter_frame(), |ctx| app.draw_notice(ctx));
        assert!(app.notices.is_empty());
    }

    #[test]
    fn row_detail_previews_notes() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        let id = app.manager.create_widget(Some(crate::state::WidgetState {
            display_mode: DisplayMode::Note,
            note_text: "a fairly long note that will not fit in the row".into(),
            ..Default::default()
        }));
        let detail = app.row_detail(id);
        assert!(detail.starts_with("note · a fairly long note"));
        assert!(detail.ends_with('…'));
    }
}
